use crate::catalog::element::Element;
use crate::catalog::layer::Layer;
use crate::catalog::selection::Selection;
use crate::io::configuration::{
    BYPASS_DNA_OPTION, DNA_DELIMITER, DNA_ID_SEPARATOR, DNA_OPTION_PREFIX,
};
use crate::io::error::{GenerationError, Result};
use sha2::{Digest, Sha256};
use std::fmt;

/// Raw DNA of one item: one `id:filename[?options]` token per layer
///
/// The raw form keeps option suffixes and decodes back into a
/// [`Selection`]. Uniqueness is judged on [`normalized`](Self::normalized),
/// which drops every token flagged `bypassDNA=true`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dna(String);

/// Token for one chosen element
pub fn encode_token(element: &Element, bypass_dna: bool) -> String {
    let mut token = format!("{}{DNA_ID_SEPARATOR}{}", element.id, element.filename);
    if bypass_dna {
        token.push_str(DNA_OPTION_PREFIX);
        token.push_str(BYPASS_DNA_OPTION);
        token.push_str("=true");
    }
    token
}

/// Token with any option suffix removed
///
/// The suffix is always appended last, so it starts at the final prefix.
pub fn strip_options(token: &str) -> &str {
    token
        .rsplit_once(DNA_OPTION_PREFIX)
        .map_or(token, |(base, _options)| base)
}

/// `key=value` pairs of a token's option suffix
pub fn token_options(token: &str) -> impl Iterator<Item = (&str, &str)> {
    token
        .rsplit_once(DNA_OPTION_PREFIX)
        .map(|(_base, options)| options)
        .into_iter()
        .flat_map(|options| options.split('&'))
        .filter(|setting| !setting.is_empty())
        .map(|setting| setting.split_once('=').unwrap_or((setting, "")))
}

/// Whether a token is exempt from uniqueness comparison
pub fn is_bypassed(token: &str) -> bool {
    token_options(token).any(|(key, value)| key == BYPASS_DNA_OPTION && value == "true")
}

/// Element id referenced by a token
pub fn token_id(token: &str) -> Option<usize> {
    strip_options(token)
        .split(DNA_ID_SEPARATOR)
        .next()
        .and_then(|id| id.parse().ok())
}

impl Dna {
    /// Encode a complete selection in composition order
    pub fn encode(selection: &Selection<'_>) -> Self {
        let tokens: Vec<String> = selection
            .picks()
            .iter()
            .map(|pick| encode_token(pick.element, pick.layer.bypass_dna))
            .collect();
        Self(tokens.join(DNA_DELIMITER))
    }

    /// Wrap an existing raw DNA string
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Per-layer tokens in composition order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(DNA_DELIMITER)
            .filter(|token| !token.is_empty())
    }

    /// DNA with bypassed tokens removed, used only for uniqueness
    pub fn normalized(&self) -> String {
        self.tokens()
            .filter(|token| !is_bypassed(token))
            .collect::<Vec<_>>()
            .join(DNA_DELIMITER)
    }

    /// Resolve every token against the layer list it was encoded from
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::DecodeMismatch`] if the token count differs
    /// from the layer count or a token's id is not in its layer
    pub fn decode<'a>(&self, layers: &'a [Layer]) -> Result<Selection<'a>> {
        let tokens: Vec<&str> = self.tokens().collect();
        if tokens.len() != layers.len() {
            return Err(GenerationError::DecodeMismatch {
                batch_index: 0,
                layer: None,
                token: format!(
                    "{} ({} tokens for {} layers)",
                    self.0,
                    tokens.len(),
                    layers.len()
                ),
            });
        }

        let mut selection = Selection::with_capacity(layers.len());
        for (layer, token) in layers.iter().zip(tokens) {
            let element = token_id(token)
                .and_then(|id| layer.element_by_id(id))
                .ok_or_else(|| GenerationError::DecodeMismatch {
                    batch_index: 0,
                    layer: Some(layer.name.clone()),
                    token: token.to_string(),
                })?;
            selection.push(layer, element);
        }
        Ok(selection)
    }

    /// Hex SHA-256 digest of the raw DNA
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
