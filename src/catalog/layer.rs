use crate::catalog::element::{Element, load_elements};
use crate::io::configuration::{DEFAULT_BLEND, DNA_DELIMITER, LayerSpec};
use crate::io::error::{GenerationError, Result, invalid_parameter};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Compositing operation used when drawing a layer over the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Plain alpha compositing
    #[default]
    SourceOver,
    /// Channel product, always darkens
    Multiply,
    /// Inverted product, always lightens
    Screen,
    /// Multiply or screen depending on the backdrop
    Overlay,
    /// Per-channel minimum
    Darken,
    /// Per-channel maximum
    Lighten,
    /// Absolute channel difference
    Difference,
}

impl FromStr for BlendMode {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "source-over" => Ok(Self::SourceOver),
            "multiply" => Ok(Self::Multiply),
            "screen" => Ok(Self::Screen),
            "overlay" => Ok(Self::Overlay),
            "darken" => Ok(Self::Darken),
            "lighten" => Ok(Self::Lighten),
            "difference" => Ok(Self::Difference),
            other => Err(invalid_parameter("blend", &other, &"unsupported blend mode")),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SourceOver => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::Difference => "difference",
        };
        f.write_str(name)
    }
}

/// One axis of variation in the composition
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Position in composition order
    pub order_index: usize,
    /// Display name used by rules and metadata
    pub name: String,
    /// Selectable elements in load order
    pub elements: Vec<Element>,
    /// Compositing operation
    pub blend: BlendMode,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Leave this layer out of uniqueness comparison
    pub bypass_dna: bool,
}

impl Layer {
    /// Build a layer from already loaded elements
    ///
    /// # Errors
    ///
    /// Returns an error if the name contains the DNA delimiter, the element
    /// list is empty, or the opacity lies outside `[0, 1]`
    pub fn new(
        order_index: usize,
        name: impl Into<String>,
        elements: Vec<Element>,
        source: &Path,
    ) -> Result<Self> {
        let name = name.into();
        if name.contains(DNA_DELIMITER) {
            return Err(GenerationError::InvalidName {
                name,
                delimiter: DNA_DELIMITER,
            });
        }
        if elements.is_empty() {
            return Err(GenerationError::EmptyLayer {
                layer: name,
                path: source.to_path_buf(),
            });
        }
        Ok(Self {
            order_index,
            name,
            elements,
            blend: BlendMode::default(),
            opacity: 1.0,
            bypass_dna: false,
        })
    }

    /// Replace the blend mode
    #[must_use]
    pub const fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Replace the opacity
    ///
    /// # Errors
    ///
    /// Returns an error if the opacity lies outside `[0, 1]`
    pub fn with_opacity(mut self, opacity: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(invalid_parameter(
                "opacity",
                &opacity,
                &format!("layer '{}' needs a value in [0, 1]", self.name),
            ));
        }
        self.opacity = opacity;
        Ok(self)
    }

    /// Mark the layer as exempt from uniqueness
    #[must_use]
    pub const fn with_bypass_dna(mut self, bypass_dna: bool) -> Self {
        self.bypass_dna = bypass_dna;
        self
    }

    /// Look up an element by its load-time id
    pub fn element_by_id(&self, id: usize) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Look up an element by trait name
    pub fn element_by_name(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.name == name)
    }
}

/// Load every layer of a batch from `layers_dir/<spec.name>/`
///
/// # Errors
///
/// Returns an error if a directory cannot be read, a name is invalid, a
/// layer is empty, options are out of range, or two layers share a name
pub fn setup_layers(
    specs: &[LayerSpec],
    layers_dir: &Path,
    rarity_delimiter: &str,
) -> Result<Vec<Layer>> {
    let mut seen = HashSet::new();
    let mut layers = Vec::with_capacity(specs.len());

    for (order_index, spec) in specs.iter().enumerate() {
        let directory = layers_dir.join(&spec.name);
        let elements = load_elements(&directory, rarity_delimiter)?;
        let name = spec
            .options
            .display_name
            .clone()
            .unwrap_or_else(|| spec.name.clone());

        if !seen.insert(name.clone()) {
            return Err(GenerationError::DuplicateLayer { layer: name });
        }

        let blend = spec
            .options
            .blend
            .as_deref()
            .unwrap_or(DEFAULT_BLEND)
            .parse::<BlendMode>()?;

        let layer = Layer::new(order_index, name, elements, &directory)?
            .with_blend(blend)
            .with_opacity(spec.options.opacity.unwrap_or(1.0))?
            .with_bypass_dna(spec.options.bypass_dna.unwrap_or(false));

        tracing::debug!(
            layer = %layer.name,
            elements = layer.elements.len(),
            blend = %layer.blend,
            "loaded layer"
        );
        layers.push(layer);
    }

    Ok(layers)
}
