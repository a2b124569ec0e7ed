//! Tests for DNA encoding, normalization and decoding

#[cfg(test)]
mod tests {
    use crate::fixtures::layer;
    use layerforge::GenerationError;
    use layerforge::catalog::selection::Selection;
    use layerforge::generation::dna::{
        Dna, encode_token, is_bypassed, strip_options, token_id, token_options,
    };

    #[test]
    fn test_encode_token() {
        let eyes = layer(0, "Eyes", &["Blue#3.png", "Green.png"]);
        assert_eq!(encode_token(&eyes.elements[1], false), "1:Green.png");
        assert_eq!(
            encode_token(&eyes.elements[0], true),
            "0:Blue#3.png?bypassDNA=true"
        );
    }

    #[test]
    fn test_token_parts() {
        let token = "4:Blue.png?bypassDNA=true&tint=red";
        assert_eq!(strip_options(token), "4:Blue.png");
        assert_eq!(token_id(token), Some(4));
        assert_eq!(
            token_options(token).collect::<Vec<_>>(),
            vec![("bypassDNA", "true"), ("tint", "red")]
        );
        assert!(is_bypassed(token));
        assert!(!is_bypassed("4:Blue.png?bypassDNA=false"));
        assert!(!is_bypassed("4:Blue.png"));
        assert_eq!(token_id("x:Blue.png"), None);
    }

    // Tests the raw DNA joins one token per layer in composition order
    #[test]
    fn test_encode_selection() {
        let background = layer(0, "Background", &["Black.png"]);
        let eyes = layer(1, "Eyes", &["Blue.png", "Green.png"]).with_bypass_dna(true);

        let mut selection = Selection::default();
        selection.push(&background, &background.elements[0]);
        selection.push(&eyes, &eyes.elements[1]);

        let dna = Dna::encode(&selection);
        assert_eq!(dna.as_str(), "0:Black.png-1:Green.png?bypassDNA=true");
        assert_eq!(dna.tokens().count(), 2);
    }

    // Tests options are read from the suffix the encoder appends last
    // Verified by splitting options at the first prefix
    #[test]
    fn test_options_use_last_prefix() {
        let token = "0:Blue?.png?bypassDNA=true";
        assert!(is_bypassed(token));
        assert_eq!(strip_options(token), "0:Blue?.png");
        assert_eq!(token_id(token), Some(0));

        let blue = Dna::from_raw("0:Black.png-0:Blue?.png?bypassDNA=true");
        let green = Dna::from_raw("0:Black.png-1:Green?.png?bypassDNA=true");
        assert_eq!(blue.normalized(), "0:Black.png");
        assert_eq!(blue.normalized(), green.normalized());
    }

    // Tests bypassed tokens are left out of the normalized form
    // Verified by only stripping the option suffix
    #[test]
    fn test_normalized_drops_bypassed_tokens() {
        let dna = Dna::from_raw("0:Black.png-1:Green.png?bypassDNA=true-2:Cap.png");
        assert_eq!(dna.normalized(), "0:Black.png-2:Cap.png");

        let plain = Dna::from_raw("0:Black.png-2:Cap.png");
        assert_eq!(plain.normalized(), plain.as_str());
    }

    // Tests decoding resolves tokens to the exact elements picked
    // Verified by resolving ids against the wrong layer
    #[test]
    fn test_decode_round_trip() {
        let layers = vec![
            layer(0, "Background", &["Black.png", "White.png"]),
            layer(1, "Eyes", &["Blue.png", "Green.png"]).with_bypass_dna(true),
        ];

        let mut selection = Selection::default();
        selection.push(&layers[0], &layers[0].elements[1]);
        selection.push(&layers[1], &layers[1].elements[0]);

        let decoded = Dna::encode(&selection).decode(&layers).unwrap();
        assert_eq!(decoded, selection);
    }

    #[test]
    fn test_decode_token_count_mismatch() {
        let layers = vec![layer(0, "Background", &["Black.png"])];
        let result = Dna::from_raw("0:Black.png-0:Black.png").decode(&layers);
        assert!(matches!(
            result,
            Err(GenerationError::DecodeMismatch { layer: None, .. })
        ));
    }

    #[test]
    fn test_decode_unknown_id() {
        let layers = vec![layer(0, "Background", &["Black.png"])];
        let result = Dna::from_raw("7:Black.png").decode(&layers);
        assert!(matches!(
            result,
            Err(GenerationError::DecodeMismatch { layer: Some(ref name), .. }) if name == "Background"
        ));
    }

    // Tests the content hash is a stable SHA-256 hex digest
    #[test]
    fn test_content_hash() {
        let dna = Dna::from_raw("0:Black.png");
        let hash = dna.content_hash();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, Dna::from_raw("0:Black.png").content_hash());
        assert_ne!(hash, Dna::from_raw("1:White.png").content_hash());
    }
}
