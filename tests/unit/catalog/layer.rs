//! Tests for layer construction, options and batch setup

#[cfg(test)]
mod tests {
    use crate::fixtures::layer;
    use layerforge::GenerationError;
    use layerforge::catalog::layer::{BlendMode, Layer, setup_layers};
    use layerforge::io::configuration::{LayerOptions, LayerSpec};
    use std::path::Path;

    fn write_layer(root: &Path, name: &str, files: &[&str]) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"").unwrap();
        }
    }

    fn spec(name: &str, options: LayerOptions) -> LayerSpec {
        LayerSpec {
            name: name.to_string(),
            options,
        }
    }

    #[test]
    fn test_blend_mode_parsing() {
        assert_eq!("source-over".parse::<BlendMode>().unwrap(), BlendMode::SourceOver);
        assert_eq!("multiply".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
        assert_eq!(BlendMode::Overlay.to_string(), "overlay");
        assert!("hue".parse::<BlendMode>().is_err());
    }

    // Tests layer names containing the DNA delimiter are rejected
    // Verified by skipping the name check
    #[test]
    fn test_layer_rejects_delimiter_in_name() {
        let elements = layer(0, "Eyes", &["Blue.png"]).elements;
        let result = Layer::new(0, "Left-Eye", elements, Path::new("layers/Left-Eye"));
        assert!(matches!(result, Err(GenerationError::InvalidName { .. })));
    }

    // Tests empty layers are a setup error
    #[test]
    fn test_layer_rejects_empty() {
        let result = Layer::new(0, "Eyes", Vec::new(), Path::new("layers/Eyes"));
        assert!(matches!(result, Err(GenerationError::EmptyLayer { .. })));
    }

    #[test]
    fn test_opacity_range() {
        let base = layer(0, "Eyes", &["Blue.png"]);
        assert!(base.clone().with_opacity(0.5).is_ok());
        assert!(matches!(
            base.with_opacity(1.5),
            Err(GenerationError::InvalidParameter { parameter: "opacity", .. })
        ));
    }

    #[test]
    fn test_element_lookup() {
        let eyes = layer(0, "Eyes", &["Blue#2.png", "Green.png"]);
        assert_eq!(eyes.element_by_id(1).map(|e| e.name.as_str()), Some("Green"));
        assert_eq!(eyes.element_by_name("Blue").map(|e| e.id), Some(0));
        assert!(eyes.element_by_id(5).is_none());
    }

    // Tests options are applied and display names override directory names
    // Verified by ignoring displayName
    #[test]
    fn test_setup_layers_applies_options() {
        let root = tempfile::tempdir().unwrap();
        write_layer(root.path(), "Background", &["Black.png", "White#3.png"]);
        write_layer(root.path(), "Eye color", &["Blue.png"]);

        let specs = vec![
            spec("Background", LayerOptions::default()),
            spec(
                "Eye color",
                LayerOptions {
                    display_name: Some("Eyes".to_string()),
                    blend: Some("multiply".to_string()),
                    opacity: Some(0.7),
                    bypass_dna: Some(true),
                },
            ),
        ];

        let layers = setup_layers(&specs, root.path(), "#").unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "Background");
        assert_eq!(layers[0].blend, BlendMode::SourceOver);
        assert!(!layers[0].bypass_dna);
        assert_eq!(layers[1].order_index, 1);
        assert_eq!(layers[1].name, "Eyes");
        assert_eq!(layers[1].blend, BlendMode::Multiply);
        assert!((layers[1].opacity - 0.7).abs() < f32::EPSILON);
        assert!(layers[1].bypass_dna);
    }

    // Tests two layers sharing a display name are rejected
    #[test]
    fn test_setup_layers_rejects_duplicate_names() {
        let root = tempfile::tempdir().unwrap();
        write_layer(root.path(), "Eyes", &["Blue.png"]);
        write_layer(root.path(), "Other", &["Red.png"]);

        let specs = vec![
            spec("Eyes", LayerOptions::default()),
            spec(
                "Other",
                LayerOptions {
                    display_name: Some("Eyes".to_string()),
                    ..LayerOptions::default()
                },
            ),
        ];

        let result = setup_layers(&specs, root.path(), "#");
        assert!(matches!(result, Err(GenerationError::DuplicateLayer { ref layer }) if layer == "Eyes"));
    }

    #[test]
    fn test_setup_layers_rejects_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        write_layer(root.path(), "Eyes", &[".DS_Store"]);

        let result = setup_layers(&[spec("Eyes", LayerOptions::default())], root.path(), "#");
        assert!(matches!(result, Err(GenerationError::EmptyLayer { .. })));
    }
}
