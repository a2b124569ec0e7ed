//! Tests for rule indexing and candidate narrowing

#[cfg(test)]
mod tests {
    use crate::fixtures::layer;
    use layerforge::GenerationError;
    use layerforge::catalog::layer::Layer;
    use layerforge::catalog::selection::Selection;
    use layerforge::rules::index::RuleIndex;
    use layerforge::rules::{Rule, RuleKind};

    fn layers() -> Vec<Layer> {
        vec![
            layer(0, "Background", &["Black.png", "White.png"]),
            layer(1, "Eyes", &["Blue.png", "Green.png", "Red.png"]),
            layer(2, "Hat", &["Cap.png", "Crown.png"]),
        ]
    }

    fn names(candidates: &[&layerforge::catalog::element::Element]) -> Vec<String> {
        candidates.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::new("Background", "Black", "Eyes", "Red");
        assert_eq!(rule.to_string(), "(Background=Black -> Eyes=Red)");
        assert_eq!(RuleKind::Exclusion.to_string(), "exclusion");
    }

    // Tests rules deserialize from the layerA/valueA/layerB/valueB shape
    #[test]
    fn test_rule_json_shape() {
        let rule: Rule = serde_json::from_str(
            r#"{"layerA":"Background","valueA":"Black","layerB":"Eyes","valueB":"Red"}"#,
        )
        .unwrap();
        assert_eq!(rule, Rule::new("Background", "Black", "Eyes", "Red"));
    }

    // Tests an empty index leaves the whole catalog selectable in order
    #[test]
    fn test_no_rules_keeps_catalog() {
        let layers = layers();
        let index = RuleIndex::new();
        assert!(index.is_empty());

        let candidates = index.candidates(&Selection::default(), &layers[1]);
        assert_eq!(names(&candidates), vec!["Blue", "Green", "Red"]);
    }

    // Tests a matching dependency narrows the target to its values
    // Verified by ignoring dependency rules
    #[test]
    fn test_dependency_narrows_candidates() {
        let layers = layers();
        let index = RuleIndex::build(
            &layers,
            &[
                Rule::new("Background", "Black", "Eyes", "Red"),
                Rule::new("Background", "Black", "Eyes", "Blue"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(index.condition_count(RuleKind::Dependency), 1);

        let mut black = Selection::default();
        black.push(&layers[0], &layers[0].elements[0]);
        assert_eq!(names(&index.candidates(&black, &layers[1])), vec!["Blue", "Red"]);

        let mut white = Selection::default();
        white.push(&layers[0], &layers[0].elements[1]);
        assert_eq!(index.candidates(&white, &layers[1]).len(), 3);
    }

    // Tests a matching exclusion removes its values and keeps element ids
    // Verified by renumbering filtered candidates
    #[test]
    fn test_exclusion_removes_candidates() {
        let layers = layers();
        let index =
            RuleIndex::build(&layers, &[], &[Rule::new("Background", "White", "Eyes", "Blue")])
                .unwrap();

        let mut white = Selection::default();
        white.push(&layers[0], &layers[0].elements[1]);
        let candidates = index.candidates(&white, &layers[1]);

        assert_eq!(names(&candidates), vec!["Green", "Red"]);
        assert_eq!(candidates[0].id, 1);
        assert_eq!(candidates[1].id, 2);
    }

    // Tests exclusions apply after dependencies
    #[test]
    fn test_dependency_then_exclusion() {
        let layers = layers();
        let index = RuleIndex::build(
            &layers,
            &[
                Rule::new("Background", "Black", "Hat", "Cap"),
                Rule::new("Background", "Black", "Hat", "Crown"),
            ],
            &[Rule::new("Eyes", "Red", "Hat", "Crown")],
        )
        .unwrap();

        let mut selection = Selection::default();
        selection.push(&layers[0], &layers[0].elements[0]);
        selection.push(&layers[1], &layers[1].elements[2]);

        assert_eq!(names(&index.candidates(&selection, &layers[2])), vec!["Cap"]);
    }

    // Tests rules never look at layers chosen later
    // Verified by accepting rules pointing backwards
    #[test]
    fn test_forward_only_rules() {
        let layers = layers();
        let backwards = RuleIndex::build(&layers, &[Rule::new("Hat", "Cap", "Eyes", "Red")], &[]);
        assert!(matches!(backwards, Err(GenerationError::InvalidRule { .. })));

        let same = RuleIndex::build(&layers, &[], &[Rule::new("Eyes", "Red", "Eyes", "Blue")]);
        assert!(matches!(same, Err(GenerationError::InvalidRule { .. })));
    }

    #[test]
    fn test_unknown_layer_rejected() {
        let layers = layers();
        let result = RuleIndex::build(&layers, &[Rule::new("Mouth", "Smile", "Hat", "Cap")], &[]);
        assert!(matches!(
            result,
            Err(GenerationError::InvalidRule { ref reason, .. }) if reason.contains("Mouth")
        ));
    }

    // Tests a dependency whose targets are all missing leaves no candidates
    // Verified by skipping conditions without targets
    #[test]
    fn test_dependency_on_missing_value_empties_layer() {
        let layers = layers();
        let index =
            RuleIndex::build(&layers, &[Rule::new("Background", "Black", "Eyes", "Purple")], &[])
                .unwrap();

        let mut black = Selection::default();
        black.push(&layers[0], &layers[0].elements[0]);
        assert!(index.candidates(&black, &layers[1]).is_empty());
    }

    // Tests an exclusion of a missing value changes nothing
    #[test]
    fn test_exclusion_of_missing_value_is_noop() {
        let layers = layers();
        let index =
            RuleIndex::build(&layers, &[], &[Rule::new("Background", "Black", "Eyes", "Purple")])
                .unwrap();

        let mut black = Selection::default();
        black.push(&layers[0], &layers[0].elements[0]);
        assert_eq!(index.candidates(&black, &layers[1]).len(), 3);
    }

    // Tests a rule whose source value is unknown never fires
    #[test]
    fn test_missing_source_value_never_fires() {
        let layers = layers();
        let index =
            RuleIndex::build(&layers, &[Rule::new("Background", "Grey", "Eyes", "Red")], &[])
                .unwrap();
        assert_eq!(index.condition_count(RuleKind::Dependency), 0);

        let mut black = Selection::default();
        black.push(&layers[0], &layers[0].elements[0]);
        assert_eq!(index.candidates(&black, &layers[1]).len(), 3);
    }

    // Tests dependencies from several earlier layers are unioned
    #[test]
    fn test_dependencies_from_several_sources_union() {
        let layers = layers();
        let index = RuleIndex::build(
            &layers,
            &[
                Rule::new("Background", "Black", "Hat", "Cap"),
                Rule::new("Eyes", "Green", "Hat", "Crown"),
            ],
            &[],
        )
        .unwrap();

        let mut selection = Selection::default();
        selection.push(&layers[0], &layers[0].elements[0]);
        selection.push(&layers[1], &layers[1].elements[1]);

        assert_eq!(names(&index.candidates(&selection, &layers[2])), vec!["Cap", "Crown"]);
    }
}
