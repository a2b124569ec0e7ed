//! Dependency and exclusion rules between layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Indexed rule lookup and candidate narrowing
pub mod index;

/// A conditional constraint between two layers
///
/// Reads as "when `source_layer` was chosen as `source_value`, constrain
/// `target_layer` with respect to `target_value`". Whether the constraint
/// forces or forbids the value depends on the rule set it is registered in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Display name of the layer whose selection is checked
    #[serde(rename = "layerA")]
    pub source_layer: String,
    /// Element name that activates the rule
    #[serde(rename = "valueA")]
    pub source_value: String,
    /// Display name of the constrained layer
    #[serde(rename = "layerB")]
    pub target_layer: String,
    /// Element name forced in or out of the constrained layer
    #[serde(rename = "valueB")]
    pub target_value: String,
}

impl Rule {
    /// Build a rule from its four parts
    pub fn new(
        source_layer: impl Into<String>,
        source_value: impl Into<String>,
        target_layer: impl Into<String>,
        target_value: impl Into<String>,
    ) -> Self {
        Self {
            source_layer: source_layer.into(),
            source_value: source_value.into(),
            target_layer: target_layer.into(),
            target_value: target_value.into(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}={} -> {}={})",
            self.source_layer, self.source_value, self.target_layer, self.target_value
        )
    }
}

/// How a matched rule affects the target layer's candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Candidates become exactly the referenced values
    Dependency,
    /// Referenced values are removed from the candidates
    Exclusion,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dependency => f.write_str("dependency"),
            Self::Exclusion => f.write_str("exclusion"),
        }
    }
}
