use crate::catalog::element::Element;
use crate::catalog::layer::Layer;
use crate::catalog::selection::Selection;
use crate::io::error::{GenerationError, Result};
use crate::rules::{Rule, RuleKind};
use std::collections::{HashMap, HashSet};

/// Resolved rule condition
///
/// Identifies "layer `source_layer` chose element `source_element`, now
/// choosing layer `target_layer`", with names already resolved to order
/// indices and element ids of the batch's layer list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RuleKey {
    source_layer: usize,
    source_element: usize,
    target_layer: usize,
}

impl RuleKey {
    /// Create a key from resolved positions
    pub const fn new(source_layer: usize, source_element: usize, target_layer: usize) -> Self {
        Self {
            source_layer,
            source_element,
            target_layer,
        }
    }
}

/// Rule lookup built once per batch
///
/// Each matched condition maps to the target element ids it references.
/// A condition may map to an empty list when every referenced value is
/// missing from the target catalog; the rule still fires.
#[derive(Debug, Default)]
pub struct RuleIndex {
    dependencies: HashMap<RuleKey, Vec<usize>>,
    exclusions: HashMap<RuleKey, Vec<usize>>,
}

impl RuleIndex {
    /// Index with no rules; every layer keeps its full catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve both rule sets against a batch's layers
    ///
    /// Values absent from a catalog are dropped with a warning. A dependency
    /// left with no existing targets then empties its layer's candidates,
    /// which surfaces as [`GenerationError::NoCandidates`] during generation.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule names an unknown layer or its source layer
    /// does not come strictly before its target in composition order
    pub fn build(layers: &[Layer], dependencies: &[Rule], exclusions: &[Rule]) -> Result<Self> {
        let mut index = Self::new();
        for rule in dependencies {
            index.insert(layers, rule, RuleKind::Dependency)?;
        }
        for rule in exclusions {
            index.insert(layers, rule, RuleKind::Exclusion)?;
        }
        Ok(index)
    }

    /// Add a single rule
    ///
    /// # Errors
    ///
    /// Returns an error if the rule names an unknown layer or looks forward
    pub fn insert(&mut self, layers: &[Layer], rule: &Rule, kind: RuleKind) -> Result<()> {
        let source = find_layer(layers, &rule.source_layer, rule)?;
        let target = find_layer(layers, &rule.target_layer, rule)?;

        if source.order_index >= target.order_index {
            return Err(GenerationError::InvalidRule {
                rule: rule.to_string(),
                reason: format!(
                    "layer '{}' must come before '{}' in the layer order",
                    source.name, target.name
                ),
            });
        }

        let source_ids = ids_named(source, &rule.source_value);
        let target_ids = ids_named(target, &rule.target_value);

        if source_ids.is_empty() {
            tracing::warn!(%rule, %kind, "source value not in catalog, rule can never apply");
        }
        if target_ids.is_empty() {
            tracing::warn!(%rule, %kind, "target value not in catalog, reference dropped");
        }

        let map = match kind {
            RuleKind::Dependency => &mut self.dependencies,
            RuleKind::Exclusion => &mut self.exclusions,
        };
        for source_element in source_ids {
            let key = RuleKey::new(source.order_index, source_element, target.order_index);
            let entry = map.entry(key).or_default();
            for &id in &target_ids {
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }
        Ok(())
    }

    /// Whether no rule was registered
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.exclusions.is_empty()
    }

    /// Number of resolved conditions of the given kind
    pub fn condition_count(&self, kind: RuleKind) -> usize {
        match kind {
            RuleKind::Dependency => self.dependencies.len(),
            RuleKind::Exclusion => self.exclusions.len(),
        }
    }

    /// Elements of `layer` still selectable after the picks in `selection`
    ///
    /// Matching dependency rules narrow the catalog to the union of their
    /// targets; matching exclusion rules then remove their targets from that
    /// result. Catalog order is preserved. The returned set may be empty.
    pub fn candidates<'a>(&self, selection: &Selection<'_>, layer: &'a Layer) -> Vec<&'a Element> {
        let mut candidates: Vec<&Element> = layer.elements.iter().collect();

        if let Some(forced) = Self::matched(&self.dependencies, selection, layer) {
            candidates.retain(|element| forced.contains(&element.id));
        }
        if let Some(excluded) = Self::matched(&self.exclusions, selection, layer) {
            candidates.retain(|element| !excluded.contains(&element.id));
        }

        candidates
    }

    // None when no condition fired; Some(empty) when one fired without targets
    fn matched(
        map: &HashMap<RuleKey, Vec<usize>>,
        selection: &Selection<'_>,
        layer: &Layer,
    ) -> Option<HashSet<usize>> {
        if map.is_empty() {
            return None;
        }

        let mut fired = false;
        let mut ids = HashSet::new();
        for pick in selection.picks() {
            let key = RuleKey::new(pick.layer.order_index, pick.element.id, layer.order_index);
            if let Some(targets) = map.get(&key) {
                fired = true;
                ids.extend(targets.iter().copied());
            }
        }
        fired.then_some(ids)
    }
}

fn find_layer<'a>(layers: &'a [Layer], name: &str, rule: &Rule) -> Result<&'a Layer> {
    layers
        .iter()
        .find(|layer| layer.name == name)
        .ok_or_else(|| GenerationError::InvalidRule {
            rule: rule.to_string(),
            reason: format!("unknown layer '{name}'"),
        })
}

fn ids_named(layer: &Layer, value: &str) -> Vec<usize> {
    layer
        .elements
        .iter()
        .filter(|element| element.name == value)
        .map(|element| element.id)
        .collect()
}
