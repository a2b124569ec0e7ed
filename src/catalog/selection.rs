use crate::catalog::element::Element;
use crate::catalog::layer::Layer;
use serde::{Deserialize, Serialize};

/// The element chosen for one layer
#[derive(Debug, Clone, Copy)]
pub struct Pick<'a> {
    /// Layer the element belongs to
    pub layer: &'a Layer,
    /// Chosen element
    pub element: &'a Element,
}

/// Ordered layer-to-element choices of one composition pass
///
/// Built one layer at a time in composition order; rule evaluation for a
/// layer only ever sees the picks made before it.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    picks: Vec<Pick<'a>>,
}

/// One `trait_type`/`value` pair of an item's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Layer display name
    pub trait_type: String,
    /// Element name
    pub value: String,
}

impl<'a> Selection<'a> {
    /// Empty selection with room for `layers` picks
    pub fn with_capacity(layers: usize) -> Self {
        Self {
            picks: Vec::with_capacity(layers),
        }
    }

    /// Record the element chosen for the next layer
    pub fn push(&mut self, layer: &'a Layer, element: &'a Element) {
        self.picks.push(Pick { layer, element });
    }

    /// Element name chosen for the layer called `layer_name`, if already chosen
    pub fn value_of(&self, layer_name: &str) -> Option<&'a str> {
        self.picks
            .iter()
            .find(|pick| pick.layer.name == layer_name)
            .map(|pick| pick.element.name.as_str())
    }

    /// All picks in composition order
    pub fn picks(&self) -> &[Pick<'a>] {
        &self.picks
    }

    /// Number of layers chosen so far
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Whether nothing has been chosen yet
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Per-item attribute list in composition order
    pub fn attributes(&self) -> Vec<Attribute> {
        self.picks
            .iter()
            .map(|pick| Attribute {
                trait_type: pick.layer.name.clone(),
                value: pick.element.name.clone(),
            })
            .collect()
    }
}

impl PartialEq for Selection<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.picks.len() == other.picks.len()
            && self.picks.iter().zip(&other.picks).all(|(a, b)| {
                a.layer.order_index == b.layer.order_index
                    && a.layer.name == b.layer.name
                    && a.element.id == b.element.id
            })
    }
}

impl Eq for Selection<'_> {}
