/// Element records and file name parsing
pub mod element;
/// Layer setup from batch configuration
pub mod layer;
/// Per-item layer choices
pub mod selection;
