/// Layer-by-layer GIF export
pub mod animation;
/// Build directory layout and item sink
pub mod build;
/// Command-line interface and run driver
pub mod cli;
/// Constants, defaults and the JSON run configuration
pub mod configuration;
/// Error types with context enrichment
pub mod error;
/// Metadata record assembly and persistence
pub mod metadata;
/// Terminal progress display
pub mod progress;
/// Layer compositing
pub mod render;
