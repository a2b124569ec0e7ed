/// DNA encoding, decoding and normalization
pub mod dna;
/// Batch orchestration with retry-on-duplicate
pub mod executor;
/// Cumulative-weight element selection
pub mod selection;
/// Normalized DNA bookkeeping
pub mod uniqueness;
