use crate::{
    catalog::layer::{Layer, setup_layers},
    catalog::selection::{Attribute, Selection},
    generation::dna::Dna,
    generation::selection::WeightedSelector,
    generation::uniqueness::UniquenessTracker,
    io::configuration::{BatchConfig, DEFAULT_SEED, DEFAULT_UNIQUE_DNA_TOLERANCE},
    io::error::{GenerationError, Result, WithContext, invalid_parameter},
    rules::index::RuleIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Run-wide parameters of the orchestrator
#[derive(Clone, Copy, Debug)]
pub struct GeneratorConfig {
    /// Seed for element selection and edition shuffling
    pub seed: u64,
    /// Consecutive duplicate rejections tolerated before aborting
    pub tolerance: usize,
    /// Hand out edition numbers in random order
    pub shuffle_editions: bool,
    /// Number of the first edition
    pub first_edition: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            tolerance: DEFAULT_UNIQUE_DNA_TOLERANCE,
            shuffle_editions: false,
            first_edition: 1,
        }
    }
}

/// A batch with its layers loaded and rules indexed
#[derive(Debug)]
pub struct PreparedBatch {
    /// Number of items to produce
    pub size: usize,
    /// Layers in composition order
    pub layers: Vec<Layer>,
    /// Dependency and exclusion rules resolved against `layers`
    pub rules: RuleIndex,
}

impl PreparedBatch {
    /// Bundle already loaded layers and rules
    pub const fn new(size: usize, layers: Vec<Layer>, rules: RuleIndex) -> Self {
        Self {
            size,
            layers,
            rules,
        }
    }

    /// Load a batch's layers from disk and index its rules
    ///
    /// # Errors
    ///
    /// Returns an error if any layer fails to load or any rule is invalid
    pub fn from_config(
        config: &BatchConfig,
        layers_dir: &Path,
        rarity_delimiter: &str,
    ) -> Result<Self> {
        let layers = setup_layers(&config.layers_order, layers_dir, rarity_delimiter)?;
        let rules = RuleIndex::build(
            &layers,
            &config.dependency_rules,
            &config.mutually_exclusive_rules,
        )?;
        Ok(Self::new(config.size, layers, rules))
    }
}

/// Everything the core exposes about one accepted item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedItem {
    /// Edition number
    pub edition: u32,
    /// Raw DNA, decodable against the batch's layers
    pub dna: String,
    /// DNA used for the uniqueness check
    pub normalized_dna: String,
    /// Layer/element pairs in composition order
    pub attributes: Vec<Attribute>,
    /// Digest of the raw DNA for external identification
    pub content_hash: String,
}

/// Consumer of accepted items, e.g. a renderer plus metadata writer
pub trait ItemSink {
    /// Called once per accepted item, before the next item is composed
    ///
    /// # Errors
    ///
    /// Any error aborts the run
    fn accept(&mut self, item: &GeneratedItem, selection: &Selection<'_>) -> Result<()>;

    /// Called when a batch starts
    fn batch_started(&mut self, _batch_index: usize, _size: usize) {}

    /// Called after each duplicate rejection with the consecutive count
    fn duplicate(&mut self, _batch_index: usize, _consecutive: usize) {}
}

impl ItemSink for Vec<GeneratedItem> {
    fn accept(&mut self, item: &GeneratedItem, _selection: &Selection<'_>) -> Result<()> {
        self.push(item.clone());
        Ok(())
    }
}

/// Outcome of one composition attempt
#[derive(Debug)]
pub enum Attempt<'a> {
    /// The DNA was new and has been recorded
    Accepted {
        /// Item record handed to consumers
        item: GeneratedItem,
        /// Selection decoded from the accepted DNA
        selection: Selection<'a>,
    },
    /// The normalized DNA was already taken
    Duplicate {
        /// The rejected raw DNA
        dna: Dna,
    },
}

/// Counters of a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Position of the batch in the run
    pub batch_index: usize,
    /// Items accepted
    pub produced: usize,
    /// Duplicate rejections over the whole batch
    pub rejections: usize,
}

/// Counters of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One report per batch, in order
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    /// Items accepted across all batches
    pub fn produced(&self) -> usize {
        self.batches.iter().map(|b| b.produced).sum()
    }

    /// Duplicate rejections across all batches
    pub fn rejections(&self) -> usize {
        self.batches.iter().map(|b| b.rejections).sum()
    }
}

/// Drives composition, uniqueness and edition numbering over batches
///
/// Each batch loops through select, check, then accept or retry until its
/// size is met. Duplicate rejections are counted per batch and reset on
/// every accepted item; reaching the tolerance aborts the whole run.
pub struct Generator {
    /// Seeded source of every random choice
    selector: WeightedSelector,
    /// Normalized DNA seen so far in this run
    tracker: UniquenessTracker,
    /// Edition numbers not yet handed out
    editions: VecDeque<u32>,
    /// Consecutive duplicates tolerated per batch
    tolerance: usize,
}

impl Generator {
    /// Create a generator able to number `total_editions` items
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is zero or the edition range does
    /// not fit in `u32`
    pub fn new(config: GeneratorConfig, total_editions: usize) -> Result<Self> {
        if config.tolerance == 0 {
            return Err(invalid_parameter(
                "tolerance",
                &config.tolerance,
                &"must be at least 1",
            ));
        }
        let end = u32::try_from(total_editions)
            .ok()
            .and_then(|count| config.first_edition.checked_add(count));
        let Some(end) = end else {
            return Err(invalid_parameter(
                "editions",
                &total_editions,
                &"edition numbers must fit in u32",
            ));
        };

        let mut selector = WeightedSelector::new(config.seed);
        let mut editions: Vec<u32> = (config.first_edition..end).collect();
        if config.shuffle_editions {
            selector.shuffle(&mut editions);
        }
        tracing::debug!(editions = editions.len(), "edition sequence prepared");

        Ok(Self {
            selector,
            tracker: UniquenessTracker::new(),
            editions: editions.into(),
            tolerance: config.tolerance,
        })
    }

    /// Uniqueness state of the run so far
    pub const fn tracker(&self) -> &UniquenessTracker {
        &self.tracker
    }

    /// Edition numbers still available
    pub fn remaining_editions(&self) -> usize {
        self.editions.len()
    }

    /// Run one composition pass and encode it
    ///
    /// Each layer, in order, gets its candidates from the rule index given
    /// the picks so far, then one weighted draw.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NoCandidates`] if rules leave a layer empty
    pub fn compose(&mut self, batch: &PreparedBatch) -> Result<Dna> {
        let mut selection = Selection::with_capacity(batch.layers.len());
        for layer in &batch.layers {
            let candidates = batch.rules.candidates(&selection, layer);
            let element =
                self.selector
                    .select(&candidates)
                    .ok_or_else(|| GenerationError::NoCandidates {
                        batch_index: 0,
                        layer: layer.name.clone(),
                    })?;
            selection.push(layer, element);
        }
        Ok(Dna::encode(&selection))
    }

    /// Compose once and either accept the result or report a duplicate
    ///
    /// # Errors
    ///
    /// Returns an error if composition fails, the accepted DNA does not
    /// decode, or no edition number is left
    pub fn attempt<'a>(&mut self, batch: &'a PreparedBatch) -> Result<Attempt<'a>> {
        let dna = self.compose(batch)?;
        if !self.tracker.is_unique(&dna) {
            return Ok(Attempt::Duplicate { dna });
        }

        let selection = dna.decode(&batch.layers)?;
        let edition = self.editions.pop_front().ok_or_else(|| {
            invalid_parameter("editions", &0, &"more items requested than editions prepared")
        })?;
        self.tracker.record(&dna);

        let item = GeneratedItem {
            edition,
            normalized_dna: dna.normalized(),
            attributes: selection.attributes(),
            content_hash: dna.content_hash(),
            dna: dna.to_string(),
        };
        Ok(Attempt::Accepted { item, selection })
    }

    /// Produce `batch.size` unique items and hand each to `sink`
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::ToleranceExceeded`] once consecutive
    /// duplicates reach the tolerance, or any composition or sink error
    pub fn run_batch<S: ItemSink>(
        &mut self,
        batch_index: usize,
        batch: &PreparedBatch,
        sink: &mut S,
    ) -> Result<BatchReport> {
        let mut report = BatchReport {
            batch_index,
            ..BatchReport::default()
        };
        let mut consecutive = 0;

        tracing::info!(batch = batch_index, size = batch.size, "starting batch");
        sink.batch_started(batch_index, batch.size);

        while report.produced < batch.size {
            match self.attempt(batch).with_batch(batch_index)? {
                Attempt::Accepted { item, selection } => {
                    sink.accept(&item, &selection)?;
                    tracing::info!(
                        edition = item.edition,
                        dna = %item.content_hash,
                        "created edition"
                    );
                    report.produced += 1;
                    consecutive = 0;
                }
                Attempt::Duplicate { dna } => {
                    consecutive += 1;
                    report.rejections += 1;
                    tracing::debug!(%dna, consecutive, "DNA exists");
                    sink.duplicate(batch_index, consecutive);
                    if consecutive >= self.tolerance {
                        return Err(GenerationError::ToleranceExceeded {
                            batch_index,
                            target_size: batch.size,
                            rejections: consecutive,
                        });
                    }
                }
            }
        }

        tracing::info!(
            batch = batch_index,
            produced = report.produced,
            rejections = report.rejections,
            "batch done"
        );
        Ok(report)
    }

    /// Run every batch in order; the first fatal error ends the run
    ///
    /// # Errors
    ///
    /// Returns an error if the batches ask for more editions than prepared,
    /// or any batch fails
    pub fn run<S: ItemSink>(&mut self, batches: &[PreparedBatch], sink: &mut S) -> Result<RunReport> {
        let requested: usize = batches.iter().map(|b| b.size).sum();
        if requested > self.editions.len() {
            return Err(invalid_parameter(
                "editions",
                &requested,
                &format!("only {} edition numbers prepared", self.editions.len()),
            ));
        }

        let mut report = RunReport::default();
        for (batch_index, batch) in batches.iter().enumerate() {
            report
                .batches
                .push(self.run_batch(batch_index, batch, sink)?);
        }
        Ok(report)
    }
}
