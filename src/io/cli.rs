//! Command-line interface for running a configured generation

use crate::generation::executor::{Generator, GeneratorConfig, PreparedBatch, RunReport};
use crate::io::animation::GifExporter;
use crate::io::build::{BuildLayout, BuildSink};
use crate::io::configuration::{DEFAULT_BUILD_DIR, DEFAULT_LAYERS_DIR, DEFAULT_SEED, RunConfig};
use crate::io::error::{Result, WithContext};
use crate::io::metadata::MetadataWriter;
use crate::io::progress::{LogWriter, ProgressManager};
use crate::io::render::Compositor;
use clap::Parser;
use indicatif::MultiProgress;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "layerforge")]
#[command(
    author,
    version,
    about = "Generate unique layered image collections from weighted trait catalogs"
)]
/// Command-line arguments for the generator
pub struct Cli {
    /// Run configuration (JSON)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory containing one sub-directory per layer
    #[arg(short, long, default_value = DEFAULT_LAYERS_DIR)]
    pub layers: PathBuf,

    /// Build output directory, recreated on every run
    #[arg(short, long, default_value = DEFAULT_BUILD_DIR)]
    pub output: PathBuf,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip image rendering and only write metadata
    #[arg(short, long)]
    pub dry_run: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Check if images and animations should be produced
    pub const fn should_render(&self) -> bool {
        !self.dry_run
    }
}

/// Loads a run configuration and drives it to a finished build directory
pub struct Runner {
    cli: Cli,
    multi_progress: MultiProgress,
}

impl Runner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            multi_progress: MultiProgress::new(),
        }
    }

    /// Log writer sharing the terminal with this runner's progress bars
    pub fn log_writer(&self) -> LogWriter {
        LogWriter::new(self.multi_progress.clone())
    }

    /// Generate every batch of the configured run
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or any layer fails to load,
    /// rules are invalid, generation aborts, or output cannot be written
    pub fn process(&self) -> Result<RunReport> {
        let start_time = Instant::now();
        let config = RunConfig::from_path(&self.cli.config)?;

        let batches = config
            .layer_configurations
            .iter()
            .enumerate()
            .map(|(index, batch)| {
                PreparedBatch::from_config(batch, &self.cli.layers, &config.rarity_delimiter)
                    .with_batch(index)
            })
            .collect::<Result<Vec<_>>>()?;

        let render = self.cli.should_render();
        let animate = render && config.gif.export;
        let layout = BuildLayout::new(&self.cli.output, animate);
        layout.prepare()?;

        let mut generator = Generator::new(
            GeneratorConfig {
                seed: self.cli.seed,
                tolerance: config.unique_dna_tolerance,
                shuffle_editions: config.shuffle_layer_configurations,
                first_edition: config.metadata.network.first_edition(),
            },
            config.total_editions(),
        )?;

        // Background hues draw from their own stream so selection stays reproducible
        let renderer = render
            .then(|| {
                Compositor::new(
                    &config.format,
                    &config.background,
                    animate,
                    self.cli.seed.wrapping_add(1),
                )
            })
            .transpose()?;
        let animation = animate.then(|| GifExporter::from_config(&config.gif));
        let metadata = MetadataWriter::new(layout.json.clone(), config.metadata.clone());
        let progress = self
            .cli
            .should_show_progress()
            .then(|| {
                ProgressManager::with_multi_progress(
                    self.multi_progress.clone(),
                    config.total_editions(),
                )
            });

        let mut sink = BuildSink::new(layout, renderer, animation, metadata, progress);
        let report = generator.run(&batches, &mut sink)?;
        let index_path = sink.finish()?;

        tracing::info!(
            produced = report.produced(),
            rejections = report.rejections(),
            index = %index_path.display(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "run complete"
        );
        Ok(report)
    }
}
