//! Run progress display across batches

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::LazyLock;
use tracing_subscriber::fmt::MakeWriter;

static EDITION_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Editions: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix} [{bar:20.green/white}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Shows overall edition count plus the batch currently being filled
pub struct ProgressManager {
    multi_progress: MultiProgress,
    total_bar: ProgressBar,
    batch_bar: Option<ProgressBar>,
    duplicates: usize,
}

impl ProgressManager {
    /// Create a progress display for `total_editions` items
    pub fn new(total_editions: usize) -> Self {
        Self::with_multi_progress(MultiProgress::new(), total_editions)
    }

    /// Create a progress display drawing into an existing bar group
    ///
    /// Sharing the group with a [`LogWriter`] keeps log lines from tearing
    /// the bars.
    pub fn with_multi_progress(multi_progress: MultiProgress, total_editions: usize) -> Self {
        let total_bar = multi_progress.add(ProgressBar::new(total_editions as u64));
        total_bar.set_style(EDITION_STYLE.clone());

        Self {
            multi_progress,
            total_bar,
            batch_bar: None,
            duplicates: 0,
        }
    }

    /// Replace the batch bar for a new batch
    pub fn start_batch(&mut self, batch_index: usize, size: usize) {
        if let Some(previous) = self.batch_bar.take() {
            previous.finish_and_clear();
        }
        let bar = self.multi_progress.add(ProgressBar::new(size as u64));
        bar.set_style(BATCH_STYLE.clone());
        bar.set_prefix(format!("Batch {batch_index}"));
        self.batch_bar = Some(bar);
    }

    /// Count one accepted edition
    pub fn record_edition(&self, edition: u32) {
        self.total_bar.inc(1);
        self.total_bar.set_message(format!("last #{edition}"));
        if let Some(ref bar) = self.batch_bar {
            bar.inc(1);
        }
    }

    /// Show the current streak of duplicate rejections
    pub fn record_duplicate(&mut self, consecutive: usize) {
        self.duplicates += 1;
        if let Some(ref bar) = self.batch_bar {
            bar.set_message(format!("{consecutive} duplicate(s) in a row"));
        }
    }

    /// Duplicate rejections seen over the whole run
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref bar) = self.batch_bar {
            bar.finish_and_clear();
        }
        self.total_bar.finish_with_message("All editions created");
        let _ = self.multi_progress.clear();
    }
}

/// Tracing writer that hides the progress bars while a log line is printed
#[derive(Clone, Debug)]
pub struct LogWriter {
    multi_progress: MultiProgress,
}

impl LogWriter {
    /// Create a writer coordinating with `multi_progress`
    pub const fn new(multi_progress: MultiProgress) -> Self {
        Self { multi_progress }
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = SuspendedLine;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedLine {
            multi_progress: self.multi_progress.clone(),
            buffer: Vec::new(),
        }
    }
}

/// One buffered log event, written to stderr when flushed or dropped
pub struct SuspendedLine {
    multi_progress: MultiProgress,
    buffer: Vec<u8>,
}

impl Write for SuspendedLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let line = std::mem::take(&mut self.buffer);
        self.multi_progress
            .suspend(|| io::stderr().lock().write_all(&line))
    }
}

impl Drop for SuspendedLine {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
