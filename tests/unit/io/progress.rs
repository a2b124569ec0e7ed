//! Tests for the progress display and the log writer sharing its terminal

#[cfg(test)]
mod tests {
    use indicatif::{MultiProgress, ProgressDrawTarget};
    use layerforge::io::progress::{LogWriter, ProgressManager};
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    fn hidden_group() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn test_duplicate_count_spans_batches() {
        let mut progress = ProgressManager::with_multi_progress(hidden_group(), 3);
        progress.start_batch(0, 2);
        progress.record_edition(1);
        progress.record_duplicate(1);
        progress.record_duplicate(2);
        progress.record_edition(2);
        progress.start_batch(1, 1);
        progress.record_duplicate(1);
        progress.record_edition(3);
        progress.finish();

        assert_eq!(progress.duplicates(), 3);
    }

    // Tests log lines are buffered whole and written while bars are active
    // Verified by writing each fragment straight to stderr
    #[test]
    fn test_log_writer_buffers_whole_lines() {
        let group = hidden_group();
        let mut progress = ProgressManager::with_multi_progress(group.clone(), 2);
        progress.start_batch(0, 2);

        let writer = LogWriter::new(group);
        let mut line = writer.make_writer();
        assert_eq!(line.write(b"created ").unwrap(), 8);
        assert_eq!(line.write(b"edition\n").unwrap(), 8);
        line.flush().unwrap();
        line.flush().unwrap();
        drop(line);

        progress.record_edition(1);
        progress.finish();
    }

    // Tests the writer plugs into a tracing subscriber
    #[test]
    fn test_log_writer_as_subscriber_output() {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(LogWriter::new(hidden_group()))
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(edition = 1, "created edition");
        });
    }
}
