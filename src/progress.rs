//! Rate-limited progress lines for long scans.

use std::fmt::Display;
use std::io::Write;
use std::time::{Duration, Instant};

/// Default minimum gap between two progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Counts processed items and periodically prints how far along a scan is.
///
/// The first item always produces a line; after that a line is written at
/// most once per `interval`. Progress output is advisory, so write failures
/// are ignored.
#[derive(Debug)]
pub struct ProgressLogger {
    total: usize,
    processed: usize,
    interval: Duration,
    next_update: Option<Instant>,
}

impl ProgressLogger {
    /// Create a logger for `total` items using the default interval.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self::with_interval(total, DEFAULT_PROGRESS_INTERVAL)
    }

    /// Create a logger for `total` items reporting at most once per
    /// `interval`.
    #[must_use]
    pub fn with_interval(total: usize, interval: Duration) -> Self {
        Self {
            total,
            processed: 0,
            interval,
            next_update: None,
        }
    }

    /// Number of items reported so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Count one item and print a progress line if one is due.
    ///
    /// Returns whether a line was written.
    pub fn report_item(&mut self, item: impl Display, out: &mut dyn Write) -> bool {
        self.report_item_at(item, Instant::now(), out)
    }

    /// Like [`Self::report_item`] with an explicit clock reading.
    pub fn report_item_at(
        &mut self,
        item: impl Display,
        now: Instant,
        out: &mut dyn Write,
    ) -> bool {
        self.processed += 1;
        if self.next_update.is_some_and(|next| now < next) {
            return false;
        }
        if writeln!(out, "{}", self.progress_line(item)).is_err() {
            // Best-effort output; ignore write failures.
        }
        self.next_update = Some(now + self.interval);
        true
    }

    fn progress_line(&self, item: impl Display) -> String {
        format!(
            "{item} - {} / {} ({:.1}% complete)",
            self.processed,
            self.total,
            percent(self.processed, self.total)
        )
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    100.0 * part as f64 / whole as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8(out.to_vec())
            .expect("progress output is UTF-8")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn first_item_always_reports() {
        let mut logger = ProgressLogger::new(4);
        let mut out = Vec::new();

        assert!(logger.report_item("Tested a", &mut out));
        assert_eq!(lines(&out), vec!["Tested a - 1 / 4 (25.0% complete)"]);
    }

    #[test]
    fn reports_are_rate_limited_by_interval() {
        let start = Instant::now();
        let mut logger = ProgressLogger::with_interval(3, Duration::from_secs(2));
        let mut out = Vec::new();

        assert!(logger.report_item_at("a", start, &mut out));
        assert!(!logger.report_item_at("b", start + Duration::from_millis(1999), &mut out));
        assert!(logger.report_item_at("c", start + Duration::from_secs(2), &mut out));

        assert_eq!(logger.processed(), 3);
        assert_eq!(lines(&out), vec![
            "a - 1 / 3 (33.3% complete)",
            "c - 3 / 3 (100.0% complete)",
        ]);
    }

    #[test]
    fn suppressed_items_still_count() {
        let start = Instant::now();
        let mut logger = ProgressLogger::with_interval(1000, Duration::from_secs(60));
        let mut out = Vec::new();

        for _ in 0..10 {
            logger.report_item_at("x", start, &mut out);
        }

        assert_eq!(logger.processed(), 10);
        assert_eq!(lines(&out).len(), 1);
    }

    #[test]
    fn write_failures_are_ignored() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut logger = ProgressLogger::new(1);
        assert!(logger.report_item("a", &mut Broken));
        assert_eq!(logger.processed(), 1);
    }
}
