//! Progress reporting and final output
//!
//! The live spinner and the styled summary go to stderr; stdout only
//! carries the three result lines.

use crate::walker::{WalkProgress, WalkResult, WalkStats};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Progress reporter that displays walk status
#[derive(Clone)]
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_message(progress: &WalkProgress) -> String {
    format!(
        "Dirs: {} | Files: {} | Size: {} | Rate: {:.0}/s | Queue: {} | In flight: {} | Workers: {}",
        format_number(progress.dirs),
        format_number(progress.files),
        format_size(progress.bytes, BINARY),
        progress.nodes_per_second(),
        progress.queue_size,
        progress.in_flight,
        progress.total_workers,
    )
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Write the result lines: `Dirs`, `Files` and `Bytes`
pub fn write_report<W: Write>(out: &mut W, stats: &WalkStats) -> io::Result<()> {
    writeln!(out, "Dirs: {}", stats.dirs)?;
    writeln!(out, "Files: {}", stats.files)?;
    writeln!(out, "Bytes: {}", stats.bytes)?;
    out.flush()
}

/// Print the result lines to stdout
pub fn print_report(stats: &WalkStats) -> io::Result<()> {
    write_report(&mut io::stdout().lock(), stats)
}

/// Print a human-readable summary of the walk to stderr
pub fn print_summary(result: &WalkResult) {
    let stats = &result.stats;
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        (stats.files + stats.dirs) as f64 / duration_secs
    } else {
        0.0
    };

    let title = if result.completed {
        style("Walk Complete").green().bold()
    } else {
        style("Walk Interrupted").yellow().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Directories:").bold(), format_number(stats.dirs));
    eprintln!("  {} {}", style("Files:").bold(), format_number(stats.files));
    eprintln!(
        "  {} {}",
        style("Total Size:").bold(),
        format_size(stats.bytes, BINARY)
    );
    eprintln!(
        "  {} {:.1}s ({:.0} nodes/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if stats.skipped > 0 {
        eprintln!(
            "  {} {}",
            style("Skipped:").bold(),
            format_number(stats.skipped)
        );
    }
    if stats.errors > 0 {
        eprintln!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.errors)
        );
    }
    eprintln!();
}

/// Print a header at the start of the walk
pub fn print_header(root: &str, workers: usize) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("fs-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Root:").bold(), root);
    eprintln!("  {} {}", style("Workers:").bold(), workers);
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_write_report() {
        let stats = WalkStats {
            dirs: 2,
            files: 2,
            bytes: 30,
            errors: 1,
            skipped: 0,
        };

        let mut out = Vec::new();
        write_report(&mut out, &stats).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Dirs: 2\nFiles: 2\nBytes: 30\n");
    }

    #[test]
    fn test_progress_message() {
        let progress = WalkProgress {
            dirs: 1500,
            files: 20000,
            bytes: 2048,
            queue_size: 12,
            in_flight: 16,
            total_workers: 4,
            ..Default::default()
        };

        let msg = progress_message(&progress);
        assert!(msg.contains("Dirs: 1,500"));
        assert!(msg.contains("Files: 20,000"));
        assert!(msg.contains("2 KiB"));
        assert!(msg.contains("Queue: 12"));
        assert!(msg.contains("In flight: 16"));
    }
}
