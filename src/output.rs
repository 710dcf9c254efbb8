//! Output formatting and styling module.
//!
//! Provides a centralized interface for all operator-facing output: colored
//! status lines, the spinner shown while calibredb works, and the report
//! summary table.

use crate::report::{CheckReport, Category};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - A spinner for long-running external commands
/// - A summary table of report categories
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use calibrator::output::OutputFormatter;
    /// OutputFormatter::success("Imported Foo by Author");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Starts a spinner with the given message.
    ///
    /// The spinner only draws when stderr is a terminal. Call
    /// `finish_and_clear` on the returned bar once the work is done.
    pub fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Prints how many rows the checker reported per category.
    pub fn summary_table(report: &CheckReport) {
        Self::header("CHECK_LIBRARY SUMMARY");

        let width = Category::ALL
            .iter()
            .map(|category| category.label().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Rows".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        let mut total = 0;
        for category in Category::ALL {
            let count = report.count(category);
            total += count;
            let count_text = if count == 0 {
                count.to_string().normal()
            } else if category.is_skipped() {
                count.to_string().yellow()
            } else {
                count.to_string().green()
            };
            println!(
                "{:<width$} | {}",
                category.label(),
                count_text,
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            total.to_string().green().bold(),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
