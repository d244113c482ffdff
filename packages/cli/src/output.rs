//! Console output helpers shared by the command drivers.

use bucket_ops_transfer::summary::RunSummary;

/// How many items a preview shows before truncating.
pub const PREVIEW_LIMIT: usize = 15;

/// Prints a horizontal rule separating preview and report blocks.
pub fn rule() {
    println!("{}", "=".repeat(60));
}

/// Prints a preview of the affected items, truncated to
/// [`PREVIEW_LIMIT`] unless `show_all` is set.
pub fn preview(lines: &[String], show_all: bool) {
    let limit = if show_all { lines.len() } else { PREVIEW_LIMIT };
    for line in lines.iter().take(limit) {
        println!("  {line}");
    }
    if lines.len() > limit {
        println!(
            "  ... and {} more (use --show-all to list everything)",
            lines.len() - limit
        );
    }
}

/// Prints the final report: summary line plus any per-item failures.
pub fn report(title: &str, summary: &RunSummary) {
    rule();
    println!("{title}: {summary}");
    if summary.has_failures() {
        println!("Failures:");
        for failure in summary.failures() {
            println!("  {}: {}", failure.item, failure.message);
        }
    }
    rule();
}
