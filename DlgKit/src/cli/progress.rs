//! Progress display for batch CLI runs

use indicatif::{ProgressBar, ProgressStyle};

/// Bar shown while a folder of dialogue files is processed
///
/// The message slot carries the current file name, truncated so long
/// module paths do not wrap the bar line.
///
/// Format: `ebo_kreia.dlg.json [████████░░░░░░░░] 12/48 (3s)`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn file_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:24!} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .expect("valid template"),
    );
    pb
}
