//! CLI command for dialogue integrity checking

use std::path::Path;

use indicatif::ProgressBar;

use crate::cli::progress::file_bar;
use crate::validate::{check_file, find_dialog_files, validate_batch};

/// Validate one file, or a whole directory with `--recursive`
pub fn execute(source: &Path, recursive: bool, quiet: bool) -> anyhow::Result<()> {
    if recursive {
        validate_directory(source, quiet)
    } else {
        validate_single(source)
    }
}

fn validate_single(source: &Path) -> anyhow::Result<()> {
    let report = check_file(source);

    if report.valid {
        println!(
            "{}: ok, {} entries, {} replies",
            source.display(),
            report.entry_count,
            report.reply_count
        );
        return Ok(());
    }

    println!("{}: {} issue(s)", source.display(), report.issues.len());
    for issue in &report.issues {
        println!("  {issue}");
    }
    anyhow::bail!("{} failed validation", source.display());
}

fn validate_directory(source: &Path, quiet: bool) -> anyhow::Result<()> {
    let files = find_dialog_files(source);
    if files.is_empty() {
        println!("No dialogue files found in {}", source.display());
        return Ok(());
    }

    println!("Found {} dialogue files", files.len());

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        file_bar(files.len() as u64)
    };

    let result = validate_batch(&files, |current, _total, name| {
        pb.set_position(current as u64);
        pb.set_message(name.to_string());
    });

    pb.finish_and_clear();

    println!();
    println!("Validation complete:");
    println!("  Passed: {}", result.valid_count);
    println!("  Failed: {}", result.invalid_count);

    if result.invalid_count > 0 {
        println!();
        println!("Problems:");
        for msg in &result.results {
            if msg.starts_with("Failed") {
                println!("  {msg}");
            }
        }
        anyhow::bail!("{} file(s) failed validation", result.invalid_count);
    }

    Ok(())
}
