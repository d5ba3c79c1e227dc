//! CLI command for dialogue statistics

use std::path::PathBuf;

use crate::interchange::read_dialog;

/// Show per-file statistics, with totals when more than one file is given
pub fn execute(sources: &[PathBuf]) -> anyhow::Result<()> {
    let mut total_entries = 0;
    let mut total_replies = 0;
    let mut total_links = 0;
    let mut total_words = 0;

    for path in sources {
        let dialog = read_dialog(path)?;
        let entries = dialog.entry_count();
        let replies = dialog.reply_count();
        let links = dialog.link_ids().count();
        let words = dialog.word_count();

        println!("{}:", path.display());
        println!("  Entries: {entries}");
        println!("  Replies: {replies}");
        println!("  Links: {links}");
        println!("  Starters: {}", dialog.starters().len());
        println!("  Words: {words}");
        if !dialog.orphans().is_empty() {
            println!("  Orphans: {}", dialog.orphans().len());
        }
        if !dialog.stunts.is_empty() {
            println!("  Stunts: {}", dialog.stunts.len());
        }
        println!();

        total_entries += entries;
        total_replies += replies;
        total_links += links;
        total_words += words;
    }

    if sources.len() > 1 {
        println!("Total across {} files:", sources.len());
        println!("  Entries: {total_entries}");
        println!("  Replies: {total_replies}");
        println!("  Links: {total_links}");
        println!("  Words: {total_words}");
    }

    Ok(())
}
