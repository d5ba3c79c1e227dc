//! CLI command for HTML export

use std::path::Path;

use anyhow::Context;

use crate::export::generate_html;
use crate::interchange::read_dialog;

/// Export a dialogue file to a standalone HTML document
pub fn execute(source: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let dialog = read_dialog(source)?;

    let stem = source
        .file_stem()
        .map_or_else(|| "dialogue".to_string(), |n| n.to_string_lossy().to_string());
    let title = stem.strip_suffix(".dlg").unwrap_or(&stem);

    let html = generate_html(&dialog, title)?;

    let output_path = output.map_or_else(|| source.with_extension("html"), Path::to_path_buf);
    std::fs::write(&output_path, html)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Exported {} to {}", source.display(), output_path.display());
    Ok(())
}
