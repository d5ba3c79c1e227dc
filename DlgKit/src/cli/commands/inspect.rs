//! CLI command for printing dialogue trees

use std::collections::HashSet;
use std::path::Path;

use crate::graph::{Dialog, LinkId, NodeId, NodeKind};
use crate::interchange::read_dialog;

/// Print a dialogue file as an indented tree
///
/// Aliased nodes print in full once and as a `-> E4 (above)` back reference
/// after that, so cyclic conversations stay finite.
pub fn execute(source: &Path, depth: usize) -> anyhow::Result<()> {
    let dialog = read_dialog(source)?;

    println!(
        "{}: {} entries, {} replies, {} starter(s)",
        source.display(),
        dialog.entry_count(),
        dialog.reply_count(),
        dialog.starters().len()
    );
    println!();

    let mut printed = HashSet::new();
    for link_id in dialog.starters() {
        print_link(&dialog, *link_id, 0, depth, &mut printed);
    }

    if !dialog.orphans().is_empty() {
        println!();
        println!("Orphans:");
        for orphan in dialog.orphans() {
            println!("  was {}", orphan.former_path);
            print_node(&dialog, orphan.node, 1, depth, &mut printed);
        }
    }

    Ok(())
}

fn print_link(
    dialog: &Dialog,
    link_id: LinkId,
    indent: usize,
    depth: usize,
    printed: &mut HashSet<NodeId>,
) {
    let Ok(link) = dialog.link(link_id) else {
        return;
    };
    if link.is_conditional() {
        let pad = "  ".repeat(indent);
        let mut gates = Vec::new();
        for cond in [&link.active1, &link.active2] {
            if cond.is_set() {
                let negation = if cond.negated { "not " } else { "" };
                gates.push(format!("{negation}{}", cond.call.script));
            }
        }
        let joiner = if link.logic { " or " } else { " and " };
        println!("{pad}[if {}]", gates.join(joiner));
    }
    print_node(dialog, link.child, indent, depth, printed);
}

fn print_node(
    dialog: &Dialog,
    id: NodeId,
    indent: usize,
    depth: usize,
    printed: &mut HashSet<NodeId>,
) {
    let pad = "  ".repeat(indent);
    let Ok(node) = dialog.node(id) else {
        return;
    };
    let tag = match node.kind {
        NodeKind::Entry => format!("E{}", id.index()),
        NodeKind::Reply => format!("R{}", id.index()),
    };

    if !printed.insert(id) {
        println!("{pad}-> {tag} (above)");
        return;
    }

    let mut line = format!("{pad}{tag}");
    if !node.speaker.is_empty() {
        line.push_str(&format!(" [{}]", node.speaker));
    }
    if node.has_text() {
        line.push_str(&format!(": {}", truncate_text(&node.text.to_string(), 60)));
    }
    println!("{line}");

    if depth == 0 {
        if !node.links().is_empty() {
            println!("{pad}  ... (depth limit)");
        }
        return;
    }
    for link_id in node.links() {
        print_link(dialog, *link_id, indent + 1, depth - 1, printed);
    }
}

/// Truncate text for display
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.replace('\n', "\\n");
    if text.chars().count() > max_len {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text
    }
}
