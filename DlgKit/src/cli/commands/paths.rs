//! CLI command for listing every root path to a node
//!
//! Useful when a node is aliased from several places and the tree view
//! shows it more than once.

use std::collections::HashSet;
use std::path::Path;

use crate::graph::{Dialog, NodeId, NodeKind};
use crate::interchange::read_dialog;

pub fn execute(source: &Path, node_index: u32) -> anyhow::Result<()> {
    let dialog = read_dialog(source)?;
    let target = NodeId(node_index);
    if dialog.node(target).is_err() {
        anyhow::bail!("Node not found: {target}");
    }

    let mut found = Vec::new();
    let mut trail = Vec::new();
    let mut on_path = HashSet::new();

    for link_id in dialog.starters() {
        if let Ok(link) = dialog.link(*link_id) {
            collect(&dialog, link.child, target, "root", &mut trail, &mut on_path, &mut found);
        }
    }
    for orphan in dialog.orphans() {
        collect(&dialog, orphan.node, target, "orphan", &mut trail, &mut on_path, &mut found);
    }

    let tag = node_tag(&dialog, target);
    if found.is_empty() {
        println!("No path from any starter or orphan reaches {tag}");
    } else {
        println!("{} path(s) to {tag}:", found.len());
        for path in &found {
            println!("  {path}");
        }
    }

    Ok(())
}

/// Depth-first search recording each acyclic path that ends at `target`.
fn collect(
    dialog: &Dialog,
    current: NodeId,
    target: NodeId,
    prefix: &str,
    trail: &mut Vec<String>,
    on_path: &mut HashSet<NodeId>,
    found: &mut Vec<String>,
) {
    if !on_path.insert(current) {
        return;
    }
    trail.push(node_tag(dialog, current));

    if current == target {
        found.push(format!("{prefix} > {}", trail.join(" > ")));
    } else if let Ok(links) = dialog.children_of(current) {
        for link_id in links {
            if let Ok(link) = dialog.link(*link_id) {
                collect(dialog, link.child, target, prefix, trail, on_path, found);
            }
        }
    }

    trail.pop();
    on_path.remove(&current);
}

fn node_tag(dialog: &Dialog, id: NodeId) -> String {
    match dialog.node(id).map(|node| node.kind) {
        Ok(NodeKind::Entry) => format!("E{}", id.index()),
        Ok(NodeKind::Reply) => format!("R{}", id.index()),
        Err(_) => format!("{id}"),
    }
}
