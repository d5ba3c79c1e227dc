//! Dialogue integrity checking
//!
//! Re-checks every structural invariant on a loaded document: list order,
//! link backrefs, kind alternation, orphan registration, reachability.
//! Includes a parallel batch mode for whole directories.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::graph::{Dialog, LinkId, LinkParent, NodeId, NodeKind};
use crate::interchange::{read_dialog, DIALOG_EXTENSION};

/// Result of a dialogue integrity check
#[derive(Clone, Debug)]
pub struct IntegrityResult {
    /// Whether the document passes every check
    pub valid: bool,
    /// Number of entry nodes
    pub entry_count: usize,
    /// Number of reply nodes
    pub reply_count: usize,
    /// Any integrity issues found
    pub issues: Vec<String>,
}

/// Result of a batch validation run
#[derive(Clone, Debug)]
pub struct BatchValidateResult {
    /// Number of files that passed
    pub valid_count: usize,
    /// Number of files with issues or load failures
    pub invalid_count: usize,
    /// One message per file processed
    pub results: Vec<String>,
}

/// Check every structural invariant of a dialogue.
///
/// Covers: list positions match `list_index`, link backrefs agree with their
/// holder, entries and replies alternate, every live link is held by exactly
/// one list, orphan records point at live detached nodes, and every live
/// node is reachable from a starter or an orphan root.
#[must_use]
pub fn check_dialog(dialog: &Dialog) -> IntegrityResult {
    let mut issues = Vec::new();

    check_list(dialog, LinkParent::Root, dialog.starters(), &mut issues);
    for node_id in dialog.node_ids() {
        if let Ok(node) = dialog.node(node_id) {
            check_list(dialog, LinkParent::Node(node_id), node.links(), &mut issues);
        }
    }

    let mut held: HashMap<LinkId, usize> = HashMap::new();
    for link_id in dialog.starters() {
        *held.entry(*link_id).or_insert(0) += 1;
    }
    for node_id in dialog.node_ids() {
        if let Ok(node) = dialog.node(node_id) {
            for link_id in node.links() {
                *held.entry(*link_id).or_insert(0) += 1;
            }
        }
    }
    for link_id in dialog.link_ids() {
        match held.get(&link_id) {
            Some(1) => {}
            Some(n) => issues.push(format!("link {link_id} is held by {n} lists")),
            None => issues.push(format!("link {link_id} is held by no list")),
        }
    }

    let mut registered = HashSet::new();
    for orphan in dialog.orphans() {
        if !registered.insert(orphan.node) {
            issues.push(format!("node {} is registered as an orphan twice", orphan.node));
            continue;
        }
        if dialog.node(orphan.node).is_err() {
            issues.push(format!("orphan record points at freed node {}", orphan.node));
            continue;
        }
        let references = dialog.find_references(orphan.node);
        if !references.is_empty() {
            issues.push(format!(
                "orphan {} still has {} live reference(s)",
                orphan.node,
                references.len()
            ));
        }
    }

    for node_id in unreachable_nodes(dialog) {
        issues.push(format!(
            "node {node_id} is unreachable and not registered as an orphan"
        ));
    }

    IntegrityResult {
        valid: issues.is_empty(),
        entry_count: dialog.entry_count(),
        reply_count: dialog.reply_count(),
        issues,
    }
}

/// Check one outgoing list: backrefs, positions, target liveness, alternation.
fn check_list(dialog: &Dialog, parent: LinkParent, list: &[LinkId], issues: &mut Vec<String>) {
    let expected = match parent {
        LinkParent::Root => NodeKind::Entry,
        LinkParent::Node(id) => match dialog.node(id) {
            Ok(node) => node.kind.child_kind(),
            Err(_) => return,
        },
    };

    for (position, link_id) in list.iter().enumerate() {
        let Ok(link) = dialog.link(*link_id) else {
            issues.push(format!("{parent} holds freed link {link_id}"));
            continue;
        };
        if link.parent != parent {
            issues.push(format!(
                "link {link_id} backref says {} but {parent} holds it",
                link.parent
            ));
        }
        if link.list_index != position {
            issues.push(format!(
                "link {link_id} carries list_index {} at position {position}",
                link.list_index
            ));
        }
        match dialog.node(link.child) {
            Ok(child) if child.kind != expected => issues.push(format!(
                "link {link_id} points at a {} where a {} belongs",
                child.kind.display_name(),
                expected.display_name()
            )),
            Ok(_) => {}
            Err(_) => issues.push(format!("link {link_id} targets freed node {}", link.child)),
        }
    }
}

/// Live nodes not reachable from any starter or orphan root.
fn unreachable_nodes(dialog: &Dialog) -> Vec<NodeId> {
    let mut reached = HashSet::new();
    let mut queue: VecDeque<NodeId> = dialog
        .starters()
        .iter()
        .filter_map(|id| dialog.link(*id).ok())
        .map(|link| link.child)
        .collect();
    queue.extend(dialog.orphans().iter().map(|orphan| orphan.node));

    while let Some(node_id) = queue.pop_front() {
        if !reached.insert(node_id) {
            continue;
        }
        if let Ok(node) = dialog.node(node_id) {
            for link_id in node.links() {
                if let Ok(link) = dialog.link(*link_id) {
                    queue.push_back(link.child);
                }
            }
        }
    }

    dialog
        .node_ids()
        .filter(|node_id| !reached.contains(node_id))
        .collect()
}

/// Load a dialogue file and check it.
///
/// A file that fails to load reports as invalid with the load error as its
/// single issue, so batch runs keep going.
#[must_use]
pub fn check_file(path: &Path) -> IntegrityResult {
    match read_dialog(path) {
        Ok(dialog) => check_dialog(&dialog),
        Err(e) => IntegrityResult {
            valid: false,
            entry_count: 0,
            reply_count: 0,
            issues: vec![format!("Failed to load: {e}")],
        },
    }
}

/// Find all dialogue files in a folder recursively
#[must_use]
pub fn find_dialog_files(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && e.file_name().to_string_lossy().ends_with(DIALOG_EXTENSION)
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Validate multiple dialogue files in parallel
///
/// # Arguments
/// * `files` - List of dialogue file paths to check
/// * `progress` - Callback for progress updates (current, total, description)
///
/// # Returns
/// Summary of the batch run.
pub fn validate_batch<F>(files: &[PathBuf], progress: F) -> BatchValidateResult
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    let total = files.len();
    let valid_counter = AtomicUsize::new(0);
    let invalid_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);

    let results: Vec<String> = files
        .par_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map_or_else(|| "unknown".to_string(), |n| n.to_string_lossy().to_string());

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(current, total, &name);

            let report = check_file(path);
            if report.valid {
                valid_counter.fetch_add(1, Ordering::SeqCst);
                format!(
                    "Validated {name}: {} entries, {} replies",
                    report.entry_count, report.reply_count
                )
            } else {
                invalid_counter.fetch_add(1, Ordering::SeqCst);
                format!("Failed {name}: {}", report.issues.join("; "))
            }
        })
        .collect();

    tracing::info!(
        "Batch validation done: {} ok, {} with issues",
        valid_counter.load(Ordering::SeqCst),
        invalid_counter.load(Ordering::SeqCst)
    );

    BatchValidateResult {
        valid_count: valid_counter.load(Ordering::SeqCst),
        invalid_count: invalid_counter.load(Ordering::SeqCst),
        results,
    }
}
