//! Dialogue document reading

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::{Dialog, Link, LinkId, LinkParent, NodeId, NodeKind, Orphan};

use super::document::{DialogDoc, LinkRec, Snippet};

/// Read a dialogue from a JSON document file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or a
/// link record points past the end of its target table.
pub fn read_dialog<P: AsRef<Path>>(path: P) -> Result<Dialog> {
    let content = fs::read_to_string(path)?;
    parse_dialog(&content)
}

/// Parse a dialogue from JSON document text.
///
/// # Errors
/// Returns an error if the text is not valid JSON or a link record points
/// past the end of its target table.
pub fn parse_dialog(content: &str) -> Result<Dialog> {
    let doc: DialogDoc = serde_json::from_str(content)?;
    from_doc(&doc)
}

/// Build the in-memory graph from its interchange form.
///
/// Nodes get fresh handles in table order, entries first. Orphan records
/// already owned by the root set are dropped; table rows no link or orphan
/// record accounts for are surfaced as `(unlisted)` orphans, so nothing in
/// the document becomes unreachable in memory.
///
/// # Errors
/// Returns an error if a link or orphan record points past the end of its
/// target table.
pub fn from_doc(doc: &DialogDoc) -> Result<Dialog> {
    let mut dialog = Dialog::new();

    let entry_ids: Vec<NodeId> = doc
        .entries
        .iter()
        .map(|rec| dialog.alloc_node(rec.build_node(NodeKind::Entry)))
        .collect();
    let reply_ids: Vec<NodeId> = doc
        .replies
        .iter()
        .map(|rec| dialog.alloc_node(rec.build_node(NodeKind::Reply)))
        .collect();

    for (position, rec) in doc.starters.iter().enumerate() {
        let child = table_lookup(&entry_ids, rec.index, "entry")?;
        let link = dialog.alloc_link(build_link(LinkParent::Root, child, rec, position));
        dialog.starters.push(link);
    }
    for (table_index, rec) in doc.entries.iter().enumerate() {
        let parent = entry_ids[table_index];
        wire_links(&mut dialog, parent, &rec.links, &reply_ids, "reply")?;
    }
    for (table_index, rec) in doc.replies.iter().enumerate() {
        let parent = reply_ids[table_index];
        wire_links(&mut dialog, parent, &rec.links, &entry_ids, "entry")?;
    }

    for rec in &doc.orphans {
        let node = match rec.kind {
            NodeKind::Entry => table_lookup(&entry_ids, rec.index, "entry")?,
            NodeKind::Reply => table_lookup(&reply_ids, rec.index, "reply")?,
        };
        dialog.orphans.push(Orphan {
            node,
            former_path: rec.former_path.clone(),
        });
    }

    dialog.stunts = doc.stunts.clone();
    dialog.settings = doc.settings.clone();

    dialog.normalize_orphans();
    adopt_strays(&mut dialog);

    tracing::debug!(
        "loaded dialogue: {} entries, {} replies, {} links",
        dialog.entry_count(),
        dialog.reply_count(),
        dialog.link_count()
    );
    Ok(dialog)
}

/// Paste a snippet into a dialogue under the given parent context.
///
/// Used by [`Dialog::paste_deep`]. Every record is bounds-checked before
/// anything is allocated, so a failed paste leaves the dialogue unchanged.
pub(crate) fn graft(
    dialog: &mut Dialog,
    snippet: &Snippet,
    parent: LinkParent,
    position: usize,
) -> Result<(NodeId, LinkId)> {
    let required = match parent {
        LinkParent::Root => NodeKind::Entry,
        LinkParent::Node(parent_node) => dialog.node(parent_node)?.kind.child_kind(),
    };
    if snippet.kind != required {
        return Err(Error::SnippetKindMismatch {
            expected: required,
            found: snippet.kind,
        });
    }
    let len = dialog.list_of(parent)?.len();
    if position > len {
        return Err(Error::PositionOutOfRange { position, len });
    }
    let root_table = match snippet.kind {
        NodeKind::Entry => &snippet.entries,
        NodeKind::Reply => &snippet.replies,
    };
    if snippet.root >= root_table.len() {
        return Err(Error::InvalidLinkIndex {
            table: snippet.kind.as_str(),
            index: snippet.root,
            len: root_table.len(),
        });
    }
    for rec in &snippet.entries {
        for link in &rec.links {
            check_index(link, snippet.replies.len(), "reply")?;
        }
    }
    for rec in &snippet.replies {
        for link in &rec.links {
            check_index(link, snippet.entries.len(), "entry")?;
        }
    }

    let entry_ids: Vec<NodeId> = snippet
        .entries
        .iter()
        .map(|rec| dialog.alloc_node(rec.build_node(NodeKind::Entry)))
        .collect();
    let reply_ids: Vec<NodeId> = snippet
        .replies
        .iter()
        .map(|rec| dialog.alloc_node(rec.build_node(NodeKind::Reply)))
        .collect();
    for (table_index, rec) in snippet.entries.iter().enumerate() {
        wire_links(dialog, entry_ids[table_index], &rec.links, &reply_ids, "reply")?;
    }
    for (table_index, rec) in snippet.replies.iter().enumerate() {
        wire_links(dialog, reply_ids[table_index], &rec.links, &entry_ids, "entry")?;
    }

    let root = match snippet.kind {
        NodeKind::Entry => entry_ids[snippet.root],
        NodeKind::Reply => reply_ids[snippet.root],
    };
    let link = dialog.insert_link(parent, root, position)?;
    tracing::debug!(
        "pasted {} nodes under {parent} at {position}",
        entry_ids.len() + reply_ids.len()
    );
    Ok((root, link))
}

fn table_lookup(table: &[NodeId], index: usize, name: &'static str) -> Result<NodeId> {
    table
        .get(index)
        .copied()
        .ok_or(Error::InvalidLinkIndex {
            table: name,
            index,
            len: table.len(),
        })
}

fn check_index(rec: &LinkRec, len: usize, name: &'static str) -> Result<()> {
    if rec.index >= len {
        return Err(Error::InvalidLinkIndex {
            table: name,
            index: rec.index,
            len,
        });
    }
    Ok(())
}

fn build_link(parent: LinkParent, child: NodeId, rec: &LinkRec, position: usize) -> Link {
    let mut link = Link::new(parent, child);
    link.active1 = rec.active1.clone();
    link.active2 = rec.active2.clone();
    link.logic = rec.logic;
    link.comment = rec.comment.clone();
    link.list_index = position;
    link
}

/// Attach a node's outgoing links from their table records.
fn wire_links(
    dialog: &mut Dialog,
    parent: NodeId,
    records: &[LinkRec],
    table: &[NodeId],
    table_name: &'static str,
) -> Result<()> {
    for (position, rec) in records.iter().enumerate() {
        let child = table_lookup(table, rec.index, table_name)?;
        let link = dialog.alloc_link(build_link(LinkParent::Node(parent), child, rec, position));
        dialog.node_mut(parent)?.links.push(link);
    }
    Ok(())
}

/// Surface table rows nothing accounts for, so they stay visible.
fn adopt_strays(dialog: &mut Dialog) {
    let seeds: Vec<NodeId> = dialog
        .starters
        .iter()
        .filter_map(|link_id| dialog.link(*link_id).ok().map(|link| link.child))
        .chain(dialog.orphans.iter().map(|orphan| orphan.node))
        .collect();
    let mut owned = dialog.reachable_from(seeds);

    let strays: Vec<NodeId> = dialog.node_ids().filter(|id| !owned.contains(id)).collect();
    for id in strays {
        if owned.contains(&id) {
            continue;
        }
        owned.extend(dialog.reachable_from([id]));
        tracing::debug!("surfacing unlisted node {id} as an orphan");
        dialog.orphans.push(Orphan {
            node: id,
            former_path: "(unlisted)".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_document() {
        let content = r#"{
            "entries": [
                {"speaker": "atton", "text": {"substrings": {"0": "We're clear."}}, "links": [{"index": 0}]}
            ],
            "replies": [
                {"text": {"substrings": {"0": "Good."}}}
            ],
            "starters": [{"index": 0}]
        }"#;

        let dialog = parse_dialog(content).unwrap();
        assert_eq!(dialog.entry_count(), 1);
        assert_eq!(dialog.reply_count(), 1);
        assert_eq!(dialog.link_count(), 2);
        assert!(dialog.orphans().is_empty());

        let entry = dialog.link(dialog.starters()[0]).unwrap().child;
        assert_eq!(dialog.node(entry).unwrap().speaker, "atton");
        assert_eq!(dialog.display_path(entry).unwrap(), "root > E0");
    }

    #[test]
    fn test_list_indices_assigned_from_position() {
        let content = r#"{
            "entries": [{"links": [{"index": 0}, {"index": 1}, {"index": 0}]}],
            "replies": [{}, {}],
            "starters": [{"index": 0}]
        }"#;

        let dialog = parse_dialog(content).unwrap();
        let entry = dialog.link(dialog.starters()[0]).unwrap().child;
        for (position, link_id) in dialog.children_of(entry).unwrap().iter().enumerate() {
            assert_eq!(dialog.link(*link_id).unwrap().list_index, position);
        }
    }

    #[test]
    fn test_bad_link_index_rejected() {
        let content = r#"{
            "entries": [{"links": [{"index": 7}]}],
            "replies": [{}],
            "starters": [{"index": 0}]
        }"#;

        let err = parse_dialog(content).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLinkIndex {
                table: "reply",
                index: 7,
                len: 1
            }
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let content = r#"{"entires": []}"#;
        let err = parse_dialog(content).unwrap_err();
        assert!(matches!(err, Error::JsonError(_)));
    }

    #[test]
    fn test_unlisted_row_surfaces_as_orphan() {
        let content = r#"{
            "entries": [{}],
            "replies": [{"text": {"substrings": {"0": "Lost line."}}}],
            "starters": [{"index": 0}]
        }"#;

        let dialog = parse_dialog(content).unwrap();
        assert_eq!(dialog.orphans().len(), 1);
        assert_eq!(dialog.orphans()[0].former_path, "(unlisted)");
    }

    #[test]
    fn test_owned_orphan_record_dropped() {
        let content = r#"{
            "entries": [{}],
            "replies": [],
            "starters": [{"index": 0}],
            "orphans": [{"kind": "entry", "index": 0, "former_path": "root > E0"}]
        }"#;

        let dialog = parse_dialog(content).unwrap();
        assert!(dialog.orphans().is_empty());
    }
}
