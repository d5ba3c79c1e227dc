//! Dialogue document writing

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::{Dialog, LinkId, NodeId, NodeKind};

use super::document::{DialogDoc, LinkRec, NodeRec, OrphanRec, Snippet};

/// Write a dialogue to a JSON document file.
///
/// # Errors
/// Returns an error if serialization fails or the file cannot be written.
pub fn write_dialog<P: AsRef<Path>>(path: P, dialog: &Dialog) -> Result<()> {
    let json = serialize_dialog(dialog)?;
    fs::write(path, json)?;
    Ok(())
}

/// Serialize a dialogue to pretty-printed JSON document text.
///
/// # Errors
/// Returns an error if the graph holds a stale handle.
pub fn serialize_dialog(dialog: &Dialog) -> Result<String> {
    let doc = to_doc(dialog)?;
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Project the in-memory graph into its interchange form.
///
/// Tables are laid out in live-handle order, so saving the same document
/// twice produces identical text.
///
/// # Errors
/// Returns an error if the graph holds a stale handle.
pub fn to_doc(dialog: &Dialog) -> Result<DialogDoc> {
    let mut entry_ids: Vec<NodeId> = Vec::new();
    let mut reply_ids: Vec<NodeId> = Vec::new();
    let mut table_index: HashMap<NodeId, usize> = HashMap::new();
    for id in dialog.node_ids() {
        match dialog.node(id)?.kind {
            NodeKind::Entry => {
                table_index.insert(id, entry_ids.len());
                entry_ids.push(id);
            }
            NodeKind::Reply => {
                table_index.insert(id, reply_ids.len());
                reply_ids.push(id);
            }
        }
    }

    let mut doc = DialogDoc::default();
    for link_id in dialog.starters() {
        doc.starters.push(link_rec(dialog, *link_id, &table_index)?);
    }
    for id in &entry_ids {
        doc.entries.push(node_rec(dialog, *id, &table_index)?);
    }
    for id in &reply_ids {
        doc.replies.push(node_rec(dialog, *id, &table_index)?);
    }
    for orphan in dialog.orphans() {
        let kind = dialog.node(orphan.node)?.kind;
        let index = *table_index
            .get(&orphan.node)
            .ok_or(Error::NodeFreed { id: orphan.node })?;
        doc.orphans.push(OrphanRec {
            kind,
            index,
            former_path: orphan.former_path.clone(),
        });
    }
    doc.stunts = dialog.stunts.clone();
    doc.settings = dialog.settings.clone();
    Ok(doc)
}

/// Serialize the subtree rooted at a node, for copy and paste.
///
/// Used by [`Dialog::copy_subtree`]. The subtree is walked breadth-first in
/// list order, so the table layout is deterministic; links within the
/// subtree become table indices, aliases and cycles included.
pub(crate) fn snippet_from(dialog: &Dialog, node: NodeId) -> Result<Snippet> {
    let root_kind = dialog.node(node)?.kind;

    let mut order: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    seen.insert(node);
    queue.push_back(node);
    while let Some(current) = queue.pop_front() {
        order.push(current);
        for link_id in dialog.node(current)?.links() {
            let child = dialog.link(*link_id)?.child;
            if seen.insert(child) {
                queue.push_back(child);
            }
        }
    }

    let mut entry_ids: Vec<NodeId> = Vec::new();
    let mut reply_ids: Vec<NodeId> = Vec::new();
    let mut table_index: HashMap<NodeId, usize> = HashMap::new();
    for id in &order {
        match dialog.node(*id)?.kind {
            NodeKind::Entry => {
                table_index.insert(*id, entry_ids.len());
                entry_ids.push(*id);
            }
            NodeKind::Reply => {
                table_index.insert(*id, reply_ids.len());
                reply_ids.push(*id);
            }
        }
    }

    let mut snippet = Snippet {
        kind: root_kind,
        root: *table_index
            .get(&node)
            .ok_or(Error::NodeFreed { id: node })?,
        entries: Vec::new(),
        replies: Vec::new(),
    };
    for id in &entry_ids {
        snippet.entries.push(node_rec(dialog, *id, &table_index)?);
    }
    for id in &reply_ids {
        snippet.replies.push(node_rec(dialog, *id, &table_index)?);
    }
    Ok(snippet)
}

fn node_rec(
    dialog: &Dialog,
    id: NodeId,
    table_index: &HashMap<NodeId, usize>,
) -> Result<NodeRec> {
    let node = dialog.node(id)?;
    let mut rec = NodeRec::from_node(node);
    for link_id in node.links() {
        rec.links.push(link_rec(dialog, *link_id, table_index)?);
    }
    Ok(rec)
}

fn link_rec(
    dialog: &Dialog,
    id: LinkId,
    table_index: &HashMap<NodeId, usize>,
) -> Result<LinkRec> {
    let link = dialog.link(id)?;
    let index = *table_index
        .get(&link.child)
        .ok_or(Error::NodeFreed { id: link.child })?;
    Ok(LinkRec::from_link(link, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::graph::{
        first_divergence, Animation, ConversationType, LinkParent, Stunt,
    };
    use crate::interchange::{parse_dialog, read_dialog};
    use crate::types::{LocalizedText, ResRef};

    /// A dialogue exercising aliases, a cycle, payloads, an orphan, stunts,
    /// and settings.
    fn sample_dialog() -> Dialog {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        {
            let node = dlg.node_mut(e0).unwrap();
            node.speaker = "kreia".to_string();
            node.text = LocalizedText::from_english("Apathy is death.");
            node.vo_resref = ResRef::new("n_dkreia_apathy").unwrap();
            node.camera_angle = 2;
            node.quest = "kreia_training".to_string();
            node.quest_entry = Some(10);
            node.animations.push(Animation {
                animation_id: 28,
                participant: "owner".to_string(),
            });
        }

        let (r0, gate) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.node_mut(r0).unwrap().text = LocalizedText::from_english("Then teach me.");
        {
            let link = dlg.link_mut(gate).unwrap();
            link.active1.call.script = ResRef::new("c_influence_high").unwrap();
            link.active1.negated = true;
            link.logic = true;
            link.comment = "influence gate".to_string();
        }

        let (e1, _) = dlg.add_entry_under(r0, 0).unwrap();
        dlg.node_mut(e1).unwrap().text = LocalizedText::from_english("Then listen well.");
        // Loop back to the opening line, and alias e1 as a second starter.
        dlg.insert_link(LinkParent::Node(r0), e0, 1).unwrap();
        dlg.add_starter(e1, 1).unwrap();

        let (r_cut, cut_link) = dlg.add_reply_under(e1, 0).unwrap();
        dlg.node_mut(r_cut).unwrap().text = LocalizedText::from_english("Cut for pacing.");
        dlg.remove_link(cut_link).unwrap();

        dlg.stunts.push(Stunt {
            participant: "owner".to_string(),
            stunt_model: ResRef::new("cutscene_cam").unwrap(),
        });
        dlg.settings.on_end = ResRef::new("k_end_dlg").unwrap();
        dlg.settings.skippable = true;
        dlg.settings.conversation_type = ConversationType::Human;
        dlg
    }

    #[test]
    fn test_roundtrip_is_isomorphic() {
        let a = sample_dialog();
        assert_eq!(a.orphans().len(), 1);

        let json = serialize_dialog(&a).unwrap();
        let b = parse_dialog(&json).unwrap();
        assert_eq!(first_divergence(&a, &b), None);
    }

    #[test]
    fn test_save_is_deterministic() {
        let dlg = sample_dialog();
        assert_eq!(
            serialize_dialog(&dlg).unwrap(),
            serialize_dialog(&dlg).unwrap()
        );
    }

    #[test]
    fn test_snippet_roundtrips_through_json() {
        let mut a = Dialog::new();
        let e0 = a.add_entry();
        a.add_starter(e0, 0).unwrap();
        a.node_mut(e0).unwrap().text = LocalizedText::from_english("State your business.");
        let (r0, inner) = a.add_reply_under(e0, 0).unwrap();
        a.node_mut(r0).unwrap().text = LocalizedText::from_english("[Back to topics]");
        a.link_mut(inner).unwrap().comment = "hub return".to_string();
        a.insert_link(LinkParent::Node(r0), e0, 0).unwrap();

        let snippet = a.copy_subtree(e0).unwrap();
        let json = serde_json::to_string(&snippet).unwrap();
        let parsed: Snippet = serde_json::from_str(&json).unwrap();

        let mut b = Dialog::new();
        b.paste_deep(&parsed, LinkParent::Root, 0).unwrap();
        assert_eq!(first_divergence(&a, &b), None);
    }

    #[test]
    fn test_paste_rejects_kind_mismatch() {
        let mut a = Dialog::new();
        let e0 = a.add_entry();
        a.add_starter(e0, 0).unwrap();
        let (r0, _) = a.add_reply_under(e0, 0).unwrap();
        let snippet = a.copy_subtree(r0).unwrap();

        let mut b = Dialog::new();
        let err = b.paste_deep(&snippet, LinkParent::Root, 0).unwrap_err();
        assert!(matches!(err, Error::SnippetKindMismatch { .. }));
        assert_eq!(b.node_count(), 0);
    }

    #[test]
    fn test_paste_duplicates_instead_of_aliasing() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r0, _) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.node_mut(r0).unwrap().text = LocalizedText::from_english("Again?");

        let snippet = dlg.copy_subtree(r0).unwrap();
        let (pasted, _) = dlg
            .paste_deep(&snippet, LinkParent::Node(e0), 1)
            .unwrap();

        assert_ne!(pasted, r0);
        assert!(dlg.node(pasted).unwrap().fields_eq(dlg.node(r0).unwrap()));
        assert_eq!(dlg.find_references(r0).len(), 1);
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sith_academy.dlg.json");

        let a = sample_dialog();
        write_dialog(&path, &a).unwrap();
        let b = read_dialog(&path).unwrap();
        assert_eq!(first_divergence(&a, &b), None);
    }
}
