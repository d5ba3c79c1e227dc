//! The dialogue graph: nodes, links, and structural editing
//!
//! # Overview
//!
//! A conversation is a graph over two kinds of spoken line:
//! - Entry nodes carry NPC lines, reply nodes carry player lines
//! - Links alternate strictly between the two kinds (starters point at
//!   entries, entries link to replies, replies link to entries)
//! - A node may be the target of any number of links, so the same line can
//!   show up at several places in the conversation, cycles included
//! - Nodes and links live in arenas addressed by stable integer handles;
//!   freed slots are tombstoned and never reused, so a stale handle fails
//!   lookup instead of silently naming a newer node
//!
//! Structural edits keep two invariants: every link's `list_index` equals
//! its position in its owning list, and a node that loses its last root
//! path surfaces in the orphan registry instead of leaking.
//!
//! # Usage
//!
//! ```no_run
//! use dlgkit::graph::Dialog;
//! use dlgkit::types::LocalizedText;
//!
//! let mut dlg = Dialog::new();
//!
//! // An NPC greeting with one player reply
//! let greeting = dlg.add_entry();
//! dlg.node_mut(greeting).unwrap().text = LocalizedText::from_english("Good hunting.");
//! dlg.add_starter(greeting, 0).unwrap();
//! let (reply, _link) = dlg.add_reply_under(greeting, 0).unwrap();
//! dlg.node_mut(reply).unwrap().text = LocalizedText::from_english("You too.");
//!
//! // Walk the conversation breadth-first
//! for id in dlg.walk() {
//!     let node = dlg.node(id).unwrap();
//!     println!("{}: {}", node.kind.display_name(), node.text);
//! }
//! ```

mod ids;
mod node;
mod link;
mod dialog;
mod edit;
mod orphan;
mod traverse;
mod iso;

pub use ids::{LinkId, NodeId};
pub use node::{Animation, Node, NodeKind};
pub use link::{Link, LinkParent};
pub use dialog::{ComputerType, ConversationType, Dialog, Settings, Stunt};
pub use orphan::Orphan;
pub use traverse::Walk;
pub use iso::{first_divergence, isomorphic};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::LocalizedText;

    /// starter -> E0 -> R1 -> E2
    fn spine() -> (Dialog, NodeId, NodeId, NodeId) {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r0, _) = dlg.add_reply_under(e0, 0).unwrap();
        let (e1, _) = dlg.add_entry_under(r0, 0).unwrap();
        (dlg, e0, r0, e1)
    }

    #[test]
    fn test_new_node_starts_orphaned() {
        let mut dlg = Dialog::new();
        let entry = dlg.add_entry();
        assert!(dlg.is_orphan(entry));
        assert_eq!(dlg.orphans()[0].former_path, "(new)");

        dlg.add_starter(entry, 0).unwrap();
        assert!(dlg.orphans().is_empty());
    }

    #[test]
    fn test_compose_ops_leave_no_orphans() {
        let (dlg, _, _, _) = spine();
        assert!(dlg.orphans().is_empty());
        assert_eq!(dlg.node_count(), 3);
        assert_eq!(dlg.entry_count(), 2);
        assert_eq!(dlg.reply_count(), 1);
        assert_eq!(dlg.link_count(), 3);
    }

    #[test]
    fn test_insert_renumbers_siblings() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r_a, _) = dlg.add_reply_under(e0, 0).unwrap();
        let (r_b, _) = dlg.add_reply_under(e0, 0).unwrap();
        let (r_c, _) = dlg.add_reply_under(e0, 1).unwrap();

        let children = dlg.children_of(e0).unwrap().to_vec();
        let order: Vec<NodeId> = children
            .iter()
            .map(|id| dlg.link(*id).unwrap().child)
            .collect();
        assert_eq!(order, vec![r_b, r_c, r_a]);
        for (position, link_id) in children.iter().enumerate() {
            assert_eq!(dlg.link(*link_id).unwrap().list_index, position);
        }
    }

    #[test]
    fn test_remove_renumbers_and_surfaces_orphan() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r_a, _) = dlg.add_reply_under(e0, 0).unwrap();
        let (r_b, middle) = dlg.add_reply_under(e0, 1).unwrap();
        let (r_c, _) = dlg.add_reply_under(e0, 2).unwrap();

        let detached = dlg.remove_link(middle).unwrap();
        assert_eq!(detached, r_b);

        let children = dlg.children_of(e0).unwrap().to_vec();
        let order: Vec<NodeId> = children
            .iter()
            .map(|id| dlg.link(*id).unwrap().child)
            .collect();
        assert_eq!(order, vec![r_a, r_c]);
        for (position, link_id) in children.iter().enumerate() {
            assert_eq!(dlg.link(*link_id).unwrap().list_index, position);
        }

        assert_eq!(dlg.orphans().len(), 1);
        assert_eq!(dlg.orphans()[0].node, r_b);
        assert_eq!(dlg.orphans()[0].former_path, "root > E0 > R2");
    }

    #[test]
    fn test_remove_keeps_aliased_child() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        let e1 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        dlg.add_starter(e1, 1).unwrap();
        let (r0, first) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.paste_alias(r0, LinkParent::Node(e1), 0).unwrap();

        dlg.remove_link(first).unwrap();
        assert!(dlg.orphans().is_empty());
        assert!(dlg.is_reachable(r0));
    }

    #[test]
    fn test_alternation_enforced() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        let e1 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();

        let err = dlg.insert_link(LinkParent::Node(e0), e1, 0).unwrap_err();
        assert!(matches!(err, Error::LinkKindMismatch { .. }));

        let reply = dlg.add_reply();
        let err = dlg.add_starter(reply, 1).unwrap_err();
        assert!(matches!(err, Error::StarterMustTargetEntry { .. }));
    }

    #[test]
    fn test_rejected_compose_op_leaves_document_unchanged() {
        let (mut dlg, e0, _, _) = spine();
        let nodes_before = dlg.node_count();
        let orphans_before = dlg.orphans().len();

        let err = dlg.add_reply_under(e0, 5).unwrap_err();
        assert!(matches!(err, Error::PositionOutOfRange { .. }));
        assert_eq!(dlg.node_count(), nodes_before);
        assert_eq!(dlg.orphans().len(), orphans_before);
    }

    #[test]
    fn test_move_link_renumbers() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r_a, first) = dlg.add_reply_under(e0, 0).unwrap();
        let (r_b, _) = dlg.add_reply_under(e0, 1).unwrap();
        let (r_c, _) = dlg.add_reply_under(e0, 2).unwrap();

        dlg.move_link(first, 2).unwrap();
        let children = dlg.children_of(e0).unwrap().to_vec();
        let order: Vec<NodeId> = children
            .iter()
            .map(|id| dlg.link(*id).unwrap().child)
            .collect();
        assert_eq!(order, vec![r_b, r_c, r_a]);
        for (position, link_id) in children.iter().enumerate() {
            assert_eq!(dlg.link(*link_id).unwrap().list_index, position);
        }

        let err = dlg.move_link(first, 3).unwrap_err();
        assert!(matches!(err, Error::PositionOutOfRange { .. }));
    }

    #[test]
    fn test_stale_handles_detected() {
        let (mut dlg, e0, r0, _) = spine();
        let starter = dlg.starters()[0];
        let inner = dlg.children_of(e0).unwrap()[0];
        dlg.remove_link(starter).unwrap();
        dlg.discard_orphan(e0).unwrap();

        assert!(matches!(dlg.node(e0), Err(Error::NodeFreed { .. })));
        assert!(matches!(dlg.node(r0), Err(Error::NodeFreed { .. })));
        assert!(matches!(dlg.link(inner), Err(Error::LinkFreed { .. })));
        assert!(matches!(dlg.node(NodeId(99)), Err(Error::NodeNotFound { .. })));
    }

    #[test]
    fn test_discard_frees_exclusive_subtree() {
        let (mut dlg, e0, _, _) = spine();
        let starter = dlg.starters()[0];
        dlg.remove_link(starter).unwrap();
        assert_eq!(dlg.orphans().len(), 1);

        dlg.discard_orphan(e0).unwrap();
        assert_eq!(dlg.node_count(), 0);
        assert_eq!(dlg.link_count(), 0);
        assert!(dlg.orphans().is_empty());
    }

    #[test]
    fn test_discard_spares_shared_nodes() {
        let (mut dlg, _, _, e1) = spine();
        let r_x = dlg.add_reply();
        dlg.insert_link(LinkParent::Node(r_x), e1, 0).unwrap();
        assert!(dlg.is_orphan(r_x));

        dlg.discard_orphan(r_x).unwrap();
        assert!(matches!(dlg.node(r_x), Err(Error::NodeFreed { .. })));
        assert!(dlg.node(e1).is_ok());
        assert!(dlg.is_reachable(e1));
    }

    #[test]
    fn test_discard_collects_cycle_only_fragment() {
        let mut dlg = Dialog::new();
        let e_a = dlg.add_entry();
        let (r_a, _) = dlg.add_reply_under(e_a, 0).unwrap();
        dlg.insert_link(LinkParent::Node(r_a), e_a, 0).unwrap();

        // Every member has an incoming edge, yet none has a root path.
        assert_eq!(dlg.orphans().len(), 1);
        assert_eq!(dlg.orphans()[0].node, e_a);

        dlg.discard_orphan(e_a).unwrap();
        assert_eq!(dlg.node_count(), 0);
        assert_eq!(dlg.link_count(), 0);
    }

    #[test]
    fn test_walk_terminates_on_cycle() {
        let (mut dlg, e0, r0, _) = spine();
        dlg.insert_link(LinkParent::Node(r0), e0, 1).unwrap();

        let reached: Vec<NodeId> = dlg.walk().collect();
        assert_eq!(reached.len(), 3);
        assert_eq!(reached[0], e0);
    }

    #[test]
    fn test_display_path() {
        let (mut dlg, e0, _, e1) = spine();
        assert_eq!(dlg.display_path(e1).unwrap(), "root > E0 > R1 > E2");
        assert_eq!(dlg.path_to(e1).unwrap().len(), 3);

        let starter = dlg.starters()[0];
        dlg.remove_link(starter).unwrap();
        assert_eq!(dlg.display_path(e0).unwrap(), "E0");
        assert!(dlg.path_to(e0).is_none());
    }

    #[test]
    fn test_find_references_counts_aliases() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        let e1 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        dlg.add_starter(e1, 1).unwrap();
        let (r0, _) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.paste_alias(r0, LinkParent::Node(e1), 0).unwrap();

        assert_eq!(dlg.find_references(r0).len(), 2);
        assert_eq!(dlg.find_references(e1).len(), 1);
    }

    #[test]
    fn test_restore_orphan_roundtrips() {
        let (mut dlg, e0, _, _) = spine();
        let snapshot = dlg.clone();

        let starter = dlg.starters()[0];
        dlg.remove_link(starter).unwrap();
        assert_eq!(dlg.orphans().len(), 1);

        dlg.restore_orphan(e0, LinkParent::Root, 0).unwrap();
        assert!(dlg.orphans().is_empty());
        assert!(
            isomorphic(&snapshot, &dlg),
            "divergence: {:?}",
            first_divergence(&snapshot, &dlg)
        );
    }

    #[test]
    fn test_restore_rejects_non_orphan() {
        let (mut dlg, e0, _, _) = spine();
        let err = dlg.restore_orphan(e0, LinkParent::Root, 0).unwrap_err();
        assert!(matches!(err, Error::NotAnOrphan { .. }));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut dlg, _, _, _) = spine();
        dlg.stunts.push(Stunt::default());
        dlg.settings.skippable = true;

        dlg.reset();
        assert_eq!(dlg.node_count(), 0);
        assert_eq!(dlg.link_count(), 0);
        assert!(dlg.starters().is_empty());
        assert!(dlg.orphans().is_empty());
        assert!(dlg.stunts.is_empty());
        assert_eq!(dlg.settings, Settings::default());
    }

    #[test]
    fn test_iso_detects_field_drift() {
        let (a, _, _, e1) = spine();
        let mut b = a.clone();
        assert!(isomorphic(&a, &b));

        b.node_mut(e1).unwrap().text = LocalizedText::from_english("changed");
        assert!(!isomorphic(&a, &b));
        let divergence = first_divergence(&a, &b).unwrap();
        assert!(divergence.contains("differ"), "{divergence}");
    }

    #[test]
    fn test_iso_ignores_handle_values() {
        let (a, _, _, _) = spine();

        // Same shape built on shifted handles.
        let mut b = Dialog::new();
        let junk = b.add_entry();
        b.discard_orphan(junk).unwrap();
        let e0 = b.add_entry();
        b.add_starter(e0, 0).unwrap();
        let (r0, _) = b.add_reply_under(e0, 0).unwrap();
        b.add_entry_under(r0, 0).unwrap();

        assert!(
            isomorphic(&a, &b),
            "divergence: {:?}",
            first_divergence(&a, &b)
        );
    }
}
