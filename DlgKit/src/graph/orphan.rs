//! Orphan tracking
//!
//! Deleting a link detaches the subtree behind it but does not destroy it:
//! nodes that lose their last root path are surfaced into a side registry
//! with their last-known position recorded, so the user can inspect and
//! reattach them. True destruction happens only on explicit discard or a
//! whole-document reset.
//!
//! Detection is an explicit reachability sweep run after each structural
//! mutation. A reference count would miss cycle-only fragments (every member
//! still has an incoming edge); the sweep is authoritative.

use std::collections::HashSet;

use super::{Dialog, LinkId, NodeId};
use crate::error::{Error, Result};

/// A node detached from the root set, held pending user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    /// The detached node. Its subtree stays owned by it and is not
    /// separately listed.
    pub node: NodeId,
    /// Where the node last hung in the conversation, for display.
    pub former_path: String,
}

impl Dialog {
    /// The orphan registry, in detachment order.
    #[must_use]
    pub fn orphans(&self) -> &[Orphan] {
        &self.orphans
    }

    /// Whether a node is currently registered as an orphan root.
    #[must_use]
    pub fn is_orphan(&self, id: NodeId) -> bool {
        self.orphans.iter().any(|orphan| orphan.node == id)
    }

    /// Reattach an orphan under a parent context at the given position.
    ///
    /// The node comes back with its field values and subtree untouched, and
    /// its registry entry is removed.
    ///
    /// # Errors
    /// Returns an error if the node is not an orphan root, the position is
    /// out of range, or the link would violate the entry/reply alternation.
    pub fn restore_orphan(
        &mut self,
        node: NodeId,
        parent: super::LinkParent,
        position: usize,
    ) -> Result<LinkId> {
        if !self.is_orphan(node) {
            return Err(Error::NotAnOrphan { id: node });
        }
        let link = self.insert_link(parent, node, position)?;
        tracing::debug!("restored orphan {node} under {parent}");
        Ok(link)
    }

    /// Destroy an orphan root and every node exclusively owned by it.
    ///
    /// Nodes still reachable from the starter list or from another orphan
    /// root survive; only the exclusive part of the subtree is freed. Cycles
    /// inside the discarded fragment are freed with it.
    ///
    /// # Errors
    /// Returns an error if the node is not an orphan root.
    pub fn discard_orphan(&mut self, node: NodeId) -> Result<()> {
        let Some(entry) = self.orphans.iter().position(|orphan| orphan.node == node) else {
            return Err(Error::NotAnOrphan { id: node });
        };
        self.orphans.remove(entry);

        let mut keep = self.reachable_from(self.root_seeds());
        let other_roots: Vec<NodeId> = self.orphans.iter().map(|orphan| orphan.node).collect();
        keep.extend(self.reachable_from(other_roots));

        let doomed: Vec<NodeId> = self
            .reachable_from([node])
            .into_iter()
            .filter(|id| !keep.contains(id))
            .collect();

        let mut doomed_links: Vec<LinkId> = Vec::new();
        for id in &doomed {
            if let Ok(n) = self.node(*id) {
                doomed_links.extend_from_slice(&n.links);
            }
        }
        for link in doomed_links {
            self.free_link(link);
        }
        for id in &doomed {
            self.free_node(*id);
        }

        tracing::debug!("discarded orphan {node}, freed {} nodes", doomed.len());
        Ok(())
    }

    /// Clear the whole document: nodes, links, starters, stunts, settings,
    /// and the orphan registry.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::debug!("dialogue reset");
    }

    /// Surface a node into the orphan registry if the mutation that just
    /// happened cut its last root path.
    ///
    /// `former_path` is the provenance recorded before the cut. Everything
    /// the node still reaches is owned by it and not separately listed.
    pub(crate) fn surface_if_detached(&mut self, node: NodeId, former_path: String) {
        if self.node(node).is_err() {
            return;
        }
        let mut live = self.reachable_from(self.root_seeds());
        let roots: Vec<NodeId> = self.orphans.iter().map(|orphan| orphan.node).collect();
        live.extend(self.reachable_from(roots));

        if !live.contains(&node) {
            tracing::debug!("orphaned {node} (was {former_path})");
            self.orphans.push(Orphan { node, former_path });
        }
    }

    /// Drop registry entries for nodes that regained a root path or were
    /// absorbed into an earlier orphan's subtree.
    pub(crate) fn normalize_orphans(&mut self) {
        let mut owned: HashSet<NodeId> = self.reachable_from(self.root_seeds());
        let mut retained = Vec::new();
        for orphan in std::mem::take(&mut self.orphans) {
            if owned.contains(&orphan.node) {
                tracing::debug!("orphan {} reattached (was {})", orphan.node, orphan.former_path);
                continue;
            }
            owned.extend(self.reachable_from([orphan.node]));
            retained.push(orphan);
        }
        self.orphans = retained;
    }

    /// The nodes the starter links point at.
    fn root_seeds(&self) -> Vec<NodeId> {
        self.starters
            .iter()
            .filter_map(|link_id| self.link(*link_id).ok().map(|link| link.child))
            .collect()
    }
}
