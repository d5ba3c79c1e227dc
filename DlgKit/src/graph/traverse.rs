//! Cycle-safe traversal over the dialogue graph
//!
//! Conversations routinely loop back to earlier lines ("[Back to topics]"),
//! so every walk here carries a visited set and terminates on cyclic graphs.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{Dialog, LinkId, LinkParent, NodeId, NodeKind};
use crate::error::Result;

/// Breadth-first iterator over the nodes reachable from the starter list.
///
/// Yields each node exactly once, even when it is aliased under several
/// parents or participates in a cycle.
pub struct Walk<'a> {
    dialog: &'a Dialog,
    queue: VecDeque<NodeId>,
    seen: HashSet<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        if let Ok(node) = self.dialog.node(id) {
            for link_id in &node.links {
                if let Ok(link) = self.dialog.link(*link_id)
                    && self.seen.insert(link.child)
                {
                    self.queue.push_back(link.child);
                }
            }
        }
        Some(id)
    }
}

impl Dialog {
    /// Walk every node reachable from the starter list, breadth-first.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        for link_id in &self.starters {
            if let Ok(link) = self.link(*link_id)
                && seen.insert(link.child)
            {
                queue.push_back(link.child);
            }
        }
        Walk {
            dialog: self,
            queue,
            seen,
        }
    }

    /// Collect every node reachable from the given seed nodes.
    pub(crate) fn reachable_from<I>(&self, seeds: I) -> HashSet<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        for seed in seeds {
            if self.node(seed).is_ok() && seen.insert(seed) {
                queue.push_back(seed);
            }
        }
        while let Some(id) = queue.pop_front() {
            if let Ok(node) = self.node(id) {
                for link_id in &node.links {
                    if let Ok(link) = self.link(*link_id)
                        && seen.insert(link.child)
                    {
                        queue.push_back(link.child);
                    }
                }
            }
        }
        seen
    }

    /// Whether a node is reachable from the starter list.
    #[must_use]
    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.walk().any(|reached| reached == id)
    }

    /// Every live link targeting a node, in handle order.
    ///
    /// More than one result means the node is aliased: the same line shows
    /// up at several places in the conversation.
    #[must_use]
    pub fn find_references(&self, id: NodeId) -> Vec<LinkId> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.as_ref().is_some_and(|link| link.child == id))
            .map(|(index, _)| LinkId(index as u32))
            .collect()
    }

    /// One shortest chain of links from the starter list to a node.
    ///
    /// Returns `None` when the node has no root path (it is orphaned or
    /// only reachable from orphans).
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Option<Vec<LinkId>> {
        let mut prev: HashMap<NodeId, LinkId> = HashMap::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        for link_id in &self.starters {
            if let Ok(link) = self.link(*link_id)
                && !prev.contains_key(&link.child)
            {
                prev.insert(link.child, *link_id);
                queue.push_back(link.child);
            }
        }

        while let Some(current) = queue.pop_front() {
            if current == id {
                return Some(self.unwind_path(id, &prev));
            }
            if let Ok(node) = self.node(current) {
                for link_id in &node.links {
                    if let Ok(link) = self.link(*link_id)
                        && !prev.contains_key(&link.child)
                    {
                        prev.insert(link.child, *link_id);
                        queue.push_back(link.child);
                    }
                }
            }
        }
        None
    }

    fn unwind_path(&self, id: NodeId, prev: &HashMap<NodeId, LinkId>) -> Vec<LinkId> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(link_id) = prev.get(&current) {
            path.push(*link_id);
            match self.link(*link_id).map(|link| link.parent) {
                Ok(LinkParent::Node(parent)) => current = parent,
                _ => break,
            }
        }
        path.reverse();
        path
    }

    /// Human-readable root path for a node, like `root > E0 > R2 > E5`.
    ///
    /// Falls back to the node's own tag when it has no root path.
    ///
    /// # Errors
    /// Returns an error if the handle is stale.
    pub fn display_path(&self, id: NodeId) -> Result<String> {
        self.node(id)?;
        let Some(path) = self.path_to(id) else {
            return Ok(self.node_tag(id));
        };
        let mut out = String::from("root");
        for link_id in path {
            let link = self.link(link_id)?;
            out.push_str(" > ");
            out.push_str(&self.node_tag(link.child));
        }
        Ok(out)
    }

    fn node_tag(&self, id: NodeId) -> String {
        match self.node(id).map(|node| node.kind) {
            Ok(NodeKind::Entry) => format!("E{}", id.index()),
            Ok(NodeKind::Reply) => format!("R{}", id.index()),
            Err(_) => format!("{id}"),
        }
    }
}
