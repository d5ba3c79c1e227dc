//! Tree view projection
//!
//! A conversation graph is displayed as a tree, so a node aliased under
//! several parents is shown once per occurrence. This module keeps that
//! projection as plain data, with no widget toolkit attached: items live in
//! an arena, and reverse registries record every item currently displaying a
//! given node or link. Field edits made through one occurrence reach the
//! others through [`ViewTree::refresh_node`]; structural edits are mirrored
//! by the `sync_link_*` calls.
//!
//! Expansion is lazy. A cycle in the graph stays finite on screen because
//! child items materialize only when their parent item is expanded.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::graph::{Dialog, LinkId, LinkParent, NodeId, NodeKind};

/// How many characters of node text a label shows before truncating.
const LABEL_PREVIEW_LEN: usize = 48;

/// Handle to an item in a [`ViewTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewItemId(u32);

impl ViewItemId {
    /// The raw arena index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ViewItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One visible occurrence of a link and the node it points at.
#[derive(Debug, Clone)]
pub struct ViewItem {
    link: LinkId,
    node: NodeId,
    parent: Option<ViewItemId>,
    children: Vec<ViewItemId>,
    expanded: bool,
    label: String,
}

impl ViewItem {
    /// The link occurrence this item displays.
    #[must_use]
    pub fn link(&self) -> LinkId {
        self.link
    }

    /// The node this item displays.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The containing item, or `None` for a root item.
    #[must_use]
    pub fn parent(&self) -> Option<ViewItemId> {
        self.parent
    }

    /// Child items, in list order. Empty while collapsed.
    #[must_use]
    pub fn children(&self) -> &[ViewItemId] {
        &self.children
    }

    /// Whether the item has materialized its children.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A display-side mirror of a dialogue graph.
///
/// Root items track the starter list one-to-one; everything deeper
/// materializes on demand. The registries are exact: after any synchronized
/// structural edit, the items recorded against a node are precisely the
/// items displaying it.
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    /// Item arena; `None` marks a freed slot.
    items: Vec<Option<ViewItem>>,
    /// Root items, one per starter link, in list order.
    roots: Vec<ViewItemId>,
    /// Every live item displaying a given node.
    by_node: HashMap<NodeId, Vec<ViewItemId>>,
    /// Every live item displaying a given link.
    by_link: HashMap<LinkId, Vec<ViewItemId>>,
}

impl ViewTree {
    /// Project a dialogue's starter list into root items, all collapsed.
    ///
    /// # Errors
    /// Returns an error if a starter link handle is stale.
    pub fn new(dialog: &Dialog) -> Result<Self> {
        let mut tree = Self::default();
        for link_id in dialog.starters() {
            let child = dialog.link(*link_id)?.child;
            let item = tree.alloc_item(None, *link_id, child, compose_label(dialog, child));
            tree.roots.push(item);
        }
        Ok(tree)
    }

    /// Root items, in starter order.
    #[must_use]
    pub fn roots(&self) -> &[ViewItemId] {
        &self.roots
    }

    /// Get an item by handle.
    ///
    /// # Errors
    /// Returns an error if the handle is stale.
    pub fn item(&self, id: ViewItemId) -> Result<&ViewItem> {
        match self.items.get(id.0 as usize) {
            Some(Some(item)) => Ok(item),
            _ => Err(Error::ViewItemNotFound { index: id.0 }),
        }
    }

    /// Every live item displaying a node.
    #[must_use]
    pub fn items_for_node(&self, node: NodeId) -> &[ViewItemId] {
        self.by_node.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Every live item displaying a link.
    #[must_use]
    pub fn items_for_link(&self, link: LinkId) -> &[ViewItemId] {
        self.by_link.get(&link).map_or(&[], Vec::as_slice)
    }

    /// Materialize one child item per outgoing link of the item's node.
    ///
    /// Expanding an already-expanded item is a no-op. Expanding along a
    /// cycle is permitted; each call materializes one more level.
    ///
    /// # Errors
    /// Returns an error if the item handle or the node's graph handles are
    /// stale.
    pub fn expand(&mut self, id: ViewItemId, dialog: &Dialog) -> Result<()> {
        let (node, expanded) = {
            let item = self.item(id)?;
            (item.node, item.expanded)
        };
        if expanded {
            return Ok(());
        }

        let links = dialog.children_of(node)?.to_vec();
        let mut children = Vec::with_capacity(links.len());
        for link_id in links {
            let child = dialog.link(link_id)?.child;
            children.push(self.alloc_item(
                Some(id),
                link_id,
                child,
                compose_label(dialog, child),
            ));
        }

        let item = self.item_mut(id)?;
        item.children = children;
        item.expanded = true;
        Ok(())
    }

    /// Drop an item's materialized subtree and mark it collapsed.
    ///
    /// Every descendant item, expanded or not, is unregistered.
    ///
    /// # Errors
    /// Returns an error if the item handle is stale.
    pub fn collapse(&mut self, id: ViewItemId) -> Result<()> {
        let children = std::mem::take(&mut self.item_mut(id)?.children);
        for child in children {
            self.free_subtree(child);
        }
        self.item_mut(id)?.expanded = false;
        Ok(())
    }

    /// Mirror a link insertion that just happened in the graph.
    ///
    /// A new child item appears under every expanded item displaying the
    /// link's parent context. Collapsed occurrences pick the link up when
    /// they are next expanded.
    ///
    /// # Errors
    /// Returns an error if the link handle is stale.
    pub fn sync_link_inserted(&mut self, link: LinkId, dialog: &Dialog) -> Result<()> {
        let (parent, child, position) = {
            let stored = dialog.link(link)?;
            (stored.parent, stored.child, stored.list_index)
        };
        let label = compose_label(dialog, child);

        match parent {
            LinkParent::Root => {
                let item = self.alloc_item(None, link, child, label);
                self.roots.insert(position, item);
            }
            LinkParent::Node(parent_node) => {
                let hosts: Vec<ViewItemId> = self
                    .items_for_node(parent_node)
                    .iter()
                    .copied()
                    .filter(|host| self.item(*host).is_ok_and(ViewItem::is_expanded))
                    .collect();
                for host in hosts {
                    let item = self.alloc_item(Some(host), link, child, label.clone());
                    self.item_mut(host)?.children.insert(position, item);
                }
            }
        }
        Ok(())
    }

    /// Mirror a link removal that just happened in the graph.
    ///
    /// Every item displaying the link disappears, its materialized subtree
    /// with it. Items still reachable from other occurrences stay. The
    /// freed graph handles behind a discarded orphan need no further sync;
    /// their items left when the detaching link was removed.
    pub fn sync_link_removed(&mut self, link: LinkId) {
        let holders: Vec<ViewItemId> = self.items_for_link(link).to_vec();
        for item_id in holders {
            match self.item(item_id).map(|item| item.parent) {
                Ok(None) => self.roots.retain(|id| *id != item_id),
                Ok(Some(parent_id)) => {
                    if let Ok(parent) = self.item_mut(parent_id) {
                        parent.children.retain(|id| *id != item_id);
                    }
                }
                Err(_) => continue,
            }
            self.free_subtree(item_id);
        }
    }

    /// Mirror a link move that just happened in the graph.
    ///
    /// Every item displaying the link is repositioned within its parent's
    /// children to match the link's new list index.
    ///
    /// # Errors
    /// Returns an error if the link handle is stale.
    pub fn sync_link_moved(&mut self, link: LinkId, dialog: &Dialog) -> Result<()> {
        let to = dialog.link(link)?.list_index;
        let holders: Vec<ViewItemId> = self.items_for_link(link).to_vec();
        for item_id in holders {
            match self.item(item_id)?.parent {
                None => reposition(&mut self.roots, item_id, to),
                Some(parent_id) => {
                    reposition(&mut self.item_mut(parent_id)?.children, item_id, to);
                }
            }
        }
        Ok(())
    }

    /// Recompute the label of every item displaying a node.
    ///
    /// Call after editing the node's fields through any one occurrence; the
    /// rest catch up here.
    pub fn refresh_node(&mut self, node: NodeId, dialog: &Dialog) {
        let label = compose_label(dialog, node);
        let holders: Vec<ViewItemId> = self.items_for_node(node).to_vec();
        for item_id in holders {
            if let Ok(item) = self.item_mut(item_id) {
                item.label = label.clone();
            }
        }
    }

    /// Find the first way this tree disagrees with the graph or with its
    /// own registries, if any.
    ///
    /// Checks that roots mirror the starter list, every displayed item
    /// matches a live link, expanded items mirror their node's link list,
    /// and the registries hold exactly the displayed items.
    #[must_use]
    pub fn first_inconsistency(&self, dialog: &Dialog) -> Option<String> {
        if self.roots.len() != dialog.starters().len() {
            return Some(format!(
                "{} root items for {} starters",
                self.roots.len(),
                dialog.starters().len()
            ));
        }

        let mut walked: Vec<ViewItemId> = Vec::new();
        let mut stack: Vec<ViewItemId> = self.roots.iter().rev().copied().collect();
        for (position, root_id) in self.roots.iter().enumerate() {
            match self.item(*root_id) {
                Ok(root) if root.link != dialog.starters()[position] => {
                    return Some(format!("root item {root_id} shows the wrong starter"));
                }
                Ok(_) => {}
                Err(err) => return Some(err.to_string()),
            }
        }

        while let Some(id) = stack.pop() {
            let item = match self.item(id) {
                Ok(item) => item,
                Err(err) => return Some(err.to_string()),
            };
            walked.push(id);

            let link = match dialog.link(item.link) {
                Ok(link) => link,
                Err(err) => return Some(format!("item {id}: {err}")),
            };
            if link.child != item.node {
                return Some(format!("item {id} shows {} for {}", item.node, link.child));
            }
            if !self.items_for_link(item.link).contains(&id) {
                return Some(format!("item {id} missing from the link registry"));
            }
            if !self.items_for_node(item.node).contains(&id) {
                return Some(format!("item {id} missing from the node registry"));
            }

            if item.expanded {
                let links = match dialog.children_of(item.node) {
                    Ok(links) => links,
                    Err(err) => return Some(format!("item {id}: {err}")),
                };
                if item.children.len() != links.len() {
                    return Some(format!(
                        "item {id} shows {} children for {} links",
                        item.children.len(),
                        links.len()
                    ));
                }
                for (position, child_id) in item.children.iter().enumerate() {
                    match self.item(*child_id) {
                        Ok(child) if child.link != links[position] => {
                            return Some(format!(
                                "item {child_id} out of order under {id}"
                            ));
                        }
                        Ok(child) if child.parent != Some(id) => {
                            return Some(format!("item {child_id} has the wrong parent"));
                        }
                        Ok(_) => stack.push(*child_id),
                        Err(err) => return Some(err.to_string()),
                    }
                }
            } else if !item.children.is_empty() {
                return Some(format!("collapsed item {id} still holds children"));
            }
        }

        let live = self.items.iter().flatten().count();
        if walked.len() != live {
            return Some(format!(
                "{live} live items but only {} reachable from the roots",
                walked.len()
            ));
        }
        let registered: usize = self.by_link.values().map(Vec::len).sum();
        if registered != walked.len() {
            return Some(format!(
                "{registered} registry entries for {} displayed items",
                walked.len()
            ));
        }
        None
    }

    fn item_mut(&mut self, id: ViewItemId) -> Result<&mut ViewItem> {
        match self.items.get_mut(id.0 as usize) {
            Some(Some(item)) => Ok(item),
            _ => Err(Error::ViewItemNotFound { index: id.0 }),
        }
    }

    fn alloc_item(
        &mut self,
        parent: Option<ViewItemId>,
        link: LinkId,
        node: NodeId,
        label: String,
    ) -> ViewItemId {
        let id = ViewItemId(self.items.len() as u32);
        self.items.push(Some(ViewItem {
            link,
            node,
            parent,
            children: Vec::new(),
            expanded: false,
            label,
        }));
        self.by_node.entry(node).or_default().push(id);
        self.by_link.entry(link).or_default().push(id);
        id
    }

    /// Free an item and every descendant, unregistering each.
    fn free_subtree(&mut self, root: ViewItemId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.items.get_mut(id.0 as usize) else {
                continue;
            };
            let Some(item) = slot.take() else {
                continue;
            };
            stack.extend(item.children.iter().copied());
            unregister(&mut self.by_node, item.node, id);
            unregister(&mut self.by_link, item.link, id);
        }
    }
}

fn unregister<K: Eq + Hash>(map: &mut HashMap<K, Vec<ViewItemId>>, key: K, id: ViewItemId) {
    if let Some(list) = map.get_mut(&key) {
        list.retain(|existing| *existing != id);
        if list.is_empty() {
            map.remove(&key);
        }
    }
}

fn reposition(list: &mut Vec<ViewItemId>, id: ViewItemId, to: usize) {
    if let Some(from) = list.iter().position(|existing| *existing == id)
        && from != to
        && to < list.len()
    {
        list.remove(from);
        list.insert(to, id);
    }
}

/// Label an item after the node it displays, like `E0 [vima]: Not yet.`
fn compose_label(dialog: &Dialog, id: NodeId) -> String {
    let Ok(node) = dialog.node(id) else {
        return format!("{id} (freed)");
    };
    let tag = match node.kind {
        NodeKind::Entry => format!("E{}", id.index()),
        NodeKind::Reply => format!("R{}", id.index()),
    };
    let text = node.text.first().unwrap_or("(no text)");
    let preview: String = text.chars().take(LABEL_PREVIEW_LEN).collect();
    let ellipsis = if text.chars().count() > LABEL_PREVIEW_LEN {
        "..."
    } else {
        ""
    };
    if node.speaker.is_empty() {
        format!("{tag}: {preview}{ellipsis}")
    } else {
        format!("{tag} [{}]: {preview}{ellipsis}", node.speaker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocalizedText;

    /// Two starters sharing one reply: E0 and E1 both link R2.
    fn shared_reply() -> (Dialog, NodeId, NodeId, NodeId) {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        let e1 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        dlg.add_starter(e1, 1).unwrap();
        let (r0, _) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.paste_alias(r0, LinkParent::Node(e1), 0).unwrap();
        (dlg, e0, e1, r0)
    }

    #[test]
    fn test_new_mirrors_starters() {
        let (dlg, e0, _, _) = shared_reply();
        let tree = ViewTree::new(&dlg).unwrap();

        assert_eq!(tree.roots().len(), 2);
        let first = tree.item(tree.roots()[0]).unwrap();
        assert_eq!(first.node(), e0);
        assert!(!first.is_expanded());
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_aliased_node_appears_per_occurrence() {
        let (dlg, _, _, r0) = shared_reply();
        let mut tree = ViewTree::new(&dlg).unwrap();

        tree.expand(tree.roots()[0], &dlg).unwrap();
        tree.expand(tree.roots()[1], &dlg).unwrap();

        assert_eq!(tree.items_for_node(r0).len(), 2);
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_collapse_unregisters_subtree() {
        let (mut dlg, _, _, r0) = shared_reply();
        let (e2, _) = dlg.add_entry_under(r0, 0).unwrap();
        let mut tree = ViewTree::new(&dlg).unwrap();

        let root = tree.roots()[0];
        tree.expand(root, &dlg).unwrap();
        let reply_item = tree.item(root).unwrap().children()[0];
        tree.expand(reply_item, &dlg).unwrap();
        assert_eq!(tree.items_for_node(e2).len(), 1);

        tree.collapse(root).unwrap();
        assert!(tree.items_for_node(r0).is_empty());
        assert!(tree.items_for_node(e2).is_empty());
        assert!(!tree.item(root).unwrap().is_expanded());
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_sync_insert_reaches_every_expanded_occurrence() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        dlg.add_starter(e0, 1).unwrap();
        let mut tree = ViewTree::new(&dlg).unwrap();

        tree.expand(tree.roots()[0], &dlg).unwrap();
        // Second occurrence left collapsed on purpose.

        let (r0, link) = dlg.add_reply_under(e0, 0).unwrap();
        tree.sync_link_inserted(link, &dlg).unwrap();

        assert_eq!(tree.items_for_node(r0).len(), 1);
        assert_eq!(tree.items_for_link(link).len(), 1);
        assert_eq!(tree.first_inconsistency(&dlg), None);

        // The collapsed occurrence picks the link up on expand.
        tree.expand(tree.roots()[1], &dlg).unwrap();
        assert_eq!(tree.items_for_node(r0).len(), 2);
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_sync_remove_drops_each_occurrence() {
        let (mut dlg, e0, _, r0) = shared_reply();
        let mut tree = ViewTree::new(&dlg).unwrap();
        tree.expand(tree.roots()[0], &dlg).unwrap();
        tree.expand(tree.roots()[1], &dlg).unwrap();
        assert_eq!(tree.items_for_node(r0).len(), 2);

        let link = dlg.children_of(e0).unwrap()[0];
        dlg.remove_link(link).unwrap();
        tree.sync_link_removed(link);

        assert_eq!(tree.items_for_node(r0).len(), 1);
        assert!(tree.items_for_link(link).is_empty());
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_sync_move_repositions_children() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (_, first) = dlg.add_reply_under(e0, 0).unwrap();
        let (_, _second) = dlg.add_reply_under(e0, 1).unwrap();
        let mut tree = ViewTree::new(&dlg).unwrap();
        let root = tree.roots()[0];
        tree.expand(root, &dlg).unwrap();

        dlg.move_link(first, 1).unwrap();
        tree.sync_link_moved(first, &dlg).unwrap();

        let children = tree.item(root).unwrap().children().to_vec();
        assert_eq!(tree.item(children[1]).unwrap().link(), first);
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_refresh_node_reaches_every_occurrence() {
        let (mut dlg, _, _, r0) = shared_reply();
        let mut tree = ViewTree::new(&dlg).unwrap();
        tree.expand(tree.roots()[0], &dlg).unwrap();
        tree.expand(tree.roots()[1], &dlg).unwrap();

        dlg.node_mut(r0).unwrap().text = LocalizedText::from_english("Both of us, then.");
        tree.refresh_node(r0, &dlg);

        for item_id in tree.items_for_node(r0) {
            assert_eq!(tree.item(*item_id).unwrap().label(), "R2: Both of us, then.");
        }
    }

    #[test]
    fn test_cycle_expands_one_level_at_a_time() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r0, _) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.insert_link(LinkParent::Node(r0), e0, 0).unwrap();

        let mut tree = ViewTree::new(&dlg).unwrap();
        let mut current = tree.roots()[0];
        for round in 1..=3 {
            tree.expand(current, &dlg).unwrap();
            let next = tree.item(current).unwrap().children()[0];
            tree.expand(next, &dlg).unwrap();
            current = tree.item(next).unwrap().children()[0];
            assert_eq!(tree.items_for_node(e0).len(), round + 1);
        }
        assert_eq!(tree.first_inconsistency(&dlg), None);
    }

    #[test]
    fn test_label_truncates_long_text() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        dlg.node_mut(e0).unwrap().speaker = "kreia".to_string();
        dlg.node_mut(e0).unwrap().text = LocalizedText::from_english(
            "It is a place of history, of graves, and it is not a place to linger long.",
        );
        let mut tree = ViewTree::new(&dlg).unwrap();
        tree.refresh_node(e0, &dlg);

        let label = tree.item(tree.roots()[0]).unwrap().label();
        assert!(label.starts_with("E0 [kreia]: "));
        assert!(label.ends_with("..."));
    }
}
