//! Structural editing operations
//!
//! Every mutation here re-establishes the list-index invariant before
//! returning: for any link list, each link's `list_index` equals its
//! position in that list. A failed operation leaves the dialogue unchanged.

use super::{Dialog, Link, LinkId, LinkParent, Node, NodeId, NodeKind};
use crate::error::{Error, Result};
use crate::interchange::Snippet;

impl Dialog {
    /// Create a detached NPC entry node.
    ///
    /// The node starts in the orphan registry; linking it in (or composing
    /// with [`Dialog::add_entry_under`]) removes the entry.
    pub fn add_entry(&mut self) -> NodeId {
        let id = self.alloc_node(Node::new(NodeKind::Entry));
        self.surface_if_detached(id, "(new)".to_string());
        tracing::debug!("added entry {id}");
        id
    }

    /// Create a detached player reply node.
    ///
    /// The node starts in the orphan registry; linking it in (or composing
    /// with [`Dialog::add_reply_under`]) removes the entry.
    pub fn add_reply(&mut self) -> NodeId {
        let id = self.alloc_node(Node::new(NodeKind::Reply));
        self.surface_if_detached(id, "(new)".to_string());
        tracing::debug!("added reply {id}");
        id
    }

    /// Link an entry into the starter list at the given position.
    ///
    /// # Errors
    /// Returns an error if the node is not an entry or the position is out
    /// of range.
    pub fn add_starter(&mut self, entry: NodeId, position: usize) -> Result<LinkId> {
        self.insert_link(LinkParent::Root, entry, position)
    }

    /// Create a new reply and link it under an entry in one step.
    ///
    /// # Errors
    /// Returns an error if the parent is not an entry or the position is
    /// out of range.
    pub fn add_reply_under(&mut self, entry: NodeId, position: usize) -> Result<(NodeId, LinkId)> {
        self.check_attach_point(entry, NodeKind::Reply, position)?;
        let reply = self.add_reply();
        let link = self.insert_link(LinkParent::Node(entry), reply, position)?;
        Ok((reply, link))
    }

    /// Create a new entry and link it under a reply in one step.
    ///
    /// # Errors
    /// Returns an error if the parent is not a reply or the position is
    /// out of range.
    pub fn add_entry_under(&mut self, reply: NodeId, position: usize) -> Result<(NodeId, LinkId)> {
        self.check_attach_point(reply, NodeKind::Entry, position)?;
        let entry = self.add_entry();
        let link = self.insert_link(LinkParent::Node(reply), entry, position)?;
        Ok((entry, link))
    }

    /// Validate a parent/position pair before any node is created, so a
    /// rejected compose-op leaves the dialogue untouched.
    fn check_attach_point(
        &self,
        parent: NodeId,
        child_kind: NodeKind,
        position: usize,
    ) -> Result<()> {
        let parent_node = self.node(parent)?;
        if parent_node.kind.child_kind() != child_kind {
            return Err(Error::LinkKindMismatch {
                parent: parent_node.kind,
                expected: parent_node.kind.child_kind(),
                found: child_kind,
            });
        }
        let len = parent_node.links.len();
        if position > len {
            return Err(Error::PositionOutOfRange { position, len });
        }
        Ok(())
    }

    /// Insert a link from a parent context to an existing node.
    ///
    /// This is also how an alias is made: linking a node that is already
    /// reachable elsewhere makes it show up in both places. Siblings at or
    /// after `position` are renumbered, and any orphan the child subtree
    /// absorbs back is removed from the registry.
    ///
    /// # Errors
    /// Returns an error if either handle is stale, the position is past the
    /// end of the list, or the link would violate the entry/reply
    /// alternation (starters target entries, entries link to replies,
    /// replies link to entries).
    pub fn insert_link(
        &mut self,
        parent: LinkParent,
        child: NodeId,
        position: usize,
    ) -> Result<LinkId> {
        let child_kind = self.node(child)?.kind;
        match parent {
            LinkParent::Root => {
                if child_kind != NodeKind::Entry {
                    return Err(Error::StarterMustTargetEntry { found: child_kind });
                }
            }
            LinkParent::Node(parent_node) => {
                let parent_kind = self.node(parent_node)?.kind;
                if child_kind != parent_kind.child_kind() {
                    return Err(Error::LinkKindMismatch {
                        parent: parent_kind,
                        expected: parent_kind.child_kind(),
                        found: child_kind,
                    });
                }
            }
        }
        let len = self.list_of(parent)?.len();
        if position > len {
            return Err(Error::PositionOutOfRange { position, len });
        }

        let id = self.alloc_link(Link::new(parent, child));
        self.list_of_mut(parent)?.insert(position, id);
        self.renumber(parent, position)?;
        self.normalize_orphans();
        tracing::debug!("inserted link {id}: {parent} -> {child} at {position}");
        Ok(id)
    }

    /// Remove a link, detaching the edge but not the child.
    ///
    /// Remaining siblings are renumbered. If the child lost its last root
    /// path it is surfaced into the orphan registry with its pre-removal
    /// position recorded; a child still reachable through another alias is
    /// untouched. Returns the detached child's handle.
    ///
    /// # Errors
    /// Returns an error if the link handle is stale.
    pub fn remove_link(&mut self, id: LinkId) -> Result<NodeId> {
        let (parent, child, position) = {
            let link = self.link(id)?;
            (link.parent, link.child, link.list_index)
        };
        let former_path = self.display_path(child)?;

        let list = self.list_of_mut(parent)?;
        debug_assert_eq!(list.get(position), Some(&id));
        list.remove(position);
        self.free_link(id);
        self.renumber(parent, position)?;
        self.surface_if_detached(child, former_path);
        tracing::debug!("removed link {id}: {parent} -> {child}");
        Ok(child)
    }

    /// Move a link to a new position within its owning list.
    ///
    /// The span between the old and new position is renumbered.
    ///
    /// # Errors
    /// Returns an error if the link handle is stale or the target position
    /// is past the end of the list.
    pub fn move_link(&mut self, id: LinkId, to: usize) -> Result<()> {
        let (parent, from) = {
            let link = self.link(id)?;
            (link.parent, link.list_index)
        };
        let len = self.list_of(parent)?.len();
        if to >= len {
            return Err(Error::PositionOutOfRange { position: to, len });
        }
        if to == from {
            return Ok(());
        }

        let list = self.list_of_mut(parent)?;
        debug_assert_eq!(list.get(from), Some(&id));
        list.remove(from);
        list.insert(to, id);
        self.renumber(parent, from.min(to))?;
        tracing::debug!("moved link {id} from {from} to {to}");
        Ok(())
    }

    /// Serialize the subtree rooted at a node into its interchange form.
    ///
    /// Links leaving the subtree's node set are not part of a subtree and
    /// never arise; internal aliases and cycles are captured.
    ///
    /// # Errors
    /// Returns an error if the handle is stale.
    pub fn copy_subtree(&self, node: NodeId) -> Result<Snippet> {
        crate::interchange::snippet_from(self, node)
    }

    /// Paste a deep copy of a snippet under a parent context.
    ///
    /// Every node in the snippet gets a fresh handle; field values and edge
    /// topology (aliases and cycles included) are reproduced. Returns the
    /// new subtree root and the link attaching it.
    ///
    /// # Errors
    /// Returns an error if the snippet's root kind does not fit the parent,
    /// or the position is out of range.
    pub fn paste_deep(
        &mut self,
        snippet: &Snippet,
        parent: LinkParent,
        position: usize,
    ) -> Result<(NodeId, LinkId)> {
        crate::interchange::graft(self, snippet, parent, position)
    }

    /// Paste a node as a link-only shallow alias under a parent context.
    ///
    /// No nodes are created; the existing node gains one more place it is
    /// displayed.
    ///
    /// # Errors
    /// Returns an error if either handle is stale, the position is out of
    /// range, or the alternation rule rejects the pairing.
    pub fn paste_alias(
        &mut self,
        node: NodeId,
        parent: LinkParent,
        position: usize,
    ) -> Result<LinkId> {
        self.insert_link(parent, node, position)
    }

    /// Reassign `list_index` for every link at or after `from` in a list.
    fn renumber(&mut self, parent: LinkParent, from: usize) -> Result<()> {
        let tail: Vec<LinkId> = self.list_of(parent)?[from..].to_vec();
        for (offset, link_id) in tail.into_iter().enumerate() {
            self.link_mut(link_id)?.list_index = from + offset;
        }
        Ok(())
    }
}
