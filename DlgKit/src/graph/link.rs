//! Dialogue link types

use std::fmt;

use super::NodeId;
use crate::types::ConditionCall;

/// The context that owns a link: the document root or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkParent {
    /// The link is a starter in the document's root list.
    Root,
    /// The link hangs off a node's outgoing list.
    Node(NodeId),
}

impl fmt::Display for LinkParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkParent::Root => f.write_str("root"),
            LinkParent::Node(id) => write!(f, "{id}"),
        }
    }
}

/// A directed edge from a parent context to a child node.
///
/// A link is owned by exactly one parent context; a node may be the target
/// of many links. `list_index` always equals the link's position in its
/// owning list, and structural edits renumber the list before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// The owning context.
    pub parent: LinkParent,
    /// The node this link points at.
    pub child: NodeId,
    /// First conditional script slot.
    pub active1: ConditionCall,
    /// Second conditional script slot.
    pub active2: ConditionCall,
    /// Condition combination: false = both must pass, true = either.
    pub logic: bool,
    /// Author-facing comment.
    pub comment: String,
    /// Position among the parent's outgoing links.
    pub list_index: usize,
}

impl Link {
    /// Create a bare link between a parent context and a child.
    ///
    /// The caller is responsible for placing it in the parent's list and
    /// assigning `list_index`.
    #[must_use]
    pub fn new(parent: LinkParent, child: NodeId) -> Self {
        Self {
            parent,
            child,
            active1: ConditionCall::new(),
            active2: ConditionCall::new(),
            logic: false,
            comment: String::new(),
            list_index: 0,
        }
    }

    /// Whether either conditional slot carries a script.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.active1.is_set() || self.active2.is_set()
    }

    /// Compare the authored payload, ignoring endpoints and position.
    ///
    /// Used by isomorphism checks, where topology is compared separately
    /// because handles differ between documents.
    #[must_use]
    pub fn fields_eq(&self, other: &Link) -> bool {
        self.active1 == other.active1
            && self.active2 == other.active2
            && self.logic == other.logic
            && self.comment == other.comment
    }
}
