//! Error types for `DlgKit`

use thiserror::Error;

use crate::graph::{LinkId, NodeId, NodeKind};

/// The error type for `DlgKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Graph Errors ====================
    /// The node handle does not name a node in this dialogue.
    #[error("node {id} not found in dialogue")]
    NodeNotFound {
        /// The unknown node handle.
        id: NodeId,
    },

    /// The node handle names a node that has already been freed.
    #[error("node {id} was freed and can no longer be used")]
    NodeFreed {
        /// The stale node handle.
        id: NodeId,
    },

    /// The link handle does not name a link in this dialogue.
    #[error("link {id} not found in dialogue")]
    LinkNotFound {
        /// The unknown link handle.
        id: LinkId,
    },

    /// The link handle names a link that has already been freed.
    #[error("link {id} was freed and can no longer be used")]
    LinkFreed {
        /// The stale link handle.
        id: LinkId,
    },

    /// A list position was past the end of the target link list.
    #[error("position {position} out of range for list of {len}")]
    PositionOutOfRange {
        /// The requested position.
        position: usize,
        /// The length of the list.
        len: usize,
    },

    /// A starter link targeted a reply node.
    #[error("starter links must target entry nodes, found {found}")]
    StarterMustTargetEntry {
        /// The kind of the rejected child.
        found: NodeKind,
    },

    /// A link connected two nodes of kinds the conversation format cannot express.
    #[error("{parent} nodes must link to {expected} nodes, found {found}")]
    LinkKindMismatch {
        /// The kind of the parent node.
        parent: NodeKind,
        /// The kind the child was required to be.
        expected: NodeKind,
        /// The kind the child actually was.
        found: NodeKind,
    },

    // ==================== Orphan Errors ====================
    /// The node is not in the orphan registry.
    #[error("node {id} is not an orphan")]
    NotAnOrphan {
        /// The node handle.
        id: NodeId,
    },

    // ==================== Resource Name Errors ====================
    /// A resource name was longer than the 16 bytes the game allows.
    #[error("resref '{value}' is longer than {max} bytes", max = crate::types::MAX_RESREF_LEN)]
    ResRefTooLong {
        /// The rejected resource name.
        value: String,
    },

    /// A resource name contained non-ASCII characters.
    #[error("resref '{value}' contains non-ASCII characters")]
    ResRefNotAscii {
        /// The rejected resource name.
        value: String,
    },

    // ==================== Interchange Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A link record pointed past the end of its target table.
    #[error("link index {index} out of range for {table} table of {len}")]
    InvalidLinkIndex {
        /// The table the record pointed into ("entry" or "reply").
        table: &'static str,
        /// The out-of-range index.
        index: usize,
        /// The length of the table.
        len: usize,
    },

    /// A pasted subtree's root node kind did not fit the target parent.
    #[error("snippet roots a {found} node, but the target parent requires {expected}")]
    SnippetKindMismatch {
        /// The kind the paste target required.
        expected: NodeKind,
        /// The kind the snippet root actually was.
        found: NodeKind,
    },

    // ==================== View Errors ====================
    /// The view item handle does not name an item in this view tree.
    #[error("view item {index} not found")]
    ViewItemNotFound {
        /// The raw index of the unknown item.
        index: u32,
    },

    // ==================== Shadow Copy Errors ====================
    /// The shadow mirror no longer matches the live dialogue.
    #[error("shadow copy drifted from the live dialogue: {detail}")]
    ShadowDrift {
        /// Description of the first divergence found.
        detail: String,
    },

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `DlgKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
