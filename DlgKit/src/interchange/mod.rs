//! Dialogue interchange (JSON) format module
//!
//! The on-disk document keeps nodes in flat entry/reply tables and stores
//! edges as table indices, so aliases and cycles serialize naturally and a
//! load-save cycle is isomorphic to the source graph. The same table layout,
//! reduced to a single subtree, backs the copy/paste snippet format.

mod document;
mod reader;
mod writer;

pub use document::{DialogDoc, LinkRec, NodeRec, OrphanRec, Snippet};
pub use reader::{from_doc, parse_dialog, read_dialog};
pub use writer::{serialize_dialog, to_doc, write_dialog};

pub(crate) use reader::graft;
pub(crate) use writer::snippet_from;

/// The document file extension, as in `ebo_kreia.dlg.json`.
pub const DIALOG_EXTENSION: &str = "dlg.json";
