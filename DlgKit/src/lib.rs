//! # DlgKit
//!
//! A pure-Rust library for building and editing branching conversation files
//! for KotOR-era Odyssey engine games.
//!
//! ## What it does
//!
//! - **Dialogue graph** - NPC entries and player replies in strict alternation,
//!   with aliasing and cycles allowed
//! - **Structural editing** - Insert, remove, move, paste; sibling order stays packed
//! - **Orphan tracking** - Detached subtrees are kept and restorable, never silently lost
//! - **Tree views** - Lazy graph-to-tree projection with one view item per occurrence
//! - **Shadow copies** - Replay edit streams onto mirrors and verify convergence
//! - **Interchange** - Flat JSON document form with isomorphic round-trips
//! - **HTML export** - Styled, cycle-safe conversation dumps
//!
//! ## Quick Start
//!
//! ### Building a conversation
//!
//! ```no_run
//! use dlgkit::graph::Dialog;
//! use dlgkit::types::LocalizedText;
//!
//! let mut dialog = Dialog::new();
//! let greet = dialog.add_entry();
//! dialog.node_mut(greet)?.text = LocalizedText::from_english("Ah. You are awake.");
//! dialog.add_starter(greet, 0)?;
//! let (answer, _) = dialog.add_reply_under(greet, 0)?;
//! dialog.node_mut(answer)?.text = LocalizedText::from_english("Where am I?");
//! # Ok::<(), dlgkit::Error>(())
//! ```
//!
//! ### Saving and loading
//!
//! ```no_run
//! use dlgkit::interchange::{read_dialog, write_dialog};
//!
//! let dialog = read_dialog("ebo_kreia.dlg.json")?;
//! println!("{} entries", dialog.entry_count());
//! write_dialog("ebo_kreia.dlg.json", &dialog)?;
//! # Ok::<(), dlgkit::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! The prelude provides convenient access to commonly used types:
//!
//! ```
//! use dlgkit::prelude::*;
//!
//! // Now you have access to:
//! // - Dialog, Node, Link, NodeId, LinkId
//! // - EditOp, ShadowCopy, ViewTree
//! // - read_dialog, write_dialog
//! // - Error, Result, and more
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `dlgkit` command-line binary

pub mod error;
pub mod types;
pub mod graph;
pub mod ops;
pub mod shadow;
pub mod view;
pub mod interchange;
pub mod export;
pub mod validate;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ConditionCall, LocalizedText, ResRef, ScriptCall};
    pub use crate::graph::{
        Dialog, Link, LinkId, LinkParent, Node, NodeId, NodeKind,
        Orphan, Settings, Stunt, isomorphic,
    };
    pub use crate::ops::{Applied, EditOp, LinkFields};
    pub use crate::shadow::ShadowCopy;
    pub use crate::view::{ViewItem, ViewItemId, ViewTree};

    // Interchange exports
    pub use crate::interchange::{
        DIALOG_EXTENSION, DialogDoc, Snippet,
        parse_dialog, read_dialog, serialize_dialog, write_dialog,
    };

    // Validation exports
    pub use crate::validate::{
        BatchValidateResult, IntegrityResult,
        check_dialog, check_file, find_dialog_files, validate_batch,
    };

    pub use crate::export::generate_html;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
