//! Stable handles into the dialogue arenas
//!
//! Handles index arena slots that are tombstoned rather than reused, so a
//! handle stays valid for the lifetime of its document and a stale one fails
//! lookup instead of silently naming a newer node.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node in a [`Dialog`](crate::graph::Dialog) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The raw arena index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Handle to a link in a [`Dialog`](crate::graph::Dialog) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub(crate) u32);

impl LinkId {
    /// The raw arena index.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}
