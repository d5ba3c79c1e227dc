//! Shadow copies
//!
//! A shadow copy is a second, independent document kept in lockstep with the
//! primary by replaying the same edit commands against it. Because handle
//! assignment is deterministic, the replayed commands resolve to the same
//! nodes on both sides, and any divergence between the two documents points
//! at an editing bug rather than at the mirroring itself.

use crate::error::{Error, Result};
use crate::graph::{first_divergence, Dialog};
use crate::ops::{Applied, EditOp};

/// A mirrored document, kept current by command replay.
#[derive(Debug, Clone)]
pub struct ShadowCopy {
    mirror: Dialog,
}

impl ShadowCopy {
    /// Snapshot a document into a new shadow.
    #[must_use]
    pub fn of(dialog: &Dialog) -> Self {
        Self {
            mirror: dialog.clone(),
        }
    }

    /// Replay one edit command against the mirror.
    ///
    /// Call this with every command applied to the primary, in the same
    /// order.
    ///
    /// # Errors
    /// Returns an error if the command fails against the mirror. A command
    /// that succeeded on the primary but fails here means the two documents
    /// had already drifted apart.
    pub fn apply(&mut self, op: &EditOp) -> Result<Applied> {
        self.mirror.apply(op)
    }

    /// Check that the mirror is still isomorphic to the primary.
    ///
    /// # Errors
    /// Returns [`Error::ShadowDrift`] naming the first divergence.
    pub fn verify(&self, primary: &Dialog) -> Result<()> {
        match first_divergence(primary, &self.mirror) {
            None => Ok(()),
            Some(detail) => Err(Error::ShadowDrift { detail }),
        }
    }

    /// Borrow the mirrored document.
    #[must_use]
    pub fn mirror(&self) -> &Dialog {
        &self.mirror
    }

    /// Hand out a copy of the mirror, to replace a primary that drifted.
    #[must_use]
    pub fn restore(&self) -> Dialog {
        self.mirror.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{isomorphic, LinkParent, NodeId};
    use crate::types::LocalizedText;

    #[test]
    fn test_shadow_tracks_replayed_edits() {
        let mut primary = Dialog::new();
        let mut shadow = ShadowCopy::of(&primary);

        let ops = [
            EditOp::AddEntry,
            EditOp::AddStarter {
                entry: NodeId(0),
                position: 0,
            },
            EditOp::AddReplyUnder {
                entry: NodeId(0),
                position: 0,
            },
            EditOp::PasteAlias {
                node: NodeId(1),
                parent: LinkParent::Node(NodeId(0)),
                position: 1,
            },
        ];
        for op in &ops {
            primary.apply(op).unwrap();
            shadow.apply(op).unwrap();
        }

        shadow.verify(&primary).unwrap();
    }

    #[test]
    fn test_unmirrored_edit_is_drift() {
        let mut primary = Dialog::new();
        let entry = primary.add_entry();
        primary.add_starter(entry, 0).unwrap();
        let mut shadow = ShadowCopy::of(&primary);

        primary.node_mut(entry).unwrap().text = LocalizedText::from_english("unmirrored");

        let err = shadow.verify(&primary).unwrap_err();
        assert!(matches!(err, Error::ShadowDrift { .. }));
    }

    #[test]
    fn test_restore_replaces_drifted_primary() {
        let mut primary = Dialog::new();
        let entry = primary.add_entry();
        primary.add_starter(entry, 0).unwrap();
        let shadow = ShadowCopy::of(&primary);

        primary.node_mut(entry).unwrap().comment = "stray".to_string();
        assert!(shadow.verify(&primary).is_err());

        let recovered = shadow.restore();
        assert!(isomorphic(shadow.mirror(), &recovered));
        shadow.verify(&recovered).unwrap();
    }
}
