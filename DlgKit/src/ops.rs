//! Edit commands
//!
//! A structural mutation expressed as data, so the same edit can be applied
//! to a document and replayed against its shadow copy. Handle assignment is
//! deterministic (arena order), so replaying one command stream over two
//! identical documents hands out identical handles on both.

use crate::error::Result;
use crate::graph::{Dialog, LinkId, LinkParent, Node, NodeId, Settings, Stunt};
use crate::interchange::Snippet;
use crate::types::ConditionCall;

/// The editable payload of a link.
///
/// Endpoints and list position are structural and move through
/// [`Dialog::insert_link`] and friends, never through a field set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkFields {
    /// Primary availability condition.
    pub active1: ConditionCall,
    /// Secondary availability condition.
    pub active2: ConditionCall,
    /// `false` requires both conditions, `true` accepts either.
    pub logic: bool,
    /// Designer comment.
    pub comment: String,
}

/// One editing command against a dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Create a detached NPC entry node.
    AddEntry,
    /// Create a detached player reply node.
    AddReply,
    /// Link an entry into the starter list.
    AddStarter { entry: NodeId, position: usize },
    /// Create a reply and link it under an entry in one step.
    AddReplyUnder { entry: NodeId, position: usize },
    /// Create an entry and link it under a reply in one step.
    AddEntryUnder { reply: NodeId, position: usize },
    /// Link an existing node under a parent context.
    InsertLink {
        parent: LinkParent,
        child: NodeId,
        position: usize,
    },
    /// Remove a link, detaching (not destroying) the child.
    RemoveLink { link: LinkId },
    /// Move a link within its owning list.
    MoveLink { link: LinkId, to: usize },
    /// Paste a deep copy of a snippet under a parent context.
    PasteDeep {
        snippet: Snippet,
        parent: LinkParent,
        position: usize,
    },
    /// Paste a shallow alias: one more link to an existing node.
    PasteAlias {
        node: NodeId,
        parent: LinkParent,
        position: usize,
    },
    /// Reattach an orphan under a parent context.
    RestoreOrphan {
        node: NodeId,
        parent: LinkParent,
        position: usize,
    },
    /// Destroy an orphan root and its exclusively owned subtree.
    DiscardOrphan { node: NodeId },
    /// Clear the whole document.
    Reset,
    /// Overwrite a node's authored fields.
    ///
    /// The node's kind and outgoing links are structural and keep their
    /// current values.
    SetNodeFields { node: NodeId, fields: Box<Node> },
    /// Overwrite a link's editable payload.
    SetLinkFields {
        link: LinkId,
        fields: Box<LinkFields>,
    },
    /// Replace the whole-file settings.
    SetSettings { settings: Box<Settings> },
    /// Replace the stunt records.
    SetStunts { stunts: Vec<Stunt> },
}

/// What an applied command produced, for callers that need the new handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A node handle: the created node, or the child a removal detached.
    Node(NodeId),
    /// A created link handle.
    Link(LinkId),
    /// A created node and the link that attached it.
    NodeAndLink(NodeId, LinkId),
    /// Nothing to hand back.
    None,
}

impl Dialog {
    /// Apply one edit command.
    ///
    /// # Errors
    /// Returns whatever error the underlying operation reports; a failed
    /// command leaves the document unchanged.
    pub fn apply(&mut self, op: &EditOp) -> Result<Applied> {
        let applied = match op {
            EditOp::AddEntry => Applied::Node(self.add_entry()),
            EditOp::AddReply => Applied::Node(self.add_reply()),
            EditOp::AddStarter { entry, position } => {
                Applied::Link(self.add_starter(*entry, *position)?)
            }
            EditOp::AddReplyUnder { entry, position } => {
                let (node, link) = self.add_reply_under(*entry, *position)?;
                Applied::NodeAndLink(node, link)
            }
            EditOp::AddEntryUnder { reply, position } => {
                let (node, link) = self.add_entry_under(*reply, *position)?;
                Applied::NodeAndLink(node, link)
            }
            EditOp::InsertLink {
                parent,
                child,
                position,
            } => Applied::Link(self.insert_link(*parent, *child, *position)?),
            EditOp::RemoveLink { link } => Applied::Node(self.remove_link(*link)?),
            EditOp::MoveLink { link, to } => {
                self.move_link(*link, *to)?;
                Applied::None
            }
            EditOp::PasteDeep {
                snippet,
                parent,
                position,
            } => {
                let (node, link) = self.paste_deep(snippet, *parent, *position)?;
                Applied::NodeAndLink(node, link)
            }
            EditOp::PasteAlias {
                node,
                parent,
                position,
            } => Applied::Link(self.paste_alias(*node, *parent, *position)?),
            EditOp::RestoreOrphan {
                node,
                parent,
                position,
            } => Applied::Link(self.restore_orphan(*node, *parent, *position)?),
            EditOp::DiscardOrphan { node } => {
                self.discard_orphan(*node)?;
                Applied::None
            }
            EditOp::Reset => {
                self.reset();
                Applied::None
            }
            EditOp::SetNodeFields { node, fields } => {
                let target = self.node_mut(*node)?;
                let kind = target.kind;
                let links = std::mem::take(&mut target.links);
                *target = (**fields).clone();
                target.kind = kind;
                target.links = links;
                Applied::None
            }
            EditOp::SetLinkFields { link, fields } => {
                let target = self.link_mut(*link)?;
                target.active1 = fields.active1.clone();
                target.active2 = fields.active2.clone();
                target.logic = fields.logic;
                target.comment = fields.comment.clone();
                Applied::None
            }
            EditOp::SetSettings { settings } => {
                self.settings = (**settings).clone();
                Applied::None
            }
            EditOp::SetStunts { stunts } => {
                self.stunts = stunts.clone();
                Applied::None
            }
        };
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{first_divergence, isomorphic, NodeKind};
    use crate::types::LocalizedText;

    #[test]
    fn test_replay_hands_out_identical_handles() {
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
            EditOp::AddEntryUnder {
                reply: NodeId(1),
                position: 0,
            },
        ];

        let mut a = Dialog::new();
        let mut b = Dialog::new();
        for op in &ops {
            let on_a = a.apply(op).unwrap();
            let on_b = b.apply(op).unwrap();
            assert_eq!(on_a, on_b);
        }
        assert!(
            isomorphic(&a, &b),
            "divergence: {:?}",
            first_divergence(&a, &b)
        );
    }

    #[test]
    fn test_set_node_fields_preserves_structure() {
        let mut dlg = Dialog::new();
        let entry = dlg.add_entry();
        dlg.add_starter(entry, 0).unwrap();
        let (reply, _) = dlg.add_reply_under(entry, 0).unwrap();
        let links_before = dlg.node(entry).unwrap().links().to_vec();

        let mut fields = dlg.node(reply).unwrap().clone();
        fields.text = LocalizedText::from_english("I need answers.");
        dlg.apply(&EditOp::SetNodeFields {
            node: entry,
            fields: Box::new(fields),
        })
        .unwrap();

        let node = dlg.node(entry).unwrap();
        assert_eq!(node.kind, NodeKind::Entry);
        assert_eq!(node.links(), links_before.as_slice());
        assert_eq!(node.text.first(), Some("I need answers."));
    }

    #[test]
    fn test_set_link_fields_leaves_endpoints_alone() {
        let mut dlg = Dialog::new();
        let entry = dlg.add_entry();
        dlg.add_starter(entry, 0).unwrap();
        let (_, link) = dlg.add_reply_under(entry, 0).unwrap();

        dlg.apply(&EditOp::SetLinkFields {
            link,
            fields: Box::new(LinkFields {
                logic: true,
                comment: "gated on persuade".to_string(),
                ..LinkFields::default()
            }),
        })
        .unwrap();

        let stored = dlg.link(link).unwrap();
        assert!(stored.logic);
        assert_eq!(stored.comment, "gated on persuade");
        assert_eq!(stored.parent, LinkParent::Node(entry));
        assert_eq!(stored.list_index, 0);
    }

    #[test]
    fn test_failed_op_reports_and_leaves_document() {
        let mut dlg = Dialog::new();
        let entry = dlg.add_entry();
        dlg.add_starter(entry, 0).unwrap();
        let before = dlg.clone();

        let err = dlg.apply(&EditOp::MoveLink {
            link: LinkId(40),
            to: 0,
        });
        assert!(err.is_err());
        assert!(isomorphic(&before, &dlg));
    }
}
