//! The top-level dialogue container

use serde::{Deserialize, Serialize};

use super::orphan::Orphan;
use super::{Link, LinkId, LinkParent, Node, NodeId, NodeKind};
use crate::error::{Error, Result};
use crate::types::ResRef;

/// How a computer conversation's terminal is voiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputerType {
    #[default]
    Modern,
    Ancient,
}

impl ComputerType {
    /// The numeric identifier used on disk.
    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            ComputerType::Modern => 0,
            ComputerType::Ancient => 1,
        }
    }

    /// Look up a computer type by its numeric identifier.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(ComputerType::Modern),
            1 => Some(ComputerType::Ancient),
            _ => None,
        }
    }
}

/// Whether the conversation plays as face-to-face dialogue or a computer
/// terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    #[default]
    Human,
    Computer,
}

impl ConversationType {
    /// The numeric identifier used on disk.
    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            ConversationType::Human => 0,
            ConversationType::Computer => 1,
        }
    }

    /// Look up a conversation type by its numeric identifier.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(ConversationType::Human),
            1 => Some(ConversationType::Computer),
            _ => None,
        }
    }
}

/// A cutscene participant/camera-model pairing used by scripted camera
/// sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stunt {
    /// Tag of the participating creature.
    pub participant: String,
    /// The camera model resource used for the stunt.
    pub stunt_model: ResRef,
}

/// Whole-file conversation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Script fired when the conversation ends normally.
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub on_end: ResRef,
    /// Script fired when the conversation is aborted.
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub on_abort: ResRef,
    /// Ambient music track played during the conversation.
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub ambient_track: ResRef,
    /// Camera model used for animated cameras.
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub camera_model: ResRef,
    /// Voice-over directory identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vo_id: String,
    /// Computer-voice flavor for terminal conversations.
    #[serde(default)]
    pub computer_type: ComputerType,
    /// Face-to-face dialogue or computer terminal session.
    #[serde(default)]
    pub conversation_type: ConversationType,
    /// Whether the player may skip lines.
    #[serde(default)]
    pub skippable: bool,
    /// Animated cutscene flag.
    #[serde(default)]
    pub animated_cut: i32,
    /// Legacy hit-check flag carried for older modules.
    #[serde(default)]
    pub old_hit_check: bool,
    /// Unequip the speaker's hand items during the conversation.
    #[serde(default)]
    pub unequip_hands: bool,
    /// Unequip all of the speaker's items during the conversation.
    #[serde(default)]
    pub unequip_items: bool,
    /// Milliseconds to wait before showing each entry.
    #[serde(default)]
    pub delay_entry: i32,
    /// Milliseconds to wait before showing each reply.
    #[serde(default)]
    pub delay_reply: i32,
}

/// An in-memory dialogue graph.
///
/// Nodes and links live in arenas addressed by stable handles. A node may be
/// the target of any number of links (the same line reachable from several
/// places, including cycles); each link is owned by exactly one parent
/// context. Slots are tombstoned when freed and never reused, so a stale
/// handle fails lookup instead of silently naming a newer node.
#[derive(Debug, Clone, Default)]
pub struct Dialog {
    /// Node arena; `None` marks a freed slot.
    pub(crate) nodes: Vec<Option<Node>>,
    /// Link arena; `None` marks a freed slot.
    pub(crate) links: Vec<Option<Link>>,
    /// Root starter links, in list order.
    pub(crate) starters: Vec<LinkId>,
    /// Nodes detached from the root set, pending user action.
    pub(crate) orphans: Vec<Orphan>,
    /// Cutscene stunt records.
    pub stunts: Vec<Stunt>,
    /// Whole-file settings.
    pub settings: Settings,
}

impl Dialog {
    /// Create an empty dialogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by handle.
    ///
    /// # Errors
    /// Returns an error if the handle is unknown or the node was freed.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        match self.nodes.get(id.0 as usize) {
            Some(Some(node)) => Ok(node),
            Some(None) => Err(Error::NodeFreed { id }),
            None => Err(Error::NodeNotFound { id }),
        }
    }

    /// Get a node by handle, mutably.
    ///
    /// Field edits go through this; structural edits (the outgoing link
    /// list) go through the dialog so list indices stay correct.
    ///
    /// # Errors
    /// Returns an error if the handle is unknown or the node was freed.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        match self.nodes.get_mut(id.0 as usize) {
            Some(Some(node)) => Ok(node),
            Some(None) => Err(Error::NodeFreed { id }),
            None => Err(Error::NodeNotFound { id }),
        }
    }

    /// Get a link by handle.
    ///
    /// # Errors
    /// Returns an error if the handle is unknown or the link was freed.
    pub fn link(&self, id: LinkId) -> Result<&Link> {
        match self.links.get(id.0 as usize) {
            Some(Some(link)) => Ok(link),
            Some(None) => Err(Error::LinkFreed { id }),
            None => Err(Error::LinkNotFound { id }),
        }
    }

    /// Get a link by handle, mutably.
    ///
    /// Payload edits (conditions, logic, comment) go through this; the
    /// endpoints and position are managed by the dialog.
    ///
    /// # Errors
    /// Returns an error if the handle is unknown or the link was freed.
    pub fn link_mut(&mut self, id: LinkId) -> Result<&mut Link> {
        match self.links.get_mut(id.0 as usize) {
            Some(Some(link)) => Ok(link),
            Some(None) => Err(Error::LinkFreed { id }),
            None => Err(Error::LinkNotFound { id }),
        }
    }

    /// The root starter links, in list order.
    #[must_use]
    pub fn starters(&self) -> &[LinkId] {
        &self.starters
    }

    /// The outgoing links of a node, in list order.
    ///
    /// # Errors
    /// Returns an error if the handle is unknown or the node was freed.
    pub fn children_of(&self, id: NodeId) -> Result<&[LinkId]> {
        Ok(&self.node(id)?.links)
    }

    /// The link list owned by a parent context.
    ///
    /// # Errors
    /// Returns an error if the parent node handle is stale.
    pub fn list_of(&self, parent: LinkParent) -> Result<&[LinkId]> {
        match parent {
            LinkParent::Root => Ok(&self.starters),
            LinkParent::Node(id) => self.children_of(id),
        }
    }

    pub(crate) fn list_of_mut(&mut self, parent: LinkParent) -> Result<&mut Vec<LinkId>> {
        match parent {
            LinkParent::Root => Ok(&mut self.starters),
            LinkParent::Node(id) => Ok(&mut self.node_mut(id)?.links),
        }
    }

    /// Iterate the handles of all live nodes, in handle order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| NodeId(index as u32))
    }

    /// Iterate the handles of all live links, in handle order.
    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| LinkId(index as u32))
    }

    /// Count live nodes, orphans included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Count live entry nodes.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.kind == NodeKind::Entry)
            .count()
    }

    /// Count live reply nodes.
    #[must_use]
    pub fn reply_count(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.kind == NodeKind::Reply)
            .count()
    }

    /// Count live links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.iter().flatten().count()
    }

    /// Count words across the text of every live node.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .map(|node| node.text.word_count())
            .sum()
    }

    // Arena plumbing. Slots are never reused; freed handles stay detectable.

    pub(crate) fn alloc_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    pub(crate) fn alloc_link(&mut self, link: Link) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        self.links.push(Some(link));
        id
    }

    pub(crate) fn free_node(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    pub(crate) fn free_link(&mut self, id: LinkId) {
        if let Some(slot) = self.links.get_mut(id.0 as usize) {
            *slot = None;
        }
    }
}
