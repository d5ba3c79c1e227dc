//! Dialogue node types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::LinkId;
use crate::types::{LocalizedText, ResRef, ScriptCall};

/// Which side of the conversation a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Spoken by an NPC.
    Entry,
    /// A player-selectable response.
    Reply,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Entry => "entry",
            NodeKind::Reply => "reply",
        }
    }

    /// Returns a display-friendly name for UI.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::Entry => "Entry",
            NodeKind::Reply => "Reply",
        }
    }

    /// The kind a child of this node must have.
    #[must_use]
    pub fn child_kind(self) -> NodeKind {
        match self {
            NodeKind::Entry => NodeKind::Reply,
            NodeKind::Reply => NodeKind::Entry,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One animation played while a node's line is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    /// The engine animation identifier.
    pub animation_id: u16,
    /// Tag of the participant the animation plays on.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub participant: String,
}

/// A single line of dialogue.
///
/// Node identity is the handle that owns it: two nodes with equal field
/// values are still distinct lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Entry (NPC) or reply (player).
    pub kind: NodeKind,
    /// Tag of the creature speaking this line (entries only; empty means
    /// the conversation owner).
    pub speaker: String,
    /// Tag of the creature being addressed.
    pub listener: String,
    /// The spoken text.
    pub text: LocalizedText,
    /// Script fired when the line plays.
    pub script1: ScriptCall,
    /// Second script slot fired when the line plays.
    pub script2: ScriptCall,
    /// Sound resource played with the line.
    pub sound: ResRef,
    /// Voice-over resource for the line.
    pub vo_resref: ResRef,
    /// Whether the sound resource should be expected to exist.
    pub sound_exists: bool,
    /// Camera rig used while the line plays.
    pub camera_id: Option<i32>,
    /// Camera animation number.
    pub camera_anim: Option<i32>,
    /// Camera angle selector.
    pub camera_angle: i32,
    /// Camera video effect.
    pub camera_effect: Option<i32>,
    /// Journal quest tag this line updates.
    pub quest: String,
    /// Journal entry index set when the line plays.
    pub quest_entry: Option<u32>,
    /// Plot identifier.
    pub plot_index: i32,
    /// Fraction of the plot XP awarded at this line.
    pub plot_xp_percentage: f32,
    /// Animations played during the line.
    pub animations: Vec<Animation>,
    /// Seconds to wait before the line plays; -1 lets the engine decide.
    pub delay: i32,
    /// Engine wait flags.
    pub wait_flags: i32,
    /// Screen fade applied at the line.
    pub fade_type: i32,
    /// Author-facing comment.
    pub comment: String,
    /// Outgoing links, in list order. Structural edits go through
    /// [`Dialog`](crate::graph::Dialog) so list indices stay correct.
    pub(crate) links: Vec<LinkId>,
}

impl Node {
    /// Create an empty node of the given kind.
    #[must_use]
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            speaker: String::new(),
            listener: String::new(),
            text: LocalizedText::new(),
            script1: ScriptCall::new(),
            script2: ScriptCall::new(),
            sound: ResRef::default(),
            vo_resref: ResRef::default(),
            sound_exists: false,
            camera_id: None,
            camera_anim: None,
            camera_angle: 0,
            camera_effect: None,
            quest: String::new(),
            quest_entry: None,
            plot_index: -1,
            plot_xp_percentage: 0.0,
            animations: Vec::new(),
            delay: -1,
            wait_flags: 0,
            fade_type: 0,
            comment: String::new(),
            links: Vec::new(),
        }
    }

    /// Outgoing links, in list order.
    #[must_use]
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.kind == NodeKind::Entry
    }

    #[must_use]
    pub fn is_reply(&self) -> bool {
        self.kind == NodeKind::Reply
    }

    /// Check if this node has any text
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.is_blank()
    }

    /// Compare every authored field, ignoring the outgoing link handles.
    ///
    /// Used by isomorphism checks, where link topology is compared
    /// separately because handles differ between documents.
    #[must_use]
    pub fn fields_eq(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.speaker == other.speaker
            && self.listener == other.listener
            && self.text == other.text
            && self.script1 == other.script1
            && self.script2 == other.script2
            && self.sound == other.sound
            && self.vo_resref == other.vo_resref
            && self.sound_exists == other.sound_exists
            && self.camera_id == other.camera_id
            && self.camera_anim == other.camera_anim
            && self.camera_angle == other.camera_angle
            && self.camera_effect == other.camera_effect
            && self.quest == other.quest
            && self.quest_entry == other.quest_entry
            && self.plot_index == other.plot_index
            && (self.plot_xp_percentage - other.plot_xp_percentage).abs() < f32::EPSILON
            && self.animations == other.animations
            && self.delay == other.delay
            && self.wait_flags == other.wait_flags
            && self.fade_type == other.fade_type
            && self.comment == other.comment
    }
}
