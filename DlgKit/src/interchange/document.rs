//! Interchange document types
//!
//! The on-disk form of a dialogue: flat entry and reply tables with edges
//! expressed as indices into them. Which table a link index points into
//! follows from the alternation rule, so the format cannot even express a
//! kind-mismatched edge: starter and reply links index the entry table,
//! entry links index the reply table.

use serde::{Deserialize, Serialize};

use crate::graph::{Animation, Link, Node, NodeKind, Settings, Stunt};
use crate::types::{ConditionCall, LocalizedText, ResRef, ScriptCall};

/// A whole dialogue document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogDoc {
    /// NPC lines, in table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<NodeRec>,
    /// Player lines, in table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<NodeRec>,
    /// Root starter links, indexing the entry table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub starters: Vec<LinkRec>,
    /// Cutscene stunt records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stunts: Vec<Stunt>,
    /// Whole-file settings.
    #[serde(default)]
    pub settings: Settings,
    /// Detached nodes kept with the document, pending user action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<OrphanRec>,
}

/// One dialogue line in table form.
///
/// Absent fields deserialize to the same defaults a freshly added node
/// carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub speaker: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub listener: String,
    #[serde(default, skip_serializing_if = "LocalizedText::is_blank")]
    pub text: LocalizedText,
    #[serde(default, skip_serializing_if = "script_unset")]
    pub script1: ScriptCall,
    #[serde(default, skip_serializing_if = "script_unset")]
    pub script2: ScriptCall,
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub sound: ResRef,
    #[serde(default, skip_serializing_if = "ResRef::is_empty")]
    pub vo_resref: ResRef,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sound_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_anim: Option<i32>,
    #[serde(default)]
    pub camera_angle: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_effect: Option<i32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_entry: Option<u32>,
    #[serde(default = "default_neg_one")]
    pub plot_index: i32,
    #[serde(default)]
    pub plot_xp_percentage: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
    #[serde(default = "default_neg_one")]
    pub delay: i32,
    #[serde(default)]
    pub wait_flags: i32,
    #[serde(default)]
    pub fade_type: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Outgoing links, in list order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkRec>,
}

impl NodeRec {
    /// Capture a node's authored fields. Links are resolved separately
    /// because they need the table index maps.
    pub(crate) fn from_node(node: &Node) -> Self {
        Self {
            speaker: node.speaker.clone(),
            listener: node.listener.clone(),
            text: node.text.clone(),
            script1: node.script1.clone(),
            script2: node.script2.clone(),
            sound: node.sound.clone(),
            vo_resref: node.vo_resref.clone(),
            sound_exists: node.sound_exists,
            camera_id: node.camera_id,
            camera_anim: node.camera_anim,
            camera_angle: node.camera_angle,
            camera_effect: node.camera_effect,
            quest: node.quest.clone(),
            quest_entry: node.quest_entry,
            plot_index: node.plot_index,
            plot_xp_percentage: node.plot_xp_percentage,
            animations: node.animations.clone(),
            delay: node.delay,
            wait_flags: node.wait_flags,
            fade_type: node.fade_type,
            comment: node.comment.clone(),
            links: Vec::new(),
        }
    }

    /// Build a graph node of the given kind from this record. The caller
    /// wires the outgoing links.
    pub(crate) fn build_node(&self, kind: NodeKind) -> Node {
        let mut node = Node::new(kind);
        node.speaker = self.speaker.clone();
        node.listener = self.listener.clone();
        node.text = self.text.clone();
        node.script1 = self.script1.clone();
        node.script2 = self.script2.clone();
        node.sound = self.sound.clone();
        node.vo_resref = self.vo_resref.clone();
        node.sound_exists = self.sound_exists;
        node.camera_id = self.camera_id;
        node.camera_anim = self.camera_anim;
        node.camera_angle = self.camera_angle;
        node.camera_effect = self.camera_effect;
        node.quest = self.quest.clone();
        node.quest_entry = self.quest_entry;
        node.plot_index = self.plot_index;
        node.plot_xp_percentage = self.plot_xp_percentage;
        node.animations = self.animations.clone();
        node.delay = self.delay;
        node.wait_flags = self.wait_flags;
        node.fade_type = self.fade_type;
        node.comment = self.comment.clone();
        node
    }
}

impl Default for NodeRec {
    fn default() -> Self {
        Self::from_node(&Node::new(NodeKind::Entry))
    }
}

/// One edge in table form: a target index plus the authored payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkRec {
    /// Index into the target table implied by context.
    pub index: usize,
    #[serde(default, skip_serializing_if = "condition_unset")]
    pub active1: ConditionCall,
    #[serde(default, skip_serializing_if = "condition_unset")]
    pub active2: ConditionCall,
    #[serde(default, skip_serializing_if = "is_false")]
    pub logic: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl LinkRec {
    /// Capture a link's payload with the resolved table index.
    pub(crate) fn from_link(link: &Link, index: usize) -> Self {
        Self {
            index,
            active1: link.active1.clone(),
            active2: link.active2.clone(),
            logic: link.logic,
            comment: link.comment.clone(),
        }
    }
}

/// An orphan registry entry in table form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrphanRec {
    /// Which table the detached node lives in.
    pub kind: NodeKind,
    /// Index into that table.
    pub index: usize,
    /// Where the node hung before it was detached.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub former_path: String,
}

/// A self-contained subtree in table form, for copy and paste.
///
/// Tables hold exactly the nodes reachable from the root; `root` indexes
/// the table matching `kind`. Aliases and cycles inside the subtree show up
/// as repeated indices and survive a paste.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snippet {
    /// Kind of the subtree root.
    pub kind: NodeKind,
    /// Index of the root in the table matching `kind`.
    pub root: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<NodeRec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<NodeRec>,
}

fn default_neg_one() -> i32 {
    -1
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

fn script_unset(call: &ScriptCall) -> bool {
    *call == ScriptCall::default()
}

fn condition_unset(call: &ConditionCall) -> bool {
    *call == ConditionCall::default()
}
