//! Export functionality for dialogues

use std::collections::HashSet;

use crate::error::Result;
use crate::graph::{ConversationType, Dialog, LinkId, NodeId, NodeKind};

/// Generate an HTML export of a dialogue.
///
/// Creates a standalone HTML document with the styled conversation tree,
/// followed by an orphan section when the registry is not empty. A node
/// reached a second time (alias or cycle) renders as a back-reference stub
/// instead of recursing.
///
/// # Errors
/// Returns an error if the graph holds a stale handle.
pub fn generate_html(dialog: &Dialog, title: &str) -> Result<String> {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str("body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 24px; background: #fafaf9; }\n");
    html.push_str(".node { margin: 4px 0; padding: 6px 10px; background: white; border-radius: 4px; border-left: 3px solid #d6d3d1; }\n");
    html.push_str(".node-entry { border-left-color: #3b82f6; }\n");
    html.push_str(".node-reply { border-left-color: #22c55e; }\n");
    html.push_str(".alias { margin: 4px 0; padding: 4px 10px; color: #78716c; font-style: italic; }\n");
    html.push_str(".speaker { color: #0f766e; font-weight: 600; }\n");
    html.push_str(".text { margin-left: 6px; }\n");
    html.push_str(".gate { color: #f97316; }\n");
    html.push_str(".meta { color: #a8a29e; font-size: 12px; margin-top: 3px; }\n");
    html.push_str(".children { margin-left: 22px; border-left: 1px solid #e7e5e4; padding-left: 12px; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>Dialog: {}</h1>\n", html_escape(title)));
    html.push_str(&format!(
        "<p><em>{}</em></p>\n",
        html_escape(&describe_settings(dialog))
    ));
    html.push_str(&format!(
        "<p>Entries: {} | Replies: {} | Words: {}</p>\n",
        dialog.entry_count(),
        dialog.reply_count(),
        dialog.word_count()
    ));

    let mut visited = HashSet::new();
    for link_id in dialog.starters() {
        render_link_html(dialog, *link_id, &mut html, &mut visited)?;
    }

    if !dialog.orphans().is_empty() {
        html.push_str("<h2>Orphans</h2>\n");
        for orphan in dialog.orphans() {
            html.push_str(&format!(
                "<p class=\"meta\">was {}</p>\n",
                html_escape(&orphan.former_path)
            ));
            render_node_html(dialog, orphan.node, None, &mut html, &mut visited)?;
        }
    }

    html.push_str("</body>\n</html>\n");

    Ok(html)
}

fn render_link_html(
    dialog: &Dialog,
    link_id: LinkId,
    html: &mut String,
    visited: &mut HashSet<NodeId>,
) -> Result<()> {
    let link = dialog.link(link_id)?;
    let gate = describe_gate(link);
    render_node_html(dialog, link.child, gate.as_deref(), html, visited)
}

fn render_node_html(
    dialog: &Dialog,
    id: NodeId,
    gate: Option<&str>,
    html: &mut String,
    visited: &mut HashSet<NodeId>,
) -> Result<()> {
    let tag = node_tag(dialog, id);
    if visited.contains(&id) {
        html.push_str(&format!(
            "<div class=\"alias\">&#8617; {tag} (shown above)</div>\n"
        ));
        return Ok(());
    }
    visited.insert(id);

    let node = dialog.node(id)?;
    let class = match node.kind {
        NodeKind::Entry => "node node-entry",
        NodeKind::Reply => "node node-reply",
    };

    html.push_str(&format!("<div class=\"{class}\">\n"));
    html.push_str(&format!("<strong>[{tag}]</strong> "));

    if !node.speaker.is_empty() {
        html.push_str(&format!(
            "<span class=\"speaker\">{}</span>: ",
            html_escape(&node.speaker)
        ));
    }
    if node.has_text() {
        html.push_str(&format!(
            "<span class=\"text\">{}</span>\n",
            html_escape(&node.text.to_string())
        ));
    }

    html.push_str("<div class=\"meta\">");
    if let Some(gate) = gate {
        html.push_str(&format!("<span class=\"gate\">[if {}]</span> ", html_escape(gate)));
    }
    if node.script1.is_set() {
        html.push_str(&format!("script: {} ", node.script1.script));
    }
    if node.script2.is_set() {
        html.push_str(&format!("script: {} ", node.script2.script));
    }
    if !node.quest.is_empty() {
        html.push_str(&format!("quest: {} ", html_escape(&node.quest)));
        if let Some(quest_entry) = node.quest_entry {
            html.push_str(&format!("entry {quest_entry} "));
        }
    }
    html.push_str("</div>\n");

    if !node.links().is_empty() {
        html.push_str("<div class=\"children\">\n");
        for link_id in node.links().to_vec() {
            render_link_html(dialog, link_id, html, visited)?;
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    Ok(())
}

/// Describe a link's conditional scripts, like `not c_is_dark and c_money`.
fn describe_gate(link: &crate::graph::Link) -> Option<String> {
    if !link.is_conditional() {
        return None;
    }
    let mut parts = Vec::new();
    for cond in [&link.active1, &link.active2] {
        if cond.is_set() {
            let negation = if cond.negated { "not " } else { "" };
            parts.push(format!("{negation}{}", cond.call.script));
        }
    }
    let joiner = if link.logic { " or " } else { " and " };
    Some(parts.join(joiner))
}

/// One-line summary of the whole-file settings for the document header.
fn describe_settings(dialog: &Dialog) -> String {
    let settings = &dialog.settings;
    let mut parts = vec![match settings.conversation_type {
        ConversationType::Human => "human conversation".to_string(),
        ConversationType::Computer => "computer conversation".to_string(),
    }];
    if settings.skippable {
        parts.push("skippable".to_string());
    }
    if !settings.vo_id.is_empty() {
        parts.push(format!("VO {}", settings.vo_id));
    }
    if !settings.on_end.is_empty() {
        parts.push(format!("on end {}", settings.on_end));
    }
    parts.join(", ")
}

fn node_tag(dialog: &Dialog, id: NodeId) -> String {
    match dialog.node(id).map(|node| node.kind) {
        Ok(NodeKind::Entry) => format!("E{}", id.index()),
        Ok(NodeKind::Reply) => format!("R{}", id.index()),
        Err(_) => format!("{id}"),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkParent;
    use crate::types::{LocalizedText, ResRef};

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_generate_html_empty_dialog() {
        let dialog = Dialog::new();
        let html = generate_html(&dialog, "empty").unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Entries: 0 | Replies: 0"));
    }

    #[test]
    fn test_settings_summary_in_header() {
        let mut dlg = Dialog::new();
        dlg.settings.skippable = true;
        dlg.settings.vo_id = "ebo_kreia".to_string();
        let html = generate_html(&dlg, "kreia").unwrap();
        assert!(html.contains("<em>human conversation, skippable, VO ebo_kreia</em>"));
    }

    #[test]
    fn test_cycle_renders_back_reference() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (r0, _) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.insert_link(LinkParent::Node(r0), e0, 0).unwrap();

        let html = generate_html(&dlg, "loop").unwrap();
        assert!(html.contains("(shown above)"));
    }

    #[test]
    fn test_orphans_get_their_own_section() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        let (_, link) = dlg.add_reply_under(e0, 0).unwrap();
        dlg.remove_link(link).unwrap();

        let html = generate_html(&dlg, "cutting room").unwrap();
        assert!(html.contains("<h2>Orphans</h2>"));
        assert!(html.contains("was root &gt; E0 &gt; R1"));
    }

    #[test]
    fn test_gate_annotation() {
        let mut dlg = Dialog::new();
        let e0 = dlg.add_entry();
        dlg.add_starter(e0, 0).unwrap();
        dlg.node_mut(e0).unwrap().text = LocalizedText::from_english("We shall see.");
        let (_, link) = dlg.add_reply_under(e0, 0).unwrap();
        {
            let stored = dlg.link_mut(link).unwrap();
            stored.active1.call.script = ResRef::new("c_is_dark").unwrap();
            stored.active1.negated = true;
            stored.active2.call.script = ResRef::new("c_influence").unwrap();
            stored.logic = true;
        }

        let html = generate_html(&dlg, "gated").unwrap();
        assert!(html.contains("[if not c_is_dark or c_influence]"));
    }
}
