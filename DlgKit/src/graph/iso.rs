//! Graph equivalence
//!
//! Two dialogues are isomorphic when a parallel walk from their starter
//! lists (and orphan registries) finds the same field values and the same
//! edge topology under a consistent node bijection. Handles themselves are
//! never compared: a round-tripped document gets fresh handles but must
//! still be isomorphic to its source.

use std::collections::{HashMap, VecDeque};

use super::{Dialog, NodeId};

/// Whether two dialogues are isomorphic.
#[must_use]
pub fn isomorphic(a: &Dialog, b: &Dialog) -> bool {
    first_divergence(a, b).is_none()
}

/// The first structural or field divergence between two dialogues, if any.
///
/// Returns a human-readable description naming the first mismatch found,
/// or `None` when the dialogues are isomorphic.
#[must_use]
pub fn first_divergence(a: &Dialog, b: &Dialog) -> Option<String> {
    if a.settings != b.settings {
        return Some("settings differ".to_string());
    }
    if a.stunts != b.stunts {
        return Some("stunt records differ".to_string());
    }
    if a.starters.len() != b.starters.len() {
        return Some(format!(
            "starter counts differ: {} vs {}",
            a.starters.len(),
            b.starters.len()
        ));
    }
    if a.orphans.len() != b.orphans.len() {
        return Some(format!(
            "orphan counts differ: {} vs {}",
            a.orphans.len(),
            b.orphans.len()
        ));
    }

    let mut state = IsoState::default();

    if let Some(divergence) = compare_lists(a, b, "root", &a.starters, &b.starters, &mut state) {
        return Some(divergence);
    }
    if let Some(divergence) = drain(a, b, &mut state) {
        return Some(divergence);
    }

    for (oa, ob) in a.orphans.iter().zip(&b.orphans) {
        if oa.former_path != ob.former_path {
            return Some(format!(
                "orphan paths differ: '{}' vs '{}'",
                oa.former_path, ob.former_path
            ));
        }
        if let Some(divergence) = pair(a, b, &mut state, oa.node, ob.node) {
            return Some(divergence);
        }
    }
    drain(a, b, &mut state)
}

#[derive(Default)]
struct IsoState {
    map_ab: HashMap<NodeId, NodeId>,
    map_ba: HashMap<NodeId, NodeId>,
    queue: VecDeque<(NodeId, NodeId)>,
}

/// Record a node pairing, checking bijection consistency and field values.
fn pair(a: &Dialog, b: &Dialog, state: &mut IsoState, na: NodeId, nb: NodeId) -> Option<String> {
    if let Some(&mapped) = state.map_ab.get(&na) {
        if mapped == nb {
            return None;
        }
        return Some(format!("node {na} maps to both {mapped} and {nb}"));
    }
    if let Some(&mapped) = state.map_ba.get(&nb) {
        return Some(format!("node {nb} maps to both {mapped} and {na}"));
    }

    let node_a = match a.node(na) {
        Ok(node) => node,
        Err(err) => return Some(err.to_string()),
    };
    let node_b = match b.node(nb) {
        Ok(node) => node,
        Err(err) => return Some(err.to_string()),
    };
    if !node_a.fields_eq(node_b) {
        return Some(format!("nodes {na} and {nb} differ in field values"));
    }

    state.map_ab.insert(na, nb);
    state.map_ba.insert(nb, na);
    state.queue.push_back((na, nb));
    None
}

/// Compare two owned link lists position by position and pair the children.
fn compare_lists(
    a: &Dialog,
    b: &Dialog,
    context: &str,
    list_a: &[super::LinkId],
    list_b: &[super::LinkId],
    state: &mut IsoState,
) -> Option<String> {
    if list_a.len() != list_b.len() {
        return Some(format!(
            "link lists under {context} have different lengths: {} vs {}",
            list_a.len(),
            list_b.len()
        ));
    }
    for (position, (la_id, lb_id)) in list_a.iter().zip(list_b).enumerate() {
        let la = match a.link(*la_id) {
            Ok(link) => link,
            Err(err) => return Some(err.to_string()),
        };
        let lb = match b.link(*lb_id) {
            Ok(link) => link,
            Err(err) => return Some(err.to_string()),
        };
        if !la.fields_eq(lb) {
            return Some(format!(
                "links at {context}[{position}] differ in payload"
            ));
        }
        if la.list_index != position || lb.list_index != position {
            return Some(format!(
                "links at {context}[{position}] carry stale list indices"
            ));
        }
        if let Some(divergence) = pair(a, b, state, la.child, lb.child) {
            return Some(divergence);
        }
    }
    None
}

/// Process queued node pairs until the frontier is empty.
fn drain(a: &Dialog, b: &Dialog, state: &mut IsoState) -> Option<String> {
    while let Some((na, nb)) = state.queue.pop_front() {
        let links_a = match a.node(na) {
            Ok(node) => node.links.clone(),
            Err(err) => return Some(err.to_string()),
        };
        let links_b = match b.node(nb) {
            Ok(node) => node.links.clone(),
            Err(err) => return Some(err.to_string()),
        };
        let context = format!("{na}/{nb}");
        if let Some(divergence) = compare_lists(a, b, &context, &links_a, &links_b, state) {
            return Some(divergence);
        }
    }
    None
}
