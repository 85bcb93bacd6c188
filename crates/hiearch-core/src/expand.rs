//! Expansion: one derived view per (node, policy) of an expanding view.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::graph::Graph;
use crate::view::{Neighbours, View};
use crate::{Error, Result};

/// Id of the view derived from `view` for `node` under `policy`.
pub fn derived_id(view: &str, node: &str, policy: Neighbours) -> String {
    format!("{view}_{node}_{policy}")
}

/// Generate and resolve the derived views of `view`, marking it as their
/// origin. Traversal in the derived views is bounded by the node set `view`
/// resolved to.
pub fn expand_view(view: &mut View, graph: &Graph) -> Result<Vec<View>> {
    let policies = std::mem::take(&mut view.expand);
    if policies.is_empty() {
        return Ok(Vec::new());
    }
    view.expanded_from = Some(view.id.clone());

    let mut template = view.clone();
    template.nodes_subset = Some(view.nodes.clone());

    let mut derived = Vec::with_capacity(policies.len() * view.nodes.len());
    for policy in policies {
        for node in &view.nodes {
            let mut child = template.clone();
            child.id = derived_id(&view.id, node, policy);
            child.neighbours = policy;
            child.requested = BTreeSet::from([node.clone()]);
            child.nodes = child.requested.clone();
            child.edges.clear();
            child.custom_edges.clear();
            child.resolve(graph)?;
            debug!(view = %child.id, from = %view.id, "derived view");
            derived.push(child);
        }
    }
    Ok(derived)
}

/// Expand every view of `views` in place, adding the derived views.
pub fn expand_views(views: &mut BTreeMap<String, View>, graph: &Graph) -> Result<()> {
    let mut additional: BTreeMap<String, View> = BTreeMap::new();
    for view in views.values_mut() {
        for child in expand_view(view, graph)? {
            if additional.contains_key(&child.id) {
                return Err(Error::duplicate_id("view", child.id).with_operation("expand::expand_views"));
            }
            additional.insert(child.id.clone(), child);
        }
    }

    for (id, view) in additional {
        if views.contains_key(&id) {
            return Err(Error::duplicate_id("view", id).with_operation("expand::expand_views"));
        }
        views.insert(id, view);
    }
    Ok(())
}
