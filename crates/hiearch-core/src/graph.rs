//! Graph model: resolved nodes and edges with adjacency.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::edge::Edge;
use crate::node::Node;
use crate::record::{NodeRecord, OneOrMany};
use crate::{Error, Result};

/// All nodes and edges after postprocessing, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: BTreeMap<String, Node>,
    pub edges: BTreeMap<String, Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::missing_reference("node", id))
    }

    pub fn edge(&self, id: &str) -> Result<&Edge> {
        self.edges
            .get(id)
            .ok_or_else(|| Error::missing_reference("edge", id))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Ids of every node carrying `tag`.
    pub fn nodes_tagged(&self, tag: &str) -> BTreeSet<String> {
        self.nodes
            .values()
            .filter(|node| node.has_tag(tag))
            .map(|node| node.id.clone())
            .collect()
    }

    /// Whether `ancestor` is `id` itself or reachable from it through scopes.
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.scope.iter().map(String::as_str));
            }
        }
        false
    }
}

/// Normalize a scope field into a set; a list with repeats is an error.
pub fn normalize_scope(id: &str, scope: Option<&OneOrMany>) -> Result<BTreeSet<String>> {
    match scope {
        None => Ok(BTreeSet::new()),
        Some(OneOrMany::One(parent)) => Ok(BTreeSet::from([parent.clone()])),
        Some(OneOrMany::Many(parents)) => {
            let set: BTreeSet<String> = parents.iter().cloned().collect();
            if set.len() != parents.len() {
                return Err(Error::duplicate_scope(id, parents).with_operation("graph::normalize_scope"));
            }
            Ok(set)
        }
    }
}

/// Turns style-flattened node records and resolved edges into a [`Graph`].
pub struct GraphBuilder {
    nodes: BTreeMap<String, NodeRecord>,
    edges: BTreeMap<String, Edge>,
}

impl GraphBuilder {
    pub fn new(nodes: BTreeMap<String, NodeRecord>, edges: BTreeMap<String, Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn build(self) -> Result<Graph> {
        let mut nodes = BTreeMap::new();
        for (id, record) in self.nodes {
            let scope = normalize_scope(&id, record.scope.as_ref())?;
            nodes.insert(id, Node::from_record(record, scope));
        }

        for (edge_id, edge) in &self.edges {
            nodes
                .get_mut(&edge.tail)
                .ok_or_else(|| Error::missing_reference("node", edge.tail.clone()))?
                .outgoing
                .insert(edge_id.clone());
            nodes
                .get_mut(&edge.head)
                .ok_or_else(|| Error::missing_reference("node", edge.head.clone()))?
                .incoming
                .insert(edge_id.clone());
        }

        debug!(
            nodes = nodes.len(),
            edges = self.edges.len(),
            "graph model built"
        );
        Ok(Graph {
            nodes,
            edges: self.edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeRecord, ErrorKind};

    fn build(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Result<Graph> {
        let nodes = nodes
            .into_iter()
            .map(|n| (n.key().to_string(), n))
            .collect();
        let edges = edges
            .into_iter()
            .map(|e| Edge::from_record(e).map(|e| (e.id.clone(), e)))
            .collect::<Result<_>>()?;
        GraphBuilder::new(nodes, edges).build()
    }

    #[test]
    fn adjacency_is_computed_per_direction() {
        let graph = build(
            vec![NodeRecord::new("a", "A"), NodeRecord::new("b", "B")],
            vec![EdgeRecord::new("a", "b"), EdgeRecord::new("b", "a").with_id("back")],
        )
        .unwrap();

        let a = graph.node("a").unwrap();
        assert_eq!(a.outgoing, BTreeSet::from(["a.b".to_string()]));
        assert_eq!(a.incoming, BTreeSet::from(["back".to_string()]));
    }

    #[test]
    fn scope_forms_are_normalized() {
        let graph = build(
            vec![
                NodeRecord::new("root", "Root"),
                NodeRecord::new("other", "Other"),
                NodeRecord::new("one", "One").with_scope(&["root"]),
                NodeRecord::new("two", "Two").with_scope(&["root", "other"]),
            ],
            vec![],
        )
        .unwrap();

        assert!(graph.node("root").unwrap().is_root());
        assert_eq!(graph.node("one").unwrap().scope.len(), 1);
        assert_eq!(graph.node("two").unwrap().scope.len(), 2);
        assert!(graph.is_ancestor_or_self("root", "two"));
        assert!(!graph.is_ancestor_or_self("two", "root"));
    }

    #[test]
    fn repeated_scope_is_rejected() {
        let err = build(
            vec![
                NodeRecord::new("root", "Root"),
                NodeRecord::new("x", "X").with_scope(&["root", "root"]),
            ],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateScope);
    }

    #[test]
    fn untagged_nodes_get_default_tag() {
        let graph = build(
            vec![
                NodeRecord::new("a", "A"),
                NodeRecord::new("b", "B").with_tags(&["infra"]),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(graph.nodes_tagged("default"), BTreeSet::from(["a".to_string()]));
        assert_eq!(graph.nodes_tagged("infra"), BTreeSet::from(["b".to_string()]));
    }
}
