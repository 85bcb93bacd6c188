//! Neighbour selection: which edges, and which extra nodes, a view shows.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;
use tracing::trace;

use crate::edge::{Direction, Edge};
use crate::graph::Graph;
use crate::node::Node;
use crate::view::Neighbours;
use crate::{Error, Result};

/// Nodes a selection may traverse: the whole graph, or a subset of it for
/// views generated by expansion.
#[derive(Debug, Clone, Copy)]
pub struct Universe<'a> {
    graph: &'a Graph,
    subset: Option<&'a BTreeSet<String>>,
}

impl<'a> Universe<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            subset: None,
        }
    }

    pub fn restricted(graph: &'a Graph, subset: &'a BTreeSet<String>) -> Self {
        Self {
            graph,
            subset: Some(subset),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.graph.contains_node(id) && self.subset.is_none_or(|subset| subset.contains(id))
    }

    pub fn node(&self, id: &str) -> Result<&'a Node> {
        if !self.contains(id) {
            return Err(Error::missing_reference("node", id).with_operation("select::universe"));
        }
        self.graph.node(id)
    }

    pub fn edge(&self, id: &str) -> Result<&'a Edge> {
        self.graph.edge(id)
    }

    /// In-universe parents of `id`, smallest first.
    fn parents(&self, id: &str) -> Result<Vec<&'a String>> {
        Ok(self
            .node(id)?
            .scope
            .iter()
            .filter(|parent| self.contains(parent))
            .collect())
    }
}

/// Outcome of one selection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    /// Nodes added on top of the requested ones.
    pub added: BTreeSet<String>,
    pub edges: BTreeMap<String, Edge>,
    /// Edges whose endpoint was replaced by a scope.
    pub custom_edges: BTreeMap<String, Edge>,
}

/// Run `policy` from `requested` over `universe`.
pub fn select(
    universe: &Universe<'_>,
    requested: &BTreeSet<String>,
    policy: Neighbours,
) -> Result<Selection> {
    let mut selection = Selection::default();
    match policy {
        Neighbours::Explicit => select_explicit(universe, requested, &mut selection)?,
        Neighbours::Direct => select_direct(universe, requested, &mut selection)?,
        Neighbours::Parent => select_parent(universe, requested, &mut selection)?,
        Neighbours::RecursiveIn => {
            select_recursive(universe, requested, Direction::In, &mut selection)?
        }
        Neighbours::RecursiveOut => {
            select_recursive(universe, requested, Direction::Out, &mut selection)?
        }
        Neighbours::RecursiveAll => {
            select_recursive(universe, requested, Direction::Out, &mut selection)?;
            select_recursive(universe, requested, Direction::In, &mut selection)?;
        }
    }
    Ok(selection)
}

/// Visit every edge incident to a requested node together with the
/// endpoint on its other side.
fn for_each_incident<'a>(
    universe: &Universe<'a>,
    requested: &BTreeSet<String>,
    mut visit: impl FnMut(Direction, &'a Edge, &'a str) -> Result<()>,
) -> Result<()> {
    for id in requested {
        let node = universe.node(id)?;
        for dir in Direction::ALL {
            for edge_id in node.edges(dir) {
                let edge = universe.edge(edge_id)?;
                // the far end of an incoming edge is its tail and vice versa
                let far = dir.opposite();
                visit(far, edge, edge.endpoint(far))?;
            }
        }
    }
    Ok(())
}

fn select_explicit(
    universe: &Universe<'_>,
    requested: &BTreeSet<String>,
    selection: &mut Selection,
) -> Result<()> {
    for_each_incident(universe, requested, |_, edge, other| {
        if requested.contains(other) {
            selection.edges.insert(edge.id.clone(), edge.clone());
        }
        Ok(())
    })
}

fn select_direct(
    universe: &Universe<'_>,
    requested: &BTreeSet<String>,
    selection: &mut Selection,
) -> Result<()> {
    for_each_incident(universe, requested, |_, edge, other| {
        if universe.contains(other) {
            selection.edges.insert(edge.id.clone(), edge.clone());
        }
        Ok(())
    })?;

    for edge in selection.edges.values() {
        for endpoint in [&edge.tail, &edge.head] {
            if !requested.contains(endpoint) {
                selection.added.insert(endpoint.clone());
            }
        }
    }
    Ok(())
}

fn select_parent(
    universe: &Universe<'_>,
    requested: &BTreeSet<String>,
    selection: &mut Selection,
) -> Result<()> {
    for_each_incident(universe, requested, |far, edge, other| {
        for reached in climb(universe, requested, other)? {
            if reached == other {
                selection.edges.insert(edge.id.clone(), edge.clone());
            } else {
                let custom = edge.with_endpoint(far, &reached);
                trace!(edge = %edge.id, custom = %custom.id, "edge attached to scope");
                selection.custom_edges.insert(custom.id.clone(), custom);
            }
            if !requested.contains(&reached) {
                selection.added.insert(reached);
            }
        }
        Ok(())
    })
}

/// Walk up the scopes of `start` until a requested node or a node without
/// in-universe parents. Every parent of a multi-scoped node starts a walk of
/// its own; the distinct end points are returned in sorted order.
fn climb(
    universe: &Universe<'_>,
    requested: &BTreeSet<String>,
    start: &str,
) -> Result<BTreeSet<String>> {
    let mut reached = BTreeSet::new();
    let mut seen = BTreeSet::new();
    let mut explore = vec![start.to_string()];

    while let Some(first) = explore.pop() {
        if !seen.insert(first.clone()) || !universe.contains(&first) {
            continue;
        }

        let mut chain = vec![first];
        loop {
            let current = &chain[chain.len() - 1];
            if requested.contains(current) {
                break;
            }
            let parents = universe.parents(current)?;
            let Some((next, others)) = parents.split_first() else {
                break;
            };
            explore.extend(
                others
                    .iter()
                    .filter(|other| !seen.contains(other.as_str()))
                    .map(|other| other.to_string()),
            );
            if chain.contains(next) {
                return Err(Error::scope_cycle(&chain, next.as_str())
                    .with_operation("select::climb"));
            }
            chain.push(next.to_string());
        }

        if let Some(end) = chain.pop() {
            reached.insert(end);
        }
    }
    Ok(reached)
}

/// Breadth-first closure along `dir`, then every scope above the nodes it
/// reached. Requested nodes are never reported as added.
fn select_recursive(
    universe: &Universe<'_>,
    requested: &BTreeSet<String>,
    dir: Direction,
    selection: &mut Selection,
) -> Result<()> {
    let mut visited = requested.clone();
    let mut queue: VecDeque<&str> = requested.iter().map(String::as_str).collect();
    let mut reached: Vec<String> = Vec::new();

    while let Some(id) = queue.pop_front() {
        let node = universe.node(id)?;
        for edge_id in node.edges(dir) {
            let edge = universe.edge(edge_id)?;
            let next = edge.endpoint(dir.opposite());
            if !universe.contains(next) {
                continue;
            }
            selection
                .edges
                .entry(edge_id.clone())
                .or_insert_with(|| edge.clone());
            if visited.insert(next.to_string()) {
                trace!(from = id, to = next, "reached");
                queue.push_back(next);
                reached.push(next.to_string());
            }
        }
    }

    let mut index = 0;
    while index < reached.len() {
        let node = universe.node(&reached[index])?;
        for parent in &node.scope {
            if universe.contains(parent) && visited.insert(parent.clone()) {
                reached.push(parent.clone());
            }
        }
        index += 1;
    }

    selection.added.extend(reached);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeRecord, GraphBuilder, NodeRecord};
    use pretty_assertions::assert_eq;

    fn graph(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Graph {
        let nodes = nodes
            .into_iter()
            .map(|n| (n.key().to_string(), n))
            .collect();
        let edges = edges
            .into_iter()
            .map(|e| {
                let edge = Edge::from_record(e).unwrap();
                (edge.id.clone(), edge)
            })
            .collect();
        GraphBuilder::new(nodes, edges).build().unwrap()
    }

    fn ids(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn keys(map: &BTreeMap<String, Edge>) -> BTreeSet<String> {
        map.keys().cloned().collect()
    }

    /// a -> b -> c, d -> a, with c inside scope s.
    fn sample() -> Graph {
        graph(
            vec![
                NodeRecord::new("a", "A"),
                NodeRecord::new("b", "B"),
                NodeRecord::new("c", "C").with_scope(&["s"]),
                NodeRecord::new("d", "D"),
                NodeRecord::new("s", "S"),
            ],
            vec![
                EdgeRecord::new("a", "b"),
                EdgeRecord::new("b", "c"),
                EdgeRecord::new("d", "a"),
            ],
        )
    }

    #[test]
    fn explicit_keeps_edges_between_requested_nodes() {
        let graph = sample();
        let sel = select(&Universe::new(&graph), &ids(&["a", "b"]), Neighbours::Explicit).unwrap();
        assert_eq!(keys(&sel.edges), ids(&["a.b"]));
        assert!(sel.added.is_empty());
    }

    #[test]
    fn direct_adds_far_endpoints() {
        let graph = sample();
        let sel = select(&Universe::new(&graph), &ids(&["a"]), Neighbours::Direct).unwrap();
        assert_eq!(keys(&sel.edges), ids(&["a.b", "d.a"]));
        assert_eq!(sel.added, ids(&["b", "d"]));
    }

    #[test]
    fn recursive_out_follows_edges_and_pulls_in_scopes() {
        let graph = sample();
        let sel = select(&Universe::new(&graph), &ids(&["a"]), Neighbours::RecursiveOut).unwrap();
        assert_eq!(keys(&sel.edges), ids(&["a.b", "b.c"]));
        assert_eq!(sel.added, ids(&["b", "c", "s"]));
    }

    #[test]
    fn recursive_in_walks_backwards() {
        let graph = sample();
        let sel = select(&Universe::new(&graph), &ids(&["b"]), Neighbours::RecursiveIn).unwrap();
        assert_eq!(keys(&sel.edges), ids(&["a.b", "d.a"]));
        assert_eq!(sel.added, ids(&["a", "d"]));
    }

    #[test]
    fn recursive_all_runs_both_directions_independently() {
        let graph = sample();
        let sel = select(&Universe::new(&graph), &ids(&["b"]), Neighbours::RecursiveAll).unwrap();
        assert_eq!(keys(&sel.edges), ids(&["a.b", "b.c", "d.a"]));
        assert_eq!(sel.added, ids(&["a", "c", "d", "s"]));
    }

    #[test]
    fn restricted_universe_bounds_traversal() {
        let graph = sample();
        let subset = ids(&["a", "b"]);
        let universe = Universe::restricted(&graph, &subset);
        let sel = select(&universe, &ids(&["a"]), Neighbours::RecursiveAll).unwrap();
        assert_eq!(keys(&sel.edges), ids(&["a.b"]));
        assert_eq!(sel.added, ids(&["b"]));
    }

    #[test]
    fn parent_attaches_edges_to_outermost_scope() {
        let graph = graph(
            vec![
                NodeRecord::new("sys", "System"),
                NodeRecord::new("svc", "Service").with_scope(&["sys"]),
                NodeRecord::new("db", "Database").with_scope(&["svc"]),
                NodeRecord::new("client", "Client"),
            ],
            vec![EdgeRecord::new("client", "db")],
        );

        let sel = select(&Universe::new(&graph), &ids(&["client"]), Neighbours::Parent).unwrap();
        assert!(sel.edges.is_empty());
        assert_eq!(keys(&sel.custom_edges), ids(&["client.sys"]));
        let custom = &sel.custom_edges["client.sys"];
        assert_eq!(custom.head, "sys");
        assert_eq!(custom.scope_in.as_deref(), Some("sys"));
        assert!(graph.is_ancestor_or_self("sys", "db"));
        assert_eq!(sel.added, ids(&["sys"]));
    }

    #[test]
    fn parent_stops_at_requested_scope() {
        let graph = graph(
            vec![
                NodeRecord::new("sys", "System"),
                NodeRecord::new("svc", "Service").with_scope(&["sys"]),
                NodeRecord::new("db", "Database").with_scope(&["svc"]),
                NodeRecord::new("client", "Client"),
            ],
            vec![EdgeRecord::new("client", "db")],
        );

        let sel = select(
            &Universe::new(&graph),
            &ids(&["client", "svc"]),
            Neighbours::Parent,
        )
        .unwrap();
        assert_eq!(keys(&sel.custom_edges), ids(&["client.svc"]));
        assert!(sel.added.is_empty());
    }

    #[test]
    fn parent_climb_reports_scope_cycle() {
        let graph = graph(
            vec![
                NodeRecord::new("a", "A").with_scope(&["b"]),
                NodeRecord::new("b", "B").with_scope(&["a"]),
                NodeRecord::new("x", "X"),
            ],
            vec![EdgeRecord::new("x", "a")],
        );

        let err = select(&Universe::new(&graph), &ids(&["x"]), Neighbours::Parent).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ScopeCycle);
        assert_eq!(err.context_value("id"), Some("a"));
        assert_eq!(err.context_value("branch"), Some("a -> b"));
    }

    #[test]
    fn parent_follows_every_scope_of_multi_scoped_node() {
        let graph = graph(
            vec![
                NodeRecord::new("left", "Left"),
                NodeRecord::new("right", "Right"),
                NodeRecord::new("shared", "Shared").with_scope(&["left", "right"]),
                NodeRecord::new("x", "X"),
            ],
            vec![EdgeRecord::new("shared", "x")],
        );

        let sel = select(&Universe::new(&graph), &ids(&["x"]), Neighbours::Parent).unwrap();
        assert_eq!(keys(&sel.custom_edges), ids(&["left.x", "right.x"]));
        assert_eq!(sel.custom_edges["left.x"].scope_out.as_deref(), Some("left"));
    }
}
