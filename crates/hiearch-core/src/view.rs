//! Views: named selections over the graph, resolved into diagrams.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::attr::{AttrValue, Attrs};
use crate::edge::Edge;
use crate::graph::Graph;
use crate::record::{DEFAULT_TAG, ViewRecord};
use crate::scope_tree::ScopeTree;
use crate::select::{Universe, select};
use crate::{Error, Result};

/// Neighbour-selection policy of a view.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Neighbours {
    /// Only edges between requested nodes.
    #[default]
    Explicit,
    /// Every edge touching a requested node, plus its other endpoint.
    Direct,
    /// Edges touching a requested node, re-attached to the outermost
    /// unrequested scope of the other endpoint.
    Parent,
    #[strum(to_string = "recursive_in", serialize = "recursive-in")]
    RecursiveIn,
    #[strum(to_string = "recursive_out", serialize = "recursive-out")]
    RecursiveOut,
    #[strum(to_string = "recursive_all", serialize = "recursive-all")]
    RecursiveAll,
}

impl Neighbours {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Parse a policy name, accepting snake_case and hyphenated spellings.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse().map_err(|_| {
            let allowed: Vec<&str> = Self::iter().map(|n| n.as_str()).collect();
            Error::unsupported_policy(name, &allowed)
        })
    }

    /// Whether the policy may be used for expansion.
    pub fn is_recursive(&self) -> bool {
        matches!(
            self,
            Neighbours::RecursiveIn | Neighbours::RecursiveOut | Neighbours::RecursiveAll
        )
    }
}

fn parse_expand(view: &str, expand: Option<&AttrValue>) -> Result<Vec<Neighbours>> {
    let Some(value) = expand else {
        return Ok(Vec::new());
    };
    let entries = value
        .as_list()
        .ok_or_else(|| Error::malformed_expand(view))?;

    entries
        .iter()
        .map(|entry| {
            let name = entry
                .as_text()
                .ok_or_else(|| Error::malformed_expand(view))?;
            let policy = Neighbours::parse(name)?;
            if !policy.is_recursive() {
                let allowed: Vec<&str> = Neighbours::iter()
                    .filter(Neighbours::is_recursive)
                    .map(|n| n.as_str())
                    .collect();
                return Err(Error::unsupported_policy(name, &allowed).with_context("view", view));
            }
            Ok(policy)
        })
        .collect()
}

/// A view after style flattening, selection and clustering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub id: String,
    /// Nodes the view asked for, explicitly or through tags.
    pub requested: BTreeSet<String>,
    /// Final node set; always a superset of `requested`.
    pub nodes: BTreeSet<String>,
    pub neighbours: Neighbours,
    pub tags: BTreeSet<String>,
    pub style: Option<String>,
    /// `graph` / `node` / `edge` attribute groups.
    pub attrs: Attrs,
    pub expand: Vec<Neighbours>,
    /// Set on views generated by expansion, and on the view they came from.
    pub expanded_from: Option<String>,
    /// Restricts traversal for views generated by expansion.
    pub nodes_subset: Option<BTreeSet<String>>,
    pub edges: BTreeMap<String, Edge>,
    /// Edges with an endpoint replaced by one of its scopes.
    pub custom_edges: BTreeMap<String, Edge>,
    pub tree: ScopeTree,
}

impl View {
    /// Validate a style-flattened record and compute its requested node set.
    pub fn from_record(record: ViewRecord, graph: &Graph) -> Result<Self> {
        let ViewRecord {
            id,
            nodes,
            neighbours,
            tags,
            style,
            style_notag,
            expand,
            graphviz,
        } = record;

        let neighbours = match neighbours {
            Some(name) => Neighbours::parse(&name).map_err(|e| e.with_context("view", id.clone()))?,
            None => Neighbours::default(),
        };
        let expand = parse_expand(&id, expand.as_ref())?;

        let mut tags: BTreeSet<String> = tags.unwrap_or_default().into_iter().collect();
        let mut requested = BTreeSet::new();
        match nodes {
            None => {
                if tags.is_empty() {
                    tags.insert(DEFAULT_TAG.to_string());
                }
            }
            Some(listed) => {
                requested.extend(listed.iter().cloned());
                if requested.len() != listed.len() {
                    return Err(Error::duplicate_view_node(id, &listed)
                        .with_operation("view::from_record"));
                }
            }
        }
        for tag in &tags {
            requested.extend(graph.nodes_tagged(tag));
        }

        Ok(Self {
            nodes: requested.clone(),
            requested,
            neighbours,
            tags,
            style: style.or(style_notag),
            attrs: graphviz.unwrap_or_default(),
            expand,
            expanded_from: None,
            nodes_subset: None,
            edges: BTreeMap::new(),
            custom_edges: BTreeMap::new(),
            tree: ScopeTree::default(),
            id,
        })
    }

    /// The view nothing asked for: every node tagged `default`.
    pub fn fallback(graph: &Graph) -> Self {
        let requested = graph.nodes_tagged(DEFAULT_TAG);
        Self {
            id: DEFAULT_TAG.to_string(),
            nodes: requested.clone(),
            requested,
            neighbours: Neighbours::default(),
            tags: BTreeSet::from([DEFAULT_TAG.to_string()]),
            style: None,
            attrs: Attrs::new(),
            expand: Vec::new(),
            expanded_from: None,
            nodes_subset: None,
            edges: BTreeMap::new(),
            custom_edges: BTreeMap::new(),
            tree: ScopeTree::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    /// Attribute group `name` (`graph`, `node` or `edge`), empty if unset.
    pub fn group(&self, name: &str) -> Attrs {
        self.attrs
            .get(name)
            .and_then(AttrValue::as_group)
            .cloned()
            .unwrap_or_default()
    }

    /// Select neighbours and build the scope tree. Empty views stay empty.
    pub fn resolve(&mut self, graph: &Graph) -> Result<()> {
        if self.is_empty() {
            debug!(view = %self.id, "skipping empty view");
            return Ok(());
        }

        let universe = match &self.nodes_subset {
            Some(subset) => Universe::restricted(graph, subset),
            None => Universe::new(graph),
        };
        let selection = select(&universe, &self.requested, self.neighbours)
            .map_err(|e| e.with_context("view", self.id.clone()))?;

        self.nodes = self.requested.union(&selection.added).cloned().collect();
        self.edges = selection.edges;
        self.custom_edges = selection.custom_edges;
        self.tree = ScopeTree::build(graph, &self.nodes)
            .map_err(|e| e.with_context("view", self.id.clone()))?;

        debug!(
            view = %self.id,
            policy = %self.neighbours,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            custom_edges = self.custom_edges.len(),
            "view resolved"
        );
        Ok(())
    }
}
