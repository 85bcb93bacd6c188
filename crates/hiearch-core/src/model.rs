//! Resolution pipeline: records in, resolved graph and views out.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::edge::Edge;
use crate::expand::expand_views;
use crate::graph::{Graph, GraphBuilder};
use crate::record::{Document, EdgeRecord, NodeRecord, ViewRecord};
use crate::store::{EntityKind, EntityStore};
use crate::style::flatten_styles;
use crate::view::View;
use crate::{Error, Result};

/// Fully resolved input: the graph and every view, derived ones included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Model {
    pub graph: Graph,
    pub views: BTreeMap<String, View>,
}

impl Model {
    pub fn view(&self, id: &str) -> Result<&View> {
        self.views
            .get(id)
            .ok_or_else(|| Error::missing_reference("view", id))
    }

    /// Views with at least one node, in id order.
    pub fn non_empty_views(&self) -> impl Iterator<Item = &View> {
        self.views.values().filter(|view| !view.is_empty())
    }
}

/// Collects records from any number of documents, then resolves them.
///
/// References are only checked in [`ModelBuilder::build`], so a document may
/// refer to entities defined in a later one.
#[derive(Debug)]
pub struct ModelBuilder {
    nodes: EntityStore<NodeRecord>,
    edges: EntityStore<EdgeRecord>,
    views: EntityStore<ViewRecord>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            nodes: EntityStore::new(EntityKind::Node),
            edges: EntityStore::new(EntityKind::Edge),
            views: EntityStore::new(EntityKind::View),
        }
    }

    pub fn add_document(&mut self, document: Document) -> Result<()> {
        for node in document.nodes {
            self.add_node(node)?;
        }
        for edge in document.edges {
            self.add_edge(edge)?;
        }
        for view in document.views {
            self.add_view(view)?;
        }
        Ok(())
    }

    pub fn add_node(&mut self, record: NodeRecord) -> Result<()> {
        let style = record.checked_style()?;
        for scope in record.scope_ids() {
            self.nodes.require(scope);
        }
        if let Some(style) = &style {
            self.nodes.require(style.id.clone());
        }
        let id = record.key().to_string();
        self.nodes.insert(id, record, style.is_some())
    }

    pub fn add_edge(&mut self, record: EdgeRecord) -> Result<()> {
        let (out, into, id) = record.endpoints()?;
        self.nodes.require(out);
        self.nodes.require(into);
        let style = record.style_key()?;
        if let Some(style) = &style {
            self.edges.require(style.clone());
        }
        self.edges.insert(id, record, style.is_some())
    }

    pub fn add_view(&mut self, record: ViewRecord) -> Result<()> {
        let style = record.checked_style()?;
        for node in record.nodes.iter().flatten() {
            self.nodes.require(node.clone());
        }
        if let Some(style) = &style {
            self.views.require(style.id.clone());
        }
        let id = record.id.clone();
        self.views.insert(id, record, style.is_some())
    }

    pub fn build(self) -> Result<Model> {
        let Self {
            mut nodes,
            mut edges,
            mut views,
        } = self;

        let start = Instant::now();
        edges.check_references()?;
        flatten_styles(&mut edges)?;
        let edges: BTreeMap<String, Edge> = edges
            .into_entities()
            .into_values()
            .map(|record| Edge::from_record(record).map(|edge| (edge.id.clone(), edge)))
            .collect::<Result<_>>()?;
        info!(
            edges = edges.len(),
            "Edges resolved: {:.3}s",
            start.elapsed().as_secs_f64()
        );

        let start = Instant::now();
        nodes.check_references()?;
        flatten_styles(&mut nodes)?;
        let graph = GraphBuilder::new(nodes.into_entities(), edges).build()?;
        info!(
            nodes = graph.nodes.len(),
            "Nodes resolved: {:.3}s",
            start.elapsed().as_secs_f64()
        );

        let start = Instant::now();
        views.check_references()?;
        flatten_styles(&mut views)?;
        let mut views: BTreeMap<String, View> = views
            .into_entities()
            .into_iter()
            .map(|(id, record)| View::from_record(record, &graph).map(|view| (id, view)))
            .collect::<Result<_>>()?;

        if views.values().all(View::is_empty) {
            let fallback = View::fallback(&graph);
            if fallback.is_empty() {
                let ids: Vec<&String> = views.keys().collect();
                return Err(Error::empty_views(&ids).with_operation("model::build"));
            }
            debug!("all views are empty, using the default view");
            views.insert(fallback.id.clone(), fallback);
        }

        for view in views.values_mut() {
            view.resolve(&graph)?;
        }
        expand_views(&mut views, &graph)?;
        info!(
            views = views.len(),
            "Views resolved: {:.3}s",
            start.elapsed().as_secs_f64()
        );

        Ok(Model { graph, views })
    }
}

/// Resolve a sequence of documents, in order.
pub fn resolve_documents(documents: impl IntoIterator<Item = Document>) -> Result<Model> {
    let mut builder = ModelBuilder::new();
    for document in documents {
        builder.add_document(document)?;
    }
    builder.build()
}
