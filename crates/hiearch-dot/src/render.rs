//! Renders one resolved view as a DOT digraph.

use hiearch_core::{AttrValue, Attrs, Edge, Error, Graph, Node, Result, Tree, View};
use tracing::trace;

use crate::dot::{DotBuilder, cluster_name};
use crate::format::{Substitutions, format_label};

const NODE_LABEL_FORMAT: &str = "node_label_format";
const SCOPE_LABEL_FORMAT: &str = "scope_label_format";
const DEFAULT_LABEL_FORMAT: &str = "{label}";
const EDGE_LABEL_SLOTS: [&str; 3] = ["taillabel", "label", "headlabel"];

fn stringify(attrs: &Attrs) -> Vec<(String, String)> {
    attrs
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

fn take_format(attrs: &mut Attrs, key: &str) -> Option<String> {
    attrs.remove(key).map(|value| value.to_string())
}

/// View-wide rendering settings.
struct Context<'a> {
    graph: &'a Graph,
    view: &'a View,
    node_label_format: String,
    scope_label_format: String,
}

impl Context<'_> {
    fn node_substitutions(&self, node: &Node) -> Substitutions {
        let mut values: Substitutions = node
            .substitutions
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        values.insert("label".into(), node.label.clone());
        values.insert("id".into(), node.id.clone());
        values.insert(
            "scope".into(),
            node.scope.iter().cloned().collect::<Vec<_>>().join(","),
        );
        values.insert("style".into(), node.style.clone().unwrap_or_default());
        if let Some(origin) = &self.view.expanded_from {
            values.insert("expanded_from".into(), origin.clone());
        }
        values
    }

    /// Attributes of a tree entry; the node's own label formats win over
    /// the view's.
    fn node_attrs(&self, node: &Node, is_scope: bool) -> Result<Vec<(String, String)>> {
        let mut attrs = node.attrs.clone();
        let node_format = take_format(&mut attrs, NODE_LABEL_FORMAT);
        let scope_format = take_format(&mut attrs, SCOPE_LABEL_FORMAT);
        let template = if is_scope {
            scope_format.unwrap_or_else(|| self.scope_label_format.clone())
        } else {
            node_format.unwrap_or_else(|| self.node_label_format.clone())
        };

        let label = format_label(&template, &self.node_substitutions(node))
            .map_err(|e| e.with_context("node", node.id.clone()))?;
        attrs.insert("label".into(), AttrValue::Text(label));
        if is_scope {
            attrs.insert("cluster".into(), AttrValue::from("true"));
        }
        Ok(stringify(&attrs))
    }

    fn render_tree(&self, dot: &mut DotBuilder, tree: &Tree) -> Result<()> {
        for (id, entry) in tree {
            let node = self.graph.node(id)?;
            if entry.is_leaf() {
                dot.node(&entry.key_path, &self.node_attrs(node, false)?);
            } else {
                dot.start_cluster(&entry.key_path, &self.node_attrs(node, true)?);
                self.render_tree(dot, &entry.subtree)?;
                dot.end_cluster();
            }
        }
        Ok(())
    }

    /// Leaf key paths an edge endpoint may attach to. For a scope, the paths
    /// of its representative leaf that pass through it, each paired with the
    /// scope's own path.
    fn endpoint_candidates(&self, id: &str) -> Result<Vec<(String, Option<String>)>> {
        let tree = &self.view.tree;
        let paths = |id: &str| -> Result<Vec<String>> {
            tree.key_paths
                .get(id)
                .map(|paths| paths.iter().cloned().collect())
                .ok_or_else(|| {
                    Error::missing_reference("node", id).with_context("view", self.view.id.clone())
                })
        };

        if !tree.is_scope(id) {
            return Ok(paths(id)?.into_iter().map(|path| (path, None)).collect());
        }

        let leaf = representative(self.view, id);
        let leaf_paths = paths(&leaf)?;
        let mut candidates = Vec::new();
        for scope_path in paths(id)? {
            let prefix = format!("{scope_path}.");
            for leaf_path in leaf_paths.iter().filter(|path| path.starts_with(&prefix)) {
                candidates.push((leaf_path.clone(), Some(scope_path.clone())));
            }
        }
        Ok(candidates)
    }

    fn edge_attrs(&self, edge: &Edge) -> Result<Vec<(String, String)>> {
        let mut values: Substitutions = edge
            .substitutions
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        values.insert("id".into(), edge.id.clone());
        values.insert("node_in".into(), edge.head.clone());
        values.insert("node_out".into(), edge.tail.clone());
        values.insert("scope_in".into(), edge.scope_in.clone().unwrap_or_default());
        values.insert("scope_out".into(), edge.scope_out.clone().unwrap_or_default());
        values.insert("style".into(), edge.style.clone().unwrap_or_default());

        let mut attrs = edge.attrs.clone();
        for ((slot, label), template) in EDGE_LABEL_SLOTS
            .iter()
            .zip(&edge.label)
            .zip(&edge.label_format)
        {
            values.insert("label".into(), label.clone());
            let text = format_label(template, &values)
                .map_err(|e| e.with_context("edge", edge.id.clone()))?;
            if !text.is_empty() {
                attrs.insert(slot.to_string(), AttrValue::Text(text));
            }
        }
        Ok(stringify(&attrs))
    }

    fn render_edge(&self, dot: &mut DotBuilder, edge: &Edge) -> Result<()> {
        let tails = self.endpoint_candidates(&edge.tail)?;
        let heads = self.endpoint_candidates(&edge.head)?;

        let mut best: Option<(usize, &(String, Option<String>), &(String, Option<String>))> = None;
        for tail in &tails {
            for head in &heads {
                let shared = common_prefix_len(&tail.0, &head.0);
                if best.is_none_or(|(len, _, _)| shared > len) {
                    best = Some((shared, tail, head));
                }
            }
        }
        let Some((_, (tail_path, tail_scope), (head_path, head_scope))) = best else {
            return Err(Error::missing_reference("node", edge.id.clone())
                .with_operation("render::render_edge")
                .with_context("view", self.view.id.clone()));
        };

        let mut attrs = self.edge_attrs(edge)?;
        if let Some(scope) = tail_scope {
            attrs.push(("ltail".into(), cluster_name(scope)));
            attrs.push(("tailclip".into(), "false".into()));
        }
        if let Some(scope) = head_scope {
            attrs.push(("lhead".into(), cluster_name(scope)));
            attrs.push(("headclip".into(), "false".into()));
        }
        trace!(edge = %edge.id, tail = %tail_path, head = %head_path, "edge routed");
        dot.edge(tail_path, head_path, &attrs);
        Ok(())
    }
}

/// Leaf reached from `scope` by always descending into the smallest member.
fn representative(view: &View, scope: &str) -> String {
    let mut current = scope.to_string();
    while let Some(first) = view
        .tree
        .scopes
        .get(&current)
        .and_then(|members| members.first())
    {
        current = first.clone();
    }
    current
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Render `view` of `graph` as DOT text.
pub fn render_view(view: &View, graph: &Graph) -> Result<String> {
    let mut node_defaults = view.group("node");
    let node_label_format = take_format(&mut node_defaults, NODE_LABEL_FORMAT)
        .unwrap_or_else(|| DEFAULT_LABEL_FORMAT.to_string());
    let scope_label_format = take_format(&mut node_defaults, SCOPE_LABEL_FORMAT)
        .unwrap_or_else(|| DEFAULT_LABEL_FORMAT.to_string());

    let mut dot = DotBuilder::new(&view.id);
    for (key, value) in stringify(&view.group("graph")) {
        dot.attr(&key, &value);
    }
    dot.attr("compound", "true")
        .defaults("node", &stringify(&node_defaults))
        .defaults("edge", &stringify(&view.group("edge")));

    let ctx = Context {
        graph,
        view,
        node_label_format,
        scope_label_format,
    };
    ctx.render_tree(&mut dot, &view.tree.roots)?;
    for edge in view.edges.values().chain(view.custom_edges.values()) {
        ctx.render_edge(&mut dot, edge)?;
    }
    Ok(dot.build())
}
