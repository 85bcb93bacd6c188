//! Resolved nodes.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::attr::Attrs;
use crate::edge::Direction;
use crate::record::{DEFAULT_TAG, NodeRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Parent scopes; empty for a root.
    pub scope: BTreeSet<String>,
    pub style: Option<String>,
    pub tags: BTreeSet<String>,
    pub substitutions: Attrs,
    pub attrs: Attrs,
    /// Ids of edges whose head is this node.
    #[serde(rename = "in")]
    pub incoming: BTreeSet<String>,
    /// Ids of edges whose tail is this node.
    #[serde(rename = "out")]
    pub outgoing: BTreeSet<String>,
}

impl Node {
    /// Build a node from a style-flattened record and its normalized scope.
    pub(crate) fn from_record(record: NodeRecord, scope: BTreeSet<String>) -> Self {
        let style = record.style.or(record.style_notag);
        let tags = record
            .tags
            .unwrap_or_else(|| vec![DEFAULT_TAG.to_string()])
            .into_iter()
            .collect();
        let (label, id) = record.id;
        Self {
            id,
            label,
            scope,
            style,
            tags,
            substitutions: record.substitutions.unwrap_or_default(),
            attrs: record.graphviz.unwrap_or_default(),
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.scope.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Incident edge ids on the `dir` side.
    pub fn edges(&self, dir: Direction) -> &BTreeSet<String> {
        match dir {
            Direction::In => &self.incoming,
            Direction::Out => &self.outgoing,
        }
    }
}
