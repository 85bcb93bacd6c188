//! Raw entity records as produced by the input parser.
//!
//! Records keep every field optional so that the style cascade can tell an
//! explicitly set field from an inherited one. They become [`crate::Node`],
//! [`crate::Edge`] and [`crate::View`] once styles are flattened.

use serde::{Deserialize, Serialize};

use crate::attr::{AttrValue, Attrs, merge_groups, merge_optional_attrs};
use crate::style::Inherit;
use crate::{Error, Result};

pub(crate) const DEFAULT_TAG: &str = "default";

/// One input file: any mix of nodes, edges and views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub views: Vec<ViewRecord>,
}

/// A field that accepts either a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// Reference from a styled entity to its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRef {
    pub id: String,
    /// `false` for `style_notag`: tags are not inherited from the template.
    pub inherit_tags: bool,
}

impl StyleRef {
    fn pick(kind: &str, key: &str, style: &Option<String>, notag: &Option<String>) -> Result<Option<Self>> {
        match (style, notag) {
            (Some(_), Some(_)) => Err(Error::invalid_record(
                kind,
                key,
                format!("{kind} '{key}' cannot have both style and style_notag"),
            )),
            (Some(id), None) => Ok(Some(StyleRef {
                id: id.clone(),
                inherit_tags: true,
            })),
            (None, Some(id)) => Ok(Some(StyleRef {
                id: id.clone(),
                inherit_tags: false,
            })),
            (None, None) => Ok(None),
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// `[label, id]`
    pub id: (String, String),
    pub scope: Option<OneOrMany>,
    pub style: Option<String>,
    pub style_notag: Option<String>,
    pub tags: Option<Vec<String>>,
    pub substitutions: Option<Attrs>,
    pub graphviz: Option<Attrs>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: (label.into(), id.into()),
            scope: None,
            style: None,
            style_notag: None,
            tags: None,
            substitutions: None,
            graphviz: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.id.1
    }

    pub fn label(&self) -> &str {
        &self.id.0
    }

    pub fn with_scope(mut self, scopes: &[&str]) -> Self {
        self.scope = Some(match scopes {
            [single] => OneOrMany::One(single.to_string()),
            many => OneOrMany::Many(many.iter().map(|s| s.to_string()).collect()),
        });
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(style.to_string());
        self
    }

    pub fn with_style_notag(mut self, style: &str) -> Self {
        self.style_notag = Some(style.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.graphviz
            .get_or_insert_with(Attrs::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn with_substitution(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.substitutions
            .get_or_insert_with(Attrs::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Scope ids as written, duplicates included.
    pub fn scope_ids(&self) -> Vec<String> {
        self.scope.as_ref().map(OneOrMany::to_vec).unwrap_or_default()
    }

    /// Style reference, rejecting records that set both `style` and `style_notag`.
    pub fn checked_style(&self) -> Result<Option<StyleRef>> {
        StyleRef::pick("node", self.key(), &self.style, &self.style_notag)
    }
}

impl Inherit for NodeRecord {
    fn style_ref(&self) -> Option<StyleRef> {
        self.checked_style().ok().flatten()
    }

    fn inherit(self, parent: &Self, inherit_tags: bool) -> Self {
        let tags = match self.tags {
            Some(tags) => Some(tags),
            None if inherit_tags => parent.tags.clone(),
            None => Some(vec![DEFAULT_TAG.to_string()]),
        };
        Self {
            id: self.id,
            scope: self.scope.or_else(|| parent.scope.clone()),
            style: self.style,
            style_notag: self.style_notag,
            tags,
            substitutions: merge_optional_attrs(parent.substitutions.as_ref(), self.substitutions),
            graphviz: merge_optional_attrs(parent.graphviz.as_ref(), self.graphviz),
        }
    }
}

// ============================================================================
// Edges
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// `[out, in]` or `[out, in, id]`
    pub link: Vec<String>,
    /// Edge id or `[out, in]` pair.
    pub style: Option<OneOrMany>,
    /// Middle label, or `[tail, middle, head]`.
    pub label: Option<OneOrMany>,
    pub substitutions: Option<Attrs>,
    pub graphviz: Option<Attrs>,
}

impl EdgeRecord {
    pub fn new(out: impl Into<String>, into: impl Into<String>) -> Self {
        Self {
            link: vec![out.into(), into.into()],
            style: None,
            label: None,
            substitutions: None,
            graphviz: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.link.truncate(2);
        self.link.push(id.to_string());
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(OneOrMany::One(style.to_string()));
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(OneOrMany::One(label.to_string()));
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.graphviz
            .get_or_insert_with(Attrs::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Validate the link arity and return `(out, in, id)`.
    pub fn endpoints(&self) -> Result<(String, String, String)> {
        match self.link.as_slice() {
            [out, into] => Ok((out.clone(), into.clone(), crate::edge::derive_id(out, into))),
            [out, into, id] => Ok((out.clone(), into.clone(), id.clone())),
            other => Err(Error::invalid_record(
                "edge",
                other.join("."),
                format!(
                    "edge link must be [out, in] or [out, in, id], got {} entries",
                    other.len()
                ),
            )),
        }
    }

    /// Style key with `[out, in]` pairs folded into their derived edge id.
    pub fn style_key(&self) -> Result<Option<String>> {
        match &self.style {
            None => Ok(None),
            Some(OneOrMany::One(id)) => Ok(Some(id.clone())),
            Some(OneOrMany::Many(parts)) => match parts.as_slice() {
                [out, into] => Ok(Some(crate::edge::derive_id(out, into))),
                other => Err(Error::invalid_record(
                    "edge",
                    self.link.join("."),
                    format!(
                        "edge style must be an id or [out, in], got {} entries",
                        other.len()
                    ),
                )),
            },
        }
    }
}

impl Inherit for EdgeRecord {
    fn style_ref(&self) -> Option<StyleRef> {
        self.style_key().ok().flatten().map(|id| StyleRef {
            id,
            inherit_tags: true,
        })
    }

    fn inherit(self, parent: &Self, _inherit_tags: bool) -> Self {
        Self {
            link: self.link,
            style: self.style,
            label: self.label.or_else(|| parent.label.clone()),
            substitutions: merge_optional_attrs(parent.substitutions.as_ref(), self.substitutions),
            graphviz: merge_optional_attrs(parent.graphviz.as_ref(), self.graphviz),
        }
    }
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub id: String,
    /// Requested nodes; absent means "derive from tags".
    pub nodes: Option<Vec<String>>,
    pub neighbours: Option<String>,
    pub tags: Option<Vec<String>>,
    pub style: Option<String>,
    pub style_notag: Option<String>,
    /// Kept loose so that a non-list value can be reported as malformed.
    pub expand: Option<AttrValue>,
    /// `graph` / `node` / `edge` attribute groups.
    pub graphviz: Option<Attrs>,
}

impl ViewRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: None,
            neighbours: None,
            tags: None,
            style: None,
            style_notag: None,
            expand: None,
            graphviz: None,
        }
    }

    pub fn with_nodes(mut self, nodes: &[&str]) -> Self {
        self.nodes = Some(nodes.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_neighbours(mut self, neighbours: &str) -> Self {
        self.neighbours = Some(neighbours.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(style.to_string());
        self
    }

    pub fn with_expand(mut self, policies: &[&str]) -> Self {
        self.expand = Some(AttrValue::List(
            policies.iter().map(|p| AttrValue::from(*p)).collect(),
        ));
        self
    }

    /// Style reference, rejecting records that set both `style` and `style_notag`.
    pub fn checked_style(&self) -> Result<Option<StyleRef>> {
        StyleRef::pick("view", &self.id, &self.style, &self.style_notag)
    }
}

impl Inherit for ViewRecord {
    fn style_ref(&self) -> Option<StyleRef> {
        self.checked_style().ok().flatten()
    }

    fn inherit(self, parent: &Self, inherit_tags: bool) -> Self {
        let tags = match self.tags {
            Some(tags) => Some(tags),
            None if inherit_tags => parent.tags.clone(),
            None => Some(vec![DEFAULT_TAG.to_string()]),
        };
        Self {
            id: self.id,
            nodes: self.nodes.or_else(|| parent.nodes.clone()),
            neighbours: self.neighbours.or_else(|| parent.neighbours.clone()),
            tags,
            style: self.style,
            style_notag: self.style_notag,
            expand: self.expand.or_else(|| parent.expand.clone()),
            graphviz: merge_groups(parent.graphviz.as_ref(), self.graphviz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn node_rejects_both_style_kinds() {
        let record = NodeRecord::new("a", "A")
            .with_style("s")
            .with_style_notag("t");
        let err = record.checked_style().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    }

    #[test]
    fn node_inherits_missing_fields_from_template() {
        let parent = NodeRecord::new("tmpl", "Template")
            .with_scope(&["outer"])
            .with_tags(&["infra"])
            .with_attr("shape", "box")
            .with_attr("color", "grey");
        let child = NodeRecord::new("db", "Database")
            .with_style("tmpl")
            .with_attr("color", "blue");

        let merged = child.inherit(&parent, true);
        assert_eq!(merged.label(), "Database");
        assert_eq!(merged.scope_ids(), vec!["outer".to_string()]);
        assert_eq!(merged.tags, Some(vec!["infra".to_string()]));
        let attrs = merged.graphviz.unwrap();
        assert_eq!(attrs["shape"], AttrValue::from("box"));
        assert_eq!(attrs["color"], AttrValue::from("blue"));
    }

    #[test]
    fn style_notag_resets_tags_to_default() {
        let parent = NodeRecord::new("tmpl", "Template").with_tags(&["infra"]);
        let child = NodeRecord::new("db", "Database").with_style_notag("tmpl");

        let merged = child.inherit(&parent, false);
        assert_eq!(merged.tags, Some(vec![DEFAULT_TAG.to_string()]));
    }

    #[test]
    fn edge_link_arity_is_validated() {
        let mut record = EdgeRecord::new("a", "b");
        assert_eq!(
            record.endpoints().unwrap(),
            ("a".to_string(), "b".to_string(), "a.b".to_string())
        );

        record = record.with_id("custom");
        assert_eq!(record.endpoints().unwrap().2, "custom");

        record.link = vec!["a".to_string()];
        assert_eq!(
            record.endpoints().unwrap_err().kind(),
            ErrorKind::InvalidRecord
        );
    }

    #[test]
    fn edge_style_pair_folds_into_edge_id() {
        let mut record = EdgeRecord::new("a", "b");
        record.style = Some(OneOrMany::Many(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(record.style_key().unwrap(), Some("x.y".to_string()));
    }

    #[test]
    fn edge_style_list_must_be_a_pair() {
        let mut record = EdgeRecord::new("a", "b");
        record.style = Some(OneOrMany::Many(vec![
            "x".to_string(),
            "y".to_string(),
            "z".to_string(),
        ]));
        let err = record.style_key().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
        assert_eq!(err.context_value("id"), Some("a.b"));

        record.style = Some(OneOrMany::Many(vec!["x".to_string()]));
        assert_eq!(record.style_key().unwrap_err().kind(), ErrorKind::InvalidRecord);
    }

    #[test]
    fn node_substitutions_merge_with_template() {
        let parent = NodeRecord::new("tmpl", "Template")
            .with_substitution("owner", "platform")
            .with_substitution("tier", "2");
        let child = NodeRecord::new("db", "Database")
            .with_style("tmpl")
            .with_substitution("tier", "1");

        let merged = child.inherit(&parent, true).substitutions.unwrap();
        assert_eq!(merged["owner"], AttrValue::from("platform"));
        assert_eq!(merged["tier"], AttrValue::from("1"));
    }
}
