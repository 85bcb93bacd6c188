//! Resolved edges.

use serde::Serialize;

use crate::attr::{AttrValue, Attrs};
use crate::record::{EdgeRecord, OneOrMany};
use crate::{Error, Result};

const LABEL_FORMAT_KEY: &str = "label_format";
const LABEL_PLACEHOLDER: &str = "{label}";

/// Edge direction as seen from a node: `Out` edges leave it, `In` edges
/// arrive at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::In, Direction::Out];

    pub fn opposite(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

/// Id of an edge without an explicit one.
pub fn derive_id(out: &str, into: &str) -> String {
    format!("{out}.{into}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    /// Tail node id.
    #[serde(rename = "out")]
    pub tail: String,
    /// Head node id.
    #[serde(rename = "in")]
    pub head: String,
    pub style: Option<String>,
    /// `[tail, middle, head]` labels.
    pub label: [String; 3],
    /// Templates applied to the three labels.
    pub label_format: [String; 3],
    pub substitutions: Attrs,
    /// Rendering attributes, `label_format` excluded.
    pub attrs: Attrs,
    /// Scope substituted for the original tail in a custom edge.
    pub scope_out: Option<String>,
    /// Scope substituted for the original head in a custom edge.
    pub scope_in: Option<String>,
}

impl Edge {
    /// Build an edge from a style-flattened record.
    pub fn from_record(record: EdgeRecord) -> Result<Self> {
        let (tail, head, id) = record.endpoints()?;
        let style = record.style_key()?;

        let label = match record.label {
            None => empty_triple(),
            Some(OneOrMany::One(middle)) => [String::new(), middle, String::new()],
            Some(OneOrMany::Many(parts)) => match parts.len() {
                0 => empty_triple(),
                3 => triple(parts),
                n => {
                    return Err(Error::invalid_record(
                        "edge",
                        id,
                        format!("edge label list must have 3 entries, got {n}"),
                    ));
                }
            },
        };

        let mut attrs = record.graphviz.unwrap_or_default();
        let label_format = match attrs.remove(LABEL_FORMAT_KEY) {
            None => [
                LABEL_PLACEHOLDER.to_string(),
                LABEL_PLACEHOLDER.to_string(),
                LABEL_PLACEHOLDER.to_string(),
            ],
            Some(AttrValue::List(parts)) if parts.len() == 3 => {
                triple(parts.iter().map(|p| p.to_string()).collect())
            }
            Some(value) if value.is_scalar() => [
                LABEL_PLACEHOLDER.to_string(),
                value.to_string(),
                LABEL_PLACEHOLDER.to_string(),
            ],
            Some(_) => {
                return Err(Error::invalid_record(
                    "edge",
                    id,
                    "label_format must be a string or a list of 3 templates",
                ));
            }
        };

        Ok(Self {
            id,
            tail,
            head,
            style,
            label,
            label_format,
            substitutions: record.substitutions.unwrap_or_default(),
            attrs,
            scope_out: None,
            scope_in: None,
        })
    }

    /// The endpoint on the `dir` side: `Out` is the tail, `In` the head.
    pub fn endpoint(&self, dir: Direction) -> &str {
        match dir {
            Direction::Out => &self.tail,
            Direction::In => &self.head,
        }
    }

    /// Copy of this edge with the `dir` endpoint replaced by `scope`, under
    /// a freshly derived id.
    pub fn with_endpoint(&self, dir: Direction, scope: &str) -> Self {
        let mut edge = self.clone();
        match dir {
            Direction::Out => {
                edge.tail = scope.to_string();
                edge.scope_out = Some(scope.to_string());
            }
            Direction::In => {
                edge.head = scope.to_string();
                edge.scope_in = Some(scope.to_string());
            }
        }
        edge.id = derive_id(&edge.tail, &edge.head);
        edge
    }
}

fn empty_triple() -> [String; 3] {
    [String::new(), String::new(), String::new()]
}

fn triple(parts: Vec<String>) -> [String; 3] {
    let mut iter = parts.into_iter();
    let mut next = || iter.next().unwrap_or_default();
    [next(), next(), next()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn string_label_becomes_middle_label() {
        let edge = Edge::from_record(EdgeRecord::new("a", "b").with_label("calls")).unwrap();
        assert_eq!(edge.id, "a.b");
        assert_eq!(edge.label, [String::new(), "calls".to_string(), String::new()]);
        assert_eq!(edge.label_format[1], "{label}");
    }

    #[test]
    fn string_label_format_only_applies_to_middle() {
        let record = EdgeRecord::new("a", "b").with_attr("label_format", "<{label}>");
        let edge = Edge::from_record(record).unwrap();
        assert_eq!(
            edge.label_format,
            [
                "{label}".to_string(),
                "<{label}>".to_string(),
                "{label}".to_string()
            ]
        );
        assert!(!edge.attrs.contains_key("label_format"));
    }

    #[test]
    fn label_list_must_have_three_entries() {
        let mut record = EdgeRecord::new("a", "b");
        record.label = Some(OneOrMany::Many(vec!["x".to_string(), "y".to_string()]));
        let err = Edge::from_record(record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRecord);
    }

    #[test]
    fn substituted_endpoint_gets_new_id() {
        let edge = Edge::from_record(EdgeRecord::new("a", "b").with_id("ab")).unwrap();
        let custom = edge.with_endpoint(Direction::Out, "scope");
        assert_eq!(custom.id, "scope.b");
        assert_eq!(custom.endpoint(Direction::Out), "scope");
        assert_eq!(custom.scope_out.as_deref(), Some("scope"));
        assert_eq!(custom.scope_in, None);
    }
}
