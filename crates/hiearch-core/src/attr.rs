//! Free-form attribute values used for rendering attributes and label
//! substitutions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute map keyed by attribute name.
pub type Attrs = BTreeMap<String, AttrValue>;

/// A single attribute value as written in an input document.
///
/// Scalars keep their YAML type so that dumps round-trip, but every scalar
/// has a textual form used when the value reaches a label or a DOT attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
    Group(Attrs),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Attrs> {
        match self {
            AttrValue::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, AttrValue::List(_) | AttrValue::Group(_))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Flag(flag) => write!(f, "{flag}"),
            AttrValue::Integer(value) => write!(f, "{value}"),
            AttrValue::Float(value) => write!(f, "{value}"),
            AttrValue::Text(text) => f.write_str(text),
            AttrValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            AttrValue::Group(group) => {
                f.write_str("{")?;
                for (i, (key, value)) in group.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Merge two attribute maps key by key, `child` entries taking precedence.
pub fn merge_attrs(parent: &Attrs, child: Attrs) -> Attrs {
    let mut merged = parent.clone();
    merged.extend(child);
    merged
}

/// Merge optional attribute maps, keeping `None` only when both are absent.
pub fn merge_optional_attrs(parent: Option<&Attrs>, child: Option<Attrs>) -> Option<Attrs> {
    match (parent, child) {
        (Some(parent), Some(child)) => Some(merge_attrs(parent, child)),
        (Some(parent), None) => Some(parent.clone()),
        (None, child) => child,
    }
}

/// Merge attribute maps whose values may be groups: groups present on both
/// sides are merged key by key, anything else is replaced by the child.
pub fn merge_groups(parent: Option<&Attrs>, child: Option<Attrs>) -> Option<Attrs> {
    let Some(parent) = parent else {
        return child;
    };
    let Some(child) = child else {
        return Some(parent.clone());
    };

    let mut merged = parent.clone();
    for (key, value) in child {
        let value = match (merged.remove(&key), value) {
            (Some(AttrValue::Group(base)), AttrValue::Group(group)) => {
                AttrValue::Group(merge_attrs(&base, group))
            }
            (_, value) => value,
        };
        merged.insert(key, value);
    }
    Some(merged)
}
