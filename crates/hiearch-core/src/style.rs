//! Style cascade: flattens "this entity extends entity X" chains.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::store::EntityStore;
use crate::{Error, Result, StyleRef};

/// A record that can extend another record of the same kind.
pub trait Inherit: Clone {
    /// The template this record extends, if any.
    fn style_ref(&self) -> Option<StyleRef>;

    /// Merge `parent` under `self`: nested attribute maps merge key by key,
    /// every other field keeps the child's value when present.
    fn inherit(self, parent: &Self, inherit_tags: bool) -> Self;
}

/// Resolve every pending entity of `store` against its template.
///
/// Each sweep resolves the entities whose template is either a root (not
/// styled itself) or was already resolved. A sweep that makes no progress
/// while entities remain means the style graph has a cycle.
pub fn flatten_styles<T: Inherit>(store: &mut EntityStore<T>) -> Result<()> {
    let kind = store.kind();
    let worklist = std::mem::take(&mut store.pending);
    let mut resolved = vec![false; worklist.len()];
    let mut applied: BTreeSet<String> = BTreeSet::new();
    let mut remaining = worklist.len();
    let mut sweeps = 0usize;

    while remaining > 0 {
        sweeps += 1;
        let before = remaining;

        for (index, id) in worklist.iter().enumerate() {
            if resolved[index] {
                continue;
            }

            let child = store
                .entities
                .get(id)
                .ok_or_else(|| Error::missing_reference(kind.as_str(), id.clone()))?;
            let style = child.style_ref().ok_or_else(|| {
                Error::unexpected(format!("{kind} '{id}' was queued without a style"))
            })?;
            let parent = store
                .entities
                .get(&style.id)
                .ok_or_else(|| Error::missing_reference(kind.as_str(), style.id.clone()))?;

            if parent.style_ref().is_some() && !applied.contains(&style.id) {
                continue;
            }

            trace!(%kind, id, template = %style.id, "applying style");
            let parent = parent.clone();
            if let Some(child) = store.entities.remove(id) {
                let merged = child.inherit(&parent, style.inherit_tags);
                store.entities.insert(id.clone(), merged);
            }
            applied.insert(id.clone());
            resolved[index] = true;
            remaining -= 1;
        }

        if remaining == before {
            let unresolved: Vec<&String> = worklist
                .iter()
                .zip(&resolved)
                .filter(|(_, done)| !**done)
                .map(|(id, _)| id)
                .collect();
            return Err(Error::style_cycle(kind.as_str(), &unresolved)
                .with_operation("style::flatten_styles"));
        }
    }

    debug!(%kind, styled = worklist.len(), sweeps, "styles flattened");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityKind;
    use crate::{AttrValue, ErrorKind, NodeRecord};

    fn store_of(records: Vec<NodeRecord>) -> EntityStore<NodeRecord> {
        let mut store = EntityStore::new(EntityKind::Node);
        for record in records {
            let styled = Inherit::style_ref(&record).is_some();
            store
                .insert(record.key().to_string(), record, styled)
                .unwrap();
        }
        store
    }

    #[test]
    fn resolves_chains_declared_out_of_order() {
        let mut store = store_of(vec![
            NodeRecord::new("leaf", "Leaf").with_style("middle"),
            NodeRecord::new("middle", "Middle")
                .with_style("root")
                .with_attr("color", "blue"),
            NodeRecord::new("root", "Root")
                .with_attr("shape", "box")
                .with_attr("color", "red"),
        ]);

        flatten_styles(&mut store).unwrap();

        let leaf = store.get("leaf").unwrap().graphviz.clone().unwrap();
        assert_eq!(leaf["shape"], AttrValue::from("box"));
        assert_eq!(leaf["color"], AttrValue::from("blue"));
        assert!(store.pending().is_empty());
    }

    #[test]
    fn cycle_is_reported_with_all_unresolved_ids() {
        let mut store = store_of(vec![
            NodeRecord::new("a", "A").with_style("b"),
            NodeRecord::new("b", "B").with_style("a"),
            NodeRecord::new("c", "C").with_style("root"),
            NodeRecord::new("root", "Root"),
        ]);

        let err = flatten_styles(&mut store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StyleCycle);
        assert_eq!(err.context_value("ids"), Some("a, b"));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut store = store_of(vec![NodeRecord::new("a", "A").with_style("a")]);
        let err = flatten_styles(&mut store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StyleCycle);
    }

    #[test]
    fn flattening_is_idempotent() {
        let records = vec![
            NodeRecord::new("x", "X").with_style("y").with_attr("a", "1"),
            NodeRecord::new("y", "Y").with_style("z").with_attr("b", "2"),
            NodeRecord::new("z", "Z").with_attr("c", "3").with_tags(&["t"]),
        ];
        let mut first = store_of(records.clone());
        let mut second = store_of(records);
        flatten_styles(&mut first).unwrap();
        flatten_styles(&mut second).unwrap();
        assert_eq!(first.into_entities(), second.into_entities());
    }
}
