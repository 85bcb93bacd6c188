//! Keyed container for one entity kind.

use std::collections::{BTreeMap, BTreeSet};

use strum_macros::{Display, IntoStaticStr};

use crate::{Error, Result};

/// The three entity kinds; ids are unique within a kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Node,
    Edge,
    View,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Entities of one kind, keyed by id.
///
/// Besides the entities themselves the store tracks the ids that other
/// records refer to (checked once every file is loaded, so forward references
/// are fine) and the ids still waiting for style resolution.
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    kind: EntityKind,
    pub(crate) entities: BTreeMap<String, T>,
    pub(crate) must_exist: BTreeSet<String>,
    pub(crate) pending: Vec<String>,
}

impl<T> EntityStore<T> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entities: BTreeMap::new(),
            must_exist: BTreeSet::new(),
            pending: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entities.get(id)
    }

    /// Ids queued for style resolution, in registration order.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Register an entity. Styled entities are queued for the style cascade.
    pub fn insert(&mut self, id: impl Into<String>, entity: T, styled: bool) -> Result<()> {
        let id = id.into();
        if self.entities.contains_key(&id) {
            return Err(Error::duplicate_id(self.kind.as_str(), id).with_operation("store::insert"));
        }
        if styled {
            self.pending.push(id.clone());
        }
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Record that `id` must be defined by the time loading finishes.
    pub fn require(&mut self, id: impl Into<String>) {
        self.must_exist.insert(id.into());
    }

    /// Fail on the first required id that was never defined.
    pub fn check_references(&self) -> Result<()> {
        match self
            .must_exist
            .iter()
            .find(|id| !self.entities.contains_key(*id))
        {
            Some(missing) => Err(Error::missing_reference(self.kind.as_str(), missing.clone())
                .with_operation("store::check_references")),
            None => Ok(()),
        }
    }

    pub fn into_entities(self) -> BTreeMap<String, T> {
        self.entities
    }
}
