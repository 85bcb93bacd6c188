//! Resolution engine for hierarchical, styled diagrams.
//!
//! Raw node, edge and view records go in (one [`Document`] per input file);
//! a [`Model`] comes out, holding the adjacency-annotated [`Graph`] and one
//! fully resolved [`View`] per diagram: selected nodes, selected and
//! synthesized edges, and the clustering [`ScopeTree`].
//!
//! ```text
//! records -> style cascade -> graph model -> view selection -> scope tree
//! ```

pub mod attr;
pub mod edge;
pub mod expand;
pub mod graph;
pub mod model;
pub mod node;
pub mod record;
pub mod scope_tree;
pub mod select;
pub mod store;
pub mod style;
pub mod view;

pub use attr::{AttrValue, Attrs};
pub use edge::{Direction, Edge};
pub use graph::{Graph, GraphBuilder};
pub use hiearch_error::{Error, ErrorKind, Result};
pub use model::{Model, ModelBuilder, resolve_documents};
pub use node::Node;
pub use record::{Document, EdgeRecord, NodeRecord, OneOrMany, StyleRef, ViewRecord};
pub use scope_tree::{ScopeTree, Tree, TreeEntry};
pub use select::{Selection, Universe};
pub use store::{EntityKind, EntityStore};
pub use view::{Neighbours, View};
