//! DOT rendering of resolved hiearch views.
//!
//! Each non-empty view becomes one `digraph`: scopes in the view's tree turn
//! into nested `cluster_` subgraphs, leaves into nodes named by their key
//! path, and edges that end at a scope are routed to a member leaf and
//! clipped at the cluster border (`compound=true`).
//!
//! # Module Structure
//!
//! - [`dot`]: DOT text builder
//! - [`format`]: `{name}` label templates
//! - `render`: view to DOT conversion

pub mod dot;
pub mod format;
mod render;

use hiearch_core::{Model, Result};
use tracing::debug;

pub use dot::DotBuilder;
pub use format::{Substitutions, format_label};
pub use render::render_view;

/// A rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub id: String,
    pub dot: String,
}

/// Render every non-empty view of `model`, in id order.
pub fn render_model(model: &Model) -> Result<Vec<RenderedView>> {
    model
        .non_empty_views()
        .map(|view| {
            let dot = render_view(view, &model.graph)?;
            debug!(view = %view.id, bytes = dot.len(), "view rendered");
            Ok(RenderedView {
                id: view.id.clone(),
                dot,
            })
        })
        .collect()
}
