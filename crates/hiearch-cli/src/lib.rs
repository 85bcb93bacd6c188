//! hiearch command-line interface.
//!
pub mod discovery;
pub mod input;
pub mod options;
pub mod output;

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use hiearch_core::{Model, ModelBuilder, Result};

pub use options::OutputOptions;

/// Options for running hiearch.
#[derive(Debug, Clone, Default)]
pub struct HiearchOptions {
    /// Input files and directories, in load order.
    pub inputs: Vec<String>,
    pub output: OutputOptions,
}

/// Load and resolve every input.
pub fn resolve_inputs(inputs: &[String]) -> Result<Model> {
    let files = discovery::discover_inputs(inputs)?;

    let load_start = Instant::now();
    let mut builder = ModelBuilder::new();
    input::load_all(&mut builder, &files)?;
    info!("Loading: {:.2}s", load_start.elapsed().as_secs_f64());

    builder.build()
}

/// Main entry point: resolve the inputs and write every view. Returns the
/// files written.
pub fn run_main(opts: &HiearchOptions) -> Result<Vec<PathBuf>> {
    let model = resolve_inputs(&opts.inputs)?;
    output::generate_output(&opts.output, &model)
}
