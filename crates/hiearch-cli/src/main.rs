use std::time::Instant;

use clap::Parser;

use hiearch::{HiearchOptions, OutputOptions, run_main};
use hiearch_core::Result;

#[derive(Parser, Debug)]
#[command(
    name = "hiearch",
    about = "hiearch: hierarchical architecture diagrams from YAML",
    version
)]
pub struct Cli {
    /// Input files or directories, loaded in order
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    inputs: Vec<String>,

    #[command(flatten)]
    output: OutputOptions,
}

pub fn run(args: Cli) -> Result<()> {
    let total_start = Instant::now();

    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let opts = HiearchOptions {
        inputs: args.inputs,
        output: args.output,
    };

    match run_main(&opts) {
        Ok(written) => {
            for path in &written {
                tracing::info!(path = %path.display(), "output written");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "execution failed");
            return Err(e);
        }
    }

    let total_secs = total_start.elapsed().as_secs_f64();
    tracing::info!(total_secs, "complete");
    Ok(())
}

pub fn main() -> Result<()> {
    let args = Cli::parse();
    run(args)
}
