//! Output generation: DOT sources, rendered images and the JSON dump.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info};

use hiearch_core::{Error, ErrorKind, Model, Result};
use hiearch_dot::{RenderedView, render_model};

use crate::options::OutputOptions;

/// Run `dot -T<format>` on `source`, writing `target`.
fn run_dot(format: &str, source: &Path, target: &Path) -> Result<()> {
    let output = Command::new("dot")
        .arg(format!("-T{format}"))
        .arg("-o")
        .arg(target)
        .arg(source)
        .output()
        .map_err(|e| {
            Error::from(e)
                .with_operation("output::run_dot")
                .with_context("path", source.display().to_string())
        })?;

    if !output.status.success() {
        return Err(Error::new(
            ErrorKind::IoFailed,
            format!(
                "dot exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        )
        .with_operation("output::run_dot")
        .with_context("path", source.display().to_string()));
    }
    Ok(())
}

/// Write one view's DOT source and, unless only sources were requested,
/// its rendering. Returns the files written.
pub fn write_view(opts: &OutputOptions, view: &RenderedView) -> Result<Vec<PathBuf>> {
    let dir = Path::new(&opts.dir);
    let source = dir.join(format!("{}.gv", view.id));
    fs::write(&source, &view.dot)
        .map_err(|e| Error::from(e).with_context("path", source.display().to_string()))?;
    debug!(path = %source.display(), "dot source written");

    let mut written = vec![source.clone()];
    if opts.needs_dot() {
        let target = dir.join(format!("{}.{}", view.id, opts.format));
        run_dot(&opts.format, &source, &target)?;
        written.push(target);
    }
    Ok(written)
}

/// Write the resolved views as pretty JSON.
pub fn dump_json(path: &Path, model: &Model) -> Result<()> {
    let json = serde_json::to_string_pretty(&model.views)
        .map_err(|e| Error::unexpected(e.to_string()).set_source(e))?;
    fs::write(path, json)
        .map_err(|e| Error::from(e).with_context("path", path.display().to_string()))?;
    info!(path = %path.display(), "resolved views written");
    Ok(())
}

/// Render every non-empty view of `model` into `opts.dir`.
pub fn generate_output(opts: &OutputOptions, model: &Model) -> Result<Vec<PathBuf>> {
    let render_start = Instant::now();
    fs::create_dir_all(&opts.dir)
        .map_err(|e| Error::from(e).with_context("path", opts.dir.clone()))?;

    let mut written = Vec::new();
    for view in render_model(model)? {
        written.extend(write_view(opts, &view)?);
    }

    if let Some(path) = &opts.dump_json {
        dump_json(Path::new(path), model)?;
        written.push(PathBuf::from(path));
    }

    info!(
        "Rendering: {:.2}s ({} files)",
        render_start.elapsed().as_secs_f64(),
        written.len()
    );
    Ok(written)
}
