//! Input discovery: explicit files plus YAML files found under directories.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{debug, info};

use hiearch_core::{Error, Result};

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

fn is_input_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Walk `dir` for input files, sorted by path.
fn walk_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(dir);
    builder.standard_filters(true).follow_links(false);

    let mut found = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|e| {
            io::Error::other(format!("Failed to walk directory {}: {e}", dir.display()))
        })?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if is_input_file(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Resolve command-line inputs into the ordered list of files to load.
///
/// Files are taken as given, in order; a directory contributes its YAML
/// files in sorted order at its position. A path listed twice is loaded once.
pub fn discover_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let discovery_start = Instant::now();
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        let candidates = if path.is_dir() {
            walk_dir(path)?
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(Error::file_not_found(input.clone()).with_operation("discovery::discover_inputs"));
        };

        for file in candidates {
            if seen.insert(file.clone()) {
                debug!(path = %file.display(), "input discovered");
                files.push(file);
            }
        }
    }

    info!(
        "File discovery: {:.2}s ({} files)",
        discovery_start.elapsed().as_secs_f64(),
        files.len()
    );

    if files.is_empty() {
        return Err(Error::invalid_argument(
            "No input files found. Check that the directories contain .yaml or .yml files.",
        ));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_extensions_are_recognized() {
        assert!(is_input_file(Path::new("a/arch.yaml")));
        assert!(is_input_file(Path::new("arch.YML")));
        assert!(!is_input_file(Path::new("arch.json")));
        assert!(!is_input_file(Path::new("yaml")));
    }
}
