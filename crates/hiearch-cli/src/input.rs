//! Loading YAML input documents.

use std::fs;
use std::path::Path;

use tracing::info;

use hiearch_core::{Document, Error, ModelBuilder, Result};

fn is_blank(source: &str) -> bool {
    source.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Parse one YAML document. Empty input is an empty document.
pub fn parse_document(source: &str) -> Result<Document> {
    if is_blank(source) {
        return Ok(Document::default());
    }
    serde_yaml::from_str::<Option<Document>>(source)
        .map(Option::unwrap_or_default)
        .map_err(|e| Error::parse_failed(e.to_string()).set_source(e))
}

/// Read and parse the document at `path`.
pub fn load_document(path: &Path) -> Result<Document> {
    let display = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|e| Error::from(e).with_context("path", display.clone()))?;
    parse_document(&source).map_err(|e| e.with_operation("input::load_document").with_context("path", display))
}

/// Load every file into `builder`, in order.
pub fn load_all(builder: &mut ModelBuilder, paths: &[impl AsRef<Path>]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        info!("Processing {}", path.display());
        let document = load_document(path)?;
        builder
            .add_document(document)
            .map_err(|e| e.with_context("path", path.display().to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiearch_core::ErrorKind;

    #[test]
    fn empty_source_is_an_empty_document() {
        assert_eq!(parse_document("").unwrap(), Document::default());
        assert_eq!(parse_document("# nothing yet\n").unwrap(), Document::default());
    }

    #[test]
    fn records_are_parsed() {
        let document = parse_document(
            "nodes:\n  - id: [Api, api]\n    scope: [a, b]\nedges:\n  - link: [api, db, reads]\n",
        )
        .unwrap();
        assert_eq!(document.nodes[0].key(), "api");
        assert_eq!(document.nodes[0].scope_ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(document.edges[0].endpoints().unwrap().2, "reads");
        assert!(document.views.is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_document("nodes: [").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
        let err = parse_document("nodes:\n  - id: just-a-string\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
    }
}
