//! DOT text builder.

use std::fmt::Write;

/// Escape a string for use inside a double-quoted DOT string.
///
/// Backslashes are left alone so that label escapes such as `\l` reach
/// graphviz untouched.
pub fn escape(input: &str) -> String {
    input.replace('"', "\\\"").replace('\n', "\\n")
}

/// Write indentation to output.
pub fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

fn write_attr_list(output: &mut String, attrs: &[(String, String)]) {
    output.push('[');
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        let _ = write!(output, "{}=\"{}\"", key, escape(value));
    }
    output.push(']');
}

/// Name of the cluster subgraph drawn for the scope at `key_path`.
pub fn cluster_name(key_path: &str) -> String {
    format!("cluster_{key_path}")
}

/// A DOT graph builder for constructing valid DOT output.
pub struct DotBuilder {
    output: String,
    indent: usize,
}

impl DotBuilder {
    /// Create a new directed graph with the given name.
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "digraph \"{}\" {{", escape(name));
        Self { output, indent: 1 }
    }

    /// Add a graph attribute.
    pub fn attr(&mut self, key: &str, value: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{}=\"{}\";", key, escape(value));
        self
    }

    /// Set default attributes for `kind` (`node` or `edge`).
    pub fn defaults(&mut self, kind: &str, attrs: &[(String, String)]) -> &mut Self {
        if attrs.is_empty() {
            return self;
        }
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{kind} ");
        write_attr_list(&mut self.output, attrs);
        self.output.push_str(";\n");
        self
    }

    /// Add a node.
    pub fn node(&mut self, id: &str, attrs: &[(String, String)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "\"{}\"", escape(id));
        if !attrs.is_empty() {
            self.output.push(' ');
            write_attr_list(&mut self.output, attrs);
        }
        self.output.push_str(";\n");
        self
    }

    /// Add an edge.
    pub fn edge(&mut self, from: &str, to: &str, attrs: &[(String, String)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "\"{}\" -> \"{}\"", escape(from), escape(to));
        if !attrs.is_empty() {
            self.output.push(' ');
            write_attr_list(&mut self.output, attrs);
        }
        self.output.push_str(";\n");
        self
    }

    /// Start a cluster subgraph for the scope at `key_path`.
    pub fn start_cluster(&mut self, key_path: &str, attrs: &[(String, String)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "subgraph \"{}\" {{", escape(&cluster_name(key_path)));
        self.indent += 1;
        for (key, value) in attrs {
            self.attr(key, value);
        }
        self
    }

    /// End the current cluster subgraph.
    pub fn end_cluster(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        write_indent(&mut self.output, self.indent);
        self.output.push_str("}\n");
        self
    }

    /// Finish building and return the DOT string.
    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builds_nested_clusters() {
        let mut dot = DotBuilder::new("arch");
        dot.attr("compound", "true")
            .defaults("node", &pairs(&[("shape", "box")]))
            .start_cluster("sys", &pairs(&[("label", "System"), ("cluster", "true")]))
            .node("sys.db", &pairs(&[("label", "DB")]))
            .end_cluster()
            .edge("client", "sys.db", &[]);

        assert_eq!(
            dot.build(),
            "digraph \"arch\" {\n  compound=\"true\";\n  node [shape=\"box\"];\n  \
             subgraph \"cluster_sys\" {\n    label=\"System\";\n    cluster=\"true\";\n    \
             \"sys.db\" [label=\"DB\"];\n  }\n  \"client\" -> \"sys.db\";\n}\n"
        );
    }

    #[test]
    fn quotes_are_escaped_and_backslashes_kept() {
        assert_eq!(escape("say \"hi\"\\l"), "say \\\"hi\\\"\\l");
        assert_eq!(escape("two\nlines"), "two\\nlines");
    }

    #[test]
    fn empty_defaults_are_skipped() {
        let mut dot = DotBuilder::new("g");
        dot.defaults("edge", &[]);
        assert_eq!(dot.build(), "digraph \"g\" {\n}\n");
    }
}
