//! Command-line options shared by the binary and the library entry point.

use clap::Args;

/// Output format that only writes the DOT sources.
pub const DOT_SOURCE_FORMAT: &str = "gv";

/// Where and how rendered views are written.
#[derive(Args, Debug, Clone)]
pub struct OutputOptions {
    /// Output directory
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "hiearch")]
    pub dir: String,

    /// Output format passed to `dot -T`; `gv` writes DOT sources only
    #[arg(short = 'f', long = "format", value_name = "FORMAT", default_value = "svg")]
    pub format: String,

    /// Also write the resolved views as JSON to this file
    #[arg(long = "dump-json", value_name = "FILE")]
    pub dump_json: Option<String>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: "hiearch".to_string(),
            format: "svg".to_string(),
            dump_json: None,
        }
    }
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_dump_json(mut self, path: Option<String>) -> Self {
        self.dump_json = path;
        self
    }

    /// Whether `dot` has to run after the sources are written.
    pub fn needs_dot(&self) -> bool {
        self.format != DOT_SOURCE_FORMAT
    }
}
