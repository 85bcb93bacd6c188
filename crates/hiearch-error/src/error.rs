//! The main Error type for hiearch.

use crate::ErrorKind;
use std::fmt;

/// Unified error type for all hiearch operations.
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the operation that caused this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Look up the first context value recorded under `key`.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the source error (if any).
    pub fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at {}", self.kind, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::new(ErrorKind::Unexpected, msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::new(ErrorKind::Unexpected, msg)
    }
}

impl Error {
    /// Create an Unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a ParseFailed error
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    /// Create an InvalidRecord error for the record `id` of the given kind.
    pub fn invalid_record(kind: &str, id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRecord, message)
            .with_context("kind", kind)
            .with_context("id", id)
    }

    /// Create a DuplicateId error
    pub fn duplicate_id(kind: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(ErrorKind::DuplicateId, format!("duplicate {kind} id '{id}'"))
            .with_context("kind", kind)
            .with_context("id", id)
    }

    /// Create a MissingReference error
    pub fn missing_reference(kind: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(
            ErrorKind::MissingReference,
            format!("missing {kind} id '{id}'"),
        )
        .with_context("kind", kind)
        .with_context("id", id)
    }

    /// Create a DuplicateScope error
    pub fn duplicate_scope(node: impl Into<String>, scopes: &[String]) -> Self {
        let node = node.into();
        Self::new(
            ErrorKind::DuplicateScope,
            format!("node '{node}' lists a scope more than once"),
        )
        .with_context("id", node)
        .with_context("scopes", scopes.join(", "))
    }

    /// Create a DuplicateViewNode error
    pub fn duplicate_view_node(view: impl Into<String>, nodes: &[String]) -> Self {
        let view = view.into();
        Self::new(
            ErrorKind::DuplicateViewNode,
            format!("view '{view}' lists a node more than once"),
        )
        .with_context("id", view)
        .with_context("nodes", nodes.join(", "))
    }

    /// Create a StyleCycle error naming every entity left unresolved.
    pub fn style_cycle<S: AsRef<str>>(kind: &str, unresolved: &[S]) -> Self {
        let ids: Vec<&str> = unresolved.iter().map(|s| s.as_ref()).collect();
        Self::new(
            ErrorKind::StyleCycle,
            format!("{kind} style cycle detected"),
        )
        .with_context("kind", kind)
        .with_context("ids", ids.join(", "))
    }

    /// Create a ScopeCycle error carrying the branch walked so far.
    pub fn scope_cycle<S: AsRef<str>>(branch: &[S], id: impl Into<String>) -> Self {
        let path: Vec<&str> = branch.iter().map(|s| s.as_ref()).collect();
        let id = id.into();
        Self::new(
            ErrorKind::ScopeCycle,
            format!("scope '{id}' already appears in its own branch"),
        )
        .with_context("id", id)
        .with_context("branch", path.join(" -> "))
    }

    /// Create an UnsupportedPolicy error
    pub fn unsupported_policy(policy: impl Into<String>, allowed: &[&str]) -> Self {
        let policy = policy.into();
        Self::new(
            ErrorKind::UnsupportedPolicy,
            format!(
                "unsupported policy '{policy}', must be one of [{}]",
                allowed.join(", ")
            ),
        )
        .with_context("policy", policy)
    }

    /// Create a MalformedExpand error
    pub fn malformed_expand(view: impl Into<String>) -> Self {
        let view = view.into();
        Self::new(
            ErrorKind::MalformedExpand,
            format!("expand field in view '{view}' must be a list of policies"),
        )
        .with_context("id", view)
    }

    /// Create an EmptyViews error
    pub fn empty_views<S: AsRef<str>>(views: &[S]) -> Self {
        let ids: Vec<&str> = views.iter().map(|s| s.as_ref()).collect();
        Self::new(ErrorKind::EmptyViews, "all views are empty")
            .with_context("views", ids.join(", "))
    }

    /// Create a FormatFailed error
    pub fn format_failed(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FormatFailed, message).with_context("template", template)
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorKind::FileNotFound,
            format!("file '{}' not found", path),
        )
        .with_context("path", path)
    }
}
