//! Error kinds for hiearch operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Users can match on ErrorKind to tell input mistakes apart from
/// environment failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid argument passed to a function or on the command line
    InvalidArgument,

    // =========================================================================
    // Input errors
    // =========================================================================
    /// Failed to parse an input document
    ParseFailed,

    /// A record is structurally invalid (wrong link arity, conflicting styles)
    InvalidRecord,

    /// Same id registered twice within one entity kind
    DuplicateId,

    /// A referenced style, scope, endpoint or view node was never defined
    MissingReference,

    /// Duplicate entries inside a node's scope list
    DuplicateScope,

    /// Duplicate entries inside a view's node list
    DuplicateViewNode,

    // =========================================================================
    // Resolution errors
    // =========================================================================
    /// The style-inheritance graph contains a cycle
    StyleCycle,

    /// A containment chain revisits a node already in its own branch
    ScopeCycle,

    /// Unrecognized neighbour-selection or expansion policy
    UnsupportedPolicy,

    /// An expansion specification is not a well-formed list
    MalformedExpand,

    /// Every view resolved to an empty node set
    EmptyViews,

    // =========================================================================
    // Rendering errors
    // =========================================================================
    /// A label template could not be expanded
    FormatFailed,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error was caused by the input documents rather than the
    /// environment.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            ErrorKind::Unexpected
                | ErrorKind::InvalidArgument
                | ErrorKind::FileNotFound
                | ErrorKind::PermissionDenied
                | ErrorKind::IoFailed
        )
    }
}
