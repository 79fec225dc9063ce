//! Error types for Horizon Trellis.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for Horizon Trellis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of a view's registries an id collision happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    /// The child view registry.
    View,
    /// The element registry.
    Element,
    /// The model adapter registry.
    Model,
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => f.write_str("view"),
            Self::Element => f.write_str("element"),
            Self::Model => f.write_str("model"),
        }
    }
}

/// Errors surfaced synchronously by the composition layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A view was requested under a name the dispatcher does not know.
    #[error("View not found: '{name}'")]
    ViewNotFound { name: String },

    /// A child was registered under an id that is already taken.
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateChildId { kind: ChildKind, id: String },

    /// An operation needs a collaborator the dispatcher was built without.
    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: &'static str },

    /// Configuration could not be parsed or validated.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a view-not-found error.
    pub fn view_not_found(name: impl Into<String>) -> Self {
        Self::ViewNotFound { name: name.into() }
    }

    /// Create a duplicate-child error.
    pub fn duplicate_child(kind: ChildKind, id: impl Into<String>) -> Self {
        Self::DuplicateChildId {
            kind,
            id: id.into(),
        }
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(service: &'static str) -> Self {
        Self::ServiceUnavailable { service }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::view_not_found("missing").to_string(),
            "View not found: 'missing'"
        );
        assert_eq!(
            Error::duplicate_child(ChildKind::Element, "title").to_string(),
            "Duplicate element id 'title'"
        );
    }

    #[test]
    fn test_io_source() {
        use std::error::Error as _;

        let err = Error::io(
            "trellis.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
    }
}
