//! Error types for isodecl core.

use thiserror::Error;

/// Result type for isodecl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building declarations.
///
/// Resolution misses and ambiguous rewrites are not errors: the specifier is
/// left as written.
#[derive(Debug, Error)]
pub enum Error {
    /// The transformer reported diagnostics for a module.
    #[error("Failed to transform {id}: {message}")]
    Transform {
        /// Path of the module being transformed.
        id: String,
        /// First diagnostic reported by the transformer.
        message: String,
    },

    /// Declaration text produced for a module could not be parsed.
    #[error("Failed to parse declaration for {id}: {message}")]
    Parse {
        /// Path of the module whose declaration failed to parse.
        id: String,
        /// First parser diagnostic.
        message: String,
    },

    /// The naming template has no `[name]` placeholder.
    #[error("Invalid name template {template:?}: must contain [name]")]
    InvalidTemplate {
        /// The rejected template.
        template: String,
    },

    /// Write mode was requested without an output directory.
    #[error("An output directory is required when write is enabled")]
    MissingOutDir,

    /// An include/exclude pattern is not a valid regular expression.
    #[error("Invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Configuration is invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a configuration problem detected before any
    /// module is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidTemplate { .. }
                | Error::MissingOutDir
                | Error::InvalidPattern { .. }
                | Error::InvalidConfig { .. }
        )
    }
}
