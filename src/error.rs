//! Typed errors raised while assembling a configuration.

use crate::pattern::PatternError;

/// Errors detected when a configuration is compiled, before any checking
/// runs. All of them are fatal to `check()`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("duplicate slicing name: {0}")]
    DuplicateSlicing(String),

    #[error("constraint refers to unknown slicing: {0}")]
    UnknownSlicing(String),

    #[error("slice '{0}' appears in more than one layer")]
    DuplicateLayerMember(String),

    #[error("layering constraint for slicing '{0}' declares no layers")]
    EmptyLayering(String),

    #[error("invalid configuration file {path}: {message}")]
    InvalidConfigFile { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
