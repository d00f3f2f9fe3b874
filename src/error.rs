//! Error taxonomy for the generation pipeline.
//!
//! Every variant is fatal: partial, silently-incomplete API documentation is
//! worse than a hard failure, so the first error aborts the whole build. The
//! pipeline entry points wrap these with `anyhow` context; components return
//! them directly.

use thiserror::Error;

use crate::compound::CompoundKind;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Malformed user configuration, detected before any node is built.
    #[error("configuration error in `{option}` at index {index}: {message}")]
    Configuration {
        /// Name of the configuration option holding the bad value.
        option: &'static str,
        /// Index of the offending item within the option's collection.
        index: usize,
        message: String,
    },

    /// Unmatched template brackets in a compound name. Names come from the
    /// external parser, so this indicates a parser bug or an unsupported
    /// C++ construct.
    #[error("cannot tokenize `{name}`: {reason} (offending segment `{offending}`)")]
    Tokenize {
        name: String,
        reason: String,
        offending: String,
    },

    /// A token tree handed to `join` whose first element is not the
    /// untemplated name prefix.
    #[error("invalid token tree: the first element must be the untemplated name prefix")]
    InvalidTokenTree,

    /// Two ancestor candidates matched a qualifying prefix of equal length.
    #[error(
        "ambiguous ancestor for {kind} `{name}`: both `{first}` and `{second}` \
         match the qualifying prefix"
    )]
    AmbiguousAncestor {
        kind: CompoundKind,
        name: String,
        first: String,
        second: String,
    },

    /// Two distinct nodes derived the same link name or output file name.
    /// This is an internal invariant violation, not a configuration problem.
    #[error("{what} collision: `{value}` derived for both `{first}` and `{second}`")]
    IdentityCollision {
        what: &'static str,
        value: String,
        first: String,
        second: String,
    },
}

impl GenerationError {
    pub(crate) fn configuration(
        option: &'static str,
        index: usize,
        message: impl Into<String>,
    ) -> Self {
        GenerationError::Configuration {
            option,
            index,
            message: message.into(),
        }
    }
}
