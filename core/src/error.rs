//! Error types for grammar construction, settings loading and value retrieval.
//!
//! Parse-time diagnostics are not represented here: they are collected as
//! [`ParseError`](crate::ParseError) values on the parse result and never
//! surface as Rust errors.

use thiserror::Error;

use crate::SymbolId;

/// Programmer errors raised while building a [`SymbolTree`](crate::SymbolTree).
///
/// These are returned immediately from the construction methods; they are
/// never collected into a parse result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Alias is empty, whitespace-only, or contains embedded whitespace.
    #[error("invalid alias '{0}': aliases must be non-empty and contain no whitespace")]
    InvalidAlias(String),
    /// A symbol was declared without any alias.
    #[error("symbol must define at least one alias")]
    NoAliases,
    /// Arity minimum is larger than its maximum.
    #[error("invalid arity: minimum {minimum} exceeds maximum {maximum}")]
    InvalidArity { minimum: usize, maximum: usize },
    /// Attaching the command would make it its own ancestor.
    #[error("command '{0}' cannot be its own ancestor")]
    Cycle(String),
    /// Children can only be added to commands.
    #[error("symbol '{0}' is not a command")]
    NotACommand(String),
    /// An id that does not belong to this tree.
    #[error("unknown symbol id {0:?}")]
    UnknownSymbol(SymbolId),
    /// Implicit option arguments cannot be attached on their own.
    #[error("argument '{0}' belongs to an option and cannot be attached to a command")]
    OptionArgument(String),
    /// A textual default does not convert to the declared value type.
    #[error("default value '{value}' of '{symbol}' is not a valid {expected}")]
    InvalidDefault {
        symbol: String,
        value: String,
        expected: &'static str,
    },
}

/// Errors raised when a typed value is requested from a parse result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The node carries a parser, conversion or validation error.
    #[error("{message}")]
    Invalid { symbol: String, message: String },
    /// A required value was never supplied and has no default.
    #[error("required value missing for '{0}'")]
    RequiredMissing(String),
    /// The produced value cannot be read as the requested type.
    #[error("value of '{symbol}' cannot be read as {expected}")]
    TypeMismatch {
        symbol: String,
        expected: &'static str,
    },
    /// No symbol with this name on the parsed command path.
    #[error("no symbol named '{0}' on the parsed command path")]
    UnknownName(String),
    /// Commands do not carry values.
    #[error("'{0}' is a command and has no value")]
    NotAValue(String),
}

/// Errors from loading settings or grammar definition files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file extension is neither JSON nor YAML.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The definition describes an invalid symbol tree.
    #[error("invalid grammar definition: {0}")]
    Definition(#[from] DefinitionError),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
