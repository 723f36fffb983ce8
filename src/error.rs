//! Error types for diagram loading and settings persistence.

use std::io;
use thiserror::Error;

/// A persisted waypoint chain that cannot be rebuilt.
///
/// `index` is the position of the offending record in chain order, counting the start
/// anchor as 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("node {index}: unrecognised next node kind '{tag}'")]
    UnknownKind { index: usize, tag: String },

    #[error("node {index}: has a next node but no nextType")]
    MissingKind { index: usize },

    #[error("node {index}: termination node is followed by another node")]
    MisplacedTerminal { index: usize },

    #[error("chain has a start node but no end node")]
    MissingEnd,

    #[error("node {index}: chain ends on an intermediate node")]
    Unterminated { index: usize },
}

/// Errors raised while loading or saving a diagram document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("association {id} is malformed: {source}")]
    MalformedAssociation {
        id: u64,
        #[source]
        source: ChainError,
    },

    #[error("element id {0} is used more than once")]
    DuplicateId(u64),
}

/// Errors that can occur while reading or writing application settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
