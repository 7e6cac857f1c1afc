//! Gameplay error types

use std::path::PathBuf;

use thiserror::Error;

use crate::pile::PileId;

/// Errors surfaced by the gameplay core. None of them are fatal; callers log
/// and carry on with the previous state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("mine hit count {hits} exceeds the limit of {max} (reinforced: {reinforced})")]
    InvalidHitCount { hits: u8, max: u8, reinforced: bool },

    #[error("missing collaborator {name}: {detail}")]
    MissingCollaborator { name: &'static str, detail: String },

    #[error("dig rate must be a positive finite number, got {0}")]
    InvalidDigRate(f32),

    #[error("no pile with id {0}")]
    UnknownPile(PileId),
}

/// Errors from loading a [`crate::config::GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
