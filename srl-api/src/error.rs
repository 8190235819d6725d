use srl_core::error::EnvError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Rejected before a run starts, never partially applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("`{name}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("`{name}` must be a finite number")]
    NotFinite { name: &'static str },
    #[error("the environment defines no success reward and none was configured")]
    MissingSuccessReward,
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("config file {0} must end in .toml or .json")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to encode model: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode model: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}

/// A failed run. There is no partial result to recover: retrying means starting a fresh run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("environment failure: {0}")]
    Env(#[from] EnvError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
