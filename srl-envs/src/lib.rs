pub mod chain;
pub mod taxi;

use crate::{chain::ChainEnv, taxi::TaxiEnv};
use serde::{Deserialize, Serialize};
use srl_core::{
    env::{Env, EnvironmentDescription, SnapShot},
    error::EnvError,
};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvSpecError {
    #[error("unknown environment `{0}`, expected `taxi`, `chain` or `chain:<n>`")]
    Unknown(String),
    #[error("a chain needs at least two states, got `{0}`")]
    InvalidChainLength(String),
}

/// Names an environment so that every run can build its own fresh instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvSpec {
    #[default]
    Taxi,
    Chain { n_states: usize },
}

impl FromStr for EnvSpec {
    type Err = EnvSpecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "taxi" | "taxi-v3" => Ok(Self::Taxi),
            "chain" => Ok(Self::Chain { n_states: 3 }),
            other => {
                let Some(len) = other.strip_prefix("chain:") else {
                    return Err(EnvSpecError::Unknown(value.to_owned()));
                };
                match len.parse::<usize>() {
                    Ok(n_states) if n_states >= 2 => Ok(Self::Chain { n_states }),
                    _ => Err(EnvSpecError::InvalidChainLength(len.to_owned())),
                }
            }
        }
    }
}

impl fmt::Display for EnvSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taxi => write!(f, "taxi"),
            Self::Chain { n_states } => write!(f, "chain:{n_states}"),
        }
    }
}

pub trait EnvBuilderTrait: Sync + Send + 'static {
    type Env: Env;

    fn build_env(&self) -> Result<Self::Env, EnvError>;
}

impl<E: Env, F: Sync + Send + 'static> EnvBuilderTrait for F
where
    F: Fn() -> Result<E, EnvError>,
{
    type Env = E;

    fn build_env(&self) -> Result<Self::Env, EnvError> {
        (self)()
    }
}

impl EnvBuilderTrait for EnvSpec {
    type Env = EnvKind;

    fn build_env(&self) -> Result<Self::Env, EnvError> {
        Ok(match *self {
            Self::Taxi => EnvKind::Taxi(TaxiEnv::new()),
            Self::Chain { n_states } => EnvKind::Chain(ChainEnv::new(n_states)),
        })
    }
}

pub enum EnvKind {
    Taxi(TaxiEnv),
    Chain(ChainEnv),
}

impl Env for EnvKind {
    fn reset(&mut self, seed: u64) -> Result<usize, EnvError> {
        match self {
            Self::Taxi(env) => env.reset(seed),
            Self::Chain(env) => env.reset(seed),
        }
    }

    fn step(&mut self, action: usize) -> Result<SnapShot, EnvError> {
        match self {
            Self::Taxi(env) => env.step(action),
            Self::Chain(env) => env.step(action),
        }
    }

    fn env_description(&self) -> EnvironmentDescription {
        match self {
            Self::Taxi(env) => env.env_description(),
            Self::Chain(env) => env.env_description(),
        }
    }

    fn success_reward(&self) -> Option<f64> {
        match self {
            Self::Taxi(env) => env.success_reward(),
            Self::Chain(env) => env.success_reward(),
        }
    }
}
