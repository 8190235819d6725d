use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use srl_agents::sarsa::SarsaConfig;
use std::{fmt, fs, path::Path, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    User,
    /// Replaces every user supplied value with a preset tuned for Taxi.
    Optimized,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "optimized" => Ok(Self::Optimized),
            other => Err(format!("unknown mode `{other}`, expected `user` or `optimized`")),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Optimized => write!(f, "optimized"),
        }
    }
}

/// Inputs of one run. Fixed once the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub alpha: f64,
    pub gamma: f64,
    pub eps: f64,
    pub eps_decay: f64,
    pub eps_min: f64,
    pub training_runs: usize,
    pub max_steps_per_episode: usize,
    pub test_episodes: usize,
    pub mode: RunMode,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.99,
            eps: 1.0,
            eps_decay: 0.995,
            eps_min: 0.01,
            training_runs: 1000,
            max_steps_per_episode: 200,
            test_episodes: 100,
            mode: RunMode::User,
        }
    }
}

impl Hyperparameters {
    pub fn optimized() -> Self {
        Self {
            alpha: 0.12,
            gamma: 0.99,
            eps: 1.0,
            eps_decay: 0.9995,
            eps_min: 0.001,
            training_runs: 6000,
            max_steps_per_episode: 200,
            test_episodes: 250,
            mode: RunMode::Optimized,
        }
    }

    /// The parameter set a run actually uses. The optimized preset substitutes the whole set at
    /// once, nothing of the user input survives it.
    pub fn resolve(self) -> Self {
        match self.mode {
            RunMode::User => self,
            RunMode::Optimized => Self::optimized(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("alpha", self.alpha, 0.001, 1.)?;
        check_range("gamma", self.gamma, 0.1, 1.)?;
        check_range("eps", self.eps, 0., 1.)?;
        check_range("eps_decay", self.eps_decay, 0.9, 1.)?;
        check_range("eps_min", self.eps_min, 0., 0.5)?;
        check_range("training_runs", self.training_runs as f64, 100., 10_000.)?;
        check_range(
            "max_steps_per_episode",
            self.max_steps_per_episode as f64,
            50.,
            1000.,
        )?;
        check_range("test_episodes", self.test_episodes as f64, 10., 1000.)?;
        Ok(())
    }

    pub fn sarsa_config(&self) -> SarsaConfig {
        SarsaConfig {
            alpha: self.alpha,
            gamma: self.gamma,
            epsilon: self.eps,
            epsilon_decay: self.eps_decay,
            epsilon_min: self.eps_min,
        }
    }

    /// Reads a parameter file, TOML or JSON depending on the extension. Missing keys take their
    /// defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
