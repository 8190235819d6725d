pub mod agents;
pub mod env;
pub mod error;
pub mod evaluation;
pub mod exploration;
pub mod hooks;
pub mod metrics;
pub mod rng;
pub mod system;
pub mod training;
pub mod value_table;

use crate::{error::EnvError, training::TrainingSeries};

/// A learning algorithm. The episodic SARSA `TrainingLoop` is the one implementor; it owns its
/// environment, agent and hooks for the duration of a run.
pub trait Algorithm {
    fn train(&mut self) -> Result<TrainingSeries, EnvError>;
}
