use crate::params::{Hyperparameters, RunMode};
use srl_core::{
    env::{Env, EnvironmentDescription, SnapShot},
    error::EnvError,
};
use srl_envs::chain::ChainEnv;

/// The smallest parameter set validation accepts.
pub fn fast_params() -> Hyperparameters {
    Hyperparameters {
        training_runs: 100,
        max_steps_per_episode: 50,
        test_episodes: 10,
        mode: RunMode::User,
        ..Default::default()
    }
}

/// Parameters under which SARSA solves a short chain.
pub fn chain_params() -> Hyperparameters {
    Hyperparameters {
        alpha: 0.5,
        gamma: 0.9,
        eps: 1.0,
        eps_decay: 0.995,
        eps_min: 0.01,
        training_runs: 2000,
        max_steps_per_episode: 50,
        test_episodes: 100,
        mode: RunMode::User,
    }
}

/// A chain that starts failing once it has been reset `fail_after_resets` times.
pub struct FailingEnv {
    inner: ChainEnv,
    resets: usize,
    fail_after_resets: usize,
}

impl FailingEnv {
    pub fn new(n_states: usize, fail_after_resets: usize) -> Self {
        Self {
            inner: ChainEnv::new(n_states),
            resets: 0,
            fail_after_resets,
        }
    }
}

impl Env for FailingEnv {
    fn reset(&mut self, seed: u64) -> Result<usize, EnvError> {
        self.resets += 1;
        if self.resets > self.fail_after_resets {
            return Err(EnvError::Backend("simulator went away".into()));
        }
        self.inner.reset(seed)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot, EnvError> {
        self.inner.step(action)
    }

    fn env_description(&self) -> EnvironmentDescription {
        self.inner.env_description()
    }

    fn success_reward(&self) -> Option<f64> {
        self.inner.success_reward()
    }
}
