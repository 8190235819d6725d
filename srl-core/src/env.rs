use crate::{error::EnvError, rng::RNG};
use derive_more::Deref;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A finite, zero-indexed space. Both states and actions live in one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deref, Serialize, Deserialize)]
pub struct Discrete(usize);

impl Discrete {
    pub fn new(size: usize) -> Self {
        Self(size)
    }

    pub fn size(&self) -> usize {
        self.0
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx < self.0
    }

    /// Uniform draw from the space.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.random_range(0..self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDescription {
    pub observation_space: Discrete,
    pub action_space: Discrete,
}

impl EnvironmentDescription {
    pub fn new(observation_space: Discrete, action_space: Discrete) -> Self {
        Self {
            observation_space,
            action_space,
        }
    }

    pub fn discrete(n_states: usize, n_actions: usize) -> Self {
        Self::new(Discrete::new(n_states), Discrete::new(n_actions))
    }

    pub fn state_count(&self) -> usize {
        self.observation_space.size()
    }

    pub fn action_count(&self) -> usize {
        self.action_space.size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapShot {
    pub state: usize,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
}

impl SnapShot {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

pub trait Env {
    fn reset(&mut self, seed: u64) -> Result<usize, EnvError>;
    fn step(&mut self, action: usize) -> Result<SnapShot, EnvError>;
    fn env_description(&self) -> EnvironmentDescription;

    /// The terminal reward that marks a successful episode, if the environment has one.
    fn success_reward(&self) -> Option<f64> {
        None
    }
}

/// Seed for the reset of episode `episode`. With a base seed the sequence is reproducible,
/// otherwise the thread local generator decides.
pub fn episode_seed(base_seed: Option<u64>, episode: usize) -> u64 {
    match base_seed {
        Some(seed) => seed.wrapping_add(episode as u64),
        None => RNG.with_borrow_mut(|rng| rng.random()),
    }
}
