use srl_core::{
    env::{Env, EnvironmentDescription, SnapShot},
    error::EnvError,
};

pub const SLIP: usize = 0;
pub const ADVANCE: usize = 1;

/// Deterministic corridor of `n_states` cells. `ADVANCE` moves one cell forward, `SLIP` sends the
/// agent back to the start. Entering the last cell is the only rewarding transition and ends the
/// episode.
#[derive(Debug, Clone)]
pub struct ChainEnv {
    n_states: usize,
    goal_reward: f64,
    position: Option<usize>,
}

impl ChainEnv {
    pub fn new(n_states: usize) -> Self {
        assert!(n_states >= 2, "a chain needs at least two states");
        Self {
            n_states,
            goal_reward: 1.,
            position: None,
        }
    }

    pub fn with_goal_reward(mut self, goal_reward: f64) -> Self {
        self.goal_reward = goal_reward;
        self
    }
}

impl Env for ChainEnv {
    fn reset(&mut self, _seed: u64) -> Result<usize, EnvError> {
        self.position = Some(0);
        Ok(0)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot, EnvError> {
        let position = self.position.ok_or(EnvError::NotReset)?;
        let next = match action {
            SLIP => 0,
            ADVANCE => usize::min(position + 1, self.n_states - 1),
            _ => return Err(EnvError::InvalidAction { action, n_actions: 2 }),
        };
        let terminated = next == self.n_states - 1;
        self.position = Some(next);
        Ok(SnapShot {
            state: next,
            reward: if terminated { self.goal_reward } else { 0. },
            terminated,
            truncated: false,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::discrete(self.n_states, 2)
    }

    fn success_reward(&self) -> Option<f64> {
        Some(self.goal_reward)
    }
}
