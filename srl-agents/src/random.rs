use rand::rngs::StdRng;
use srl_core::{
    agents::{Agent, Exploration, Transition},
    env::{Discrete, EnvironmentDescription},
    rng::seeded_rng,
};

/// Baseline that acts uniformly at random and never learns.
pub struct RandomAgent {
    observation_space: Discrete,
    action_space: Discrete,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(env_description: &EnvironmentDescription, seed: Option<u64>) -> Self {
        Self {
            observation_space: env_description.observation_space,
            action_space: env_description.action_space,
            rng: seeded_rng(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, state: usize, _exploration: Exploration) -> usize {
        assert!(
            self.observation_space.contains(state),
            "state {state} is outside of the state space of size {}",
            self.observation_space.size()
        );
        self.action_space.sample(&mut self.rng)
    }

    fn learn(&mut self, _transition: &Transition) -> f64 {
        0.
    }

    fn decay_exploration(&mut self) {}
}
