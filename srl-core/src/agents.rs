use crate::value_table::QTable;
use serde::{Deserialize, Serialize};

/// Whether action selection may explore. Evaluation suppresses exploration without touching the
/// agent's stored exploration rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exploration {
    Enabled,
    Suppressed,
}

/// The unit consumed by an on-policy update: `next_action` is the action that will actually be
/// taken from `next_state`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: usize,
    pub action: usize,
    pub reward: f64,
    pub next_state: usize,
    pub next_action: usize,
    pub done: bool,
}

pub trait Agent {
    /// Picks an action for `state`. Panics when `state` is outside of the agent's state space.
    fn select_action(&mut self, state: usize, exploration: Exploration) -> usize;

    /// Learns from one transition and returns the signed TD error.
    fn learn(&mut self, transition: &Transition) -> f64;

    /// Advances the exploration schedule by one episode.
    fn decay_exploration(&mut self);

    fn reset_episode(&mut self) {}

    /// Current exploration rate, if the agent has one.
    fn exploration_rate(&self) -> Option<f64> {
        None
    }

    /// The learned table, if the agent keeps one.
    fn value_table(&self) -> Option<&QTable> {
        None
    }
}
