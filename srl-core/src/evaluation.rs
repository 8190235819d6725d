use crate::{
    agents::{Agent, Exploration},
    env::{Env, episode_seed},
    error::EnvError,
    metrics::{mean, mean_steps, success_rate},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub episode_rewards: Vec<f64>,
    pub episode_steps: Vec<usize>,
    pub episode_successes: Vec<bool>,
    pub success_rate: f64,
    pub avg_steps: f64,
    pub avg_reward: f64,
}

impl EvaluationSummary {
    pub fn from_episodes(rewards: Vec<f64>, steps: Vec<usize>, successes: Vec<bool>) -> Self {
        Self {
            success_rate: success_rate(&successes),
            avg_steps: mean_steps(&steps),
            avg_reward: mean(&rewards),
            episode_rewards: rewards,
            episode_steps: steps,
            episode_successes: successes,
        }
    }
}

/// Runs episodes with exploration suppressed and without learning. The random baseline goes
/// through the very same loop.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    pub episode_count: usize,
    pub max_steps_per_episode: usize,
    pub success_reward: f64,
    pub seed: Option<u64>,
}

impl Evaluator {
    pub fn new(episode_count: usize, max_steps_per_episode: usize, success_reward: f64) -> Self {
        Self {
            episode_count,
            max_steps_per_episode,
            success_reward,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn evaluate<A: Agent, E: Env>(
        &self,
        agent: &mut A,
        env: &mut E,
    ) -> Result<EvaluationSummary, EnvError> {
        let mut rewards = Vec::with_capacity(self.episode_count);
        let mut steps = Vec::with_capacity(self.episode_count);
        let mut successes = Vec::with_capacity(self.episode_count);
        for episode in 0..self.episode_count {
            agent.reset_episode();
            let mut state = env.reset(episode_seed(self.seed, episode))?;
            let mut total_reward = 0.;
            let mut step_count = 0;
            let mut last_reward = None;
            for _ in 0..self.max_steps_per_episode {
                let action = agent.select_action(state, Exploration::Suppressed);
                let snapshot = env.step(action)?;
                total_reward += snapshot.reward;
                step_count += 1;
                last_reward = Some(snapshot.reward);
                if snapshot.done() {
                    break;
                }
                state = snapshot.state;
            }
            rewards.push(total_reward);
            steps.push(step_count);
            successes.push(last_reward == Some(self.success_reward));
        }
        let summary = EvaluationSummary::from_episodes(rewards, steps, successes);
        debug!(
            episodes = self.episode_count,
            success_rate = summary.success_rate,
            avg_steps = summary.avg_steps,
            avg_reward = summary.avg_reward,
            "evaluation finished"
        );
        Ok(summary)
    }
}
