use crate::{
    Algorithm,
    agents::{Agent, Exploration, Transition},
    env::{Env, episode_seed},
    error::EnvError,
    hooks::{TrainingHook, TrainingProgress},
    metrics::{TrainingSummary, mean, mean_steps, success_rate, trailing_mean},
    system::{LoadSampler, SystemSample},
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_SAMPLE_INTERVAL: usize = 100;
pub const DEFAULT_REPORT_INTERVAL: usize = 1000;
pub const DEFAULT_TD_ERROR_WINDOW: usize = 1000;
/// Episodes the final success rate, step and reward averages are taken over.
pub const FINAL_EPISODE_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub episode_count: usize,
    pub max_steps_per_episode: usize,
    /// Terminal reward that counts an episode as a success.
    pub success_reward: f64,
    /// A load sample is taken at the start of every `sample_interval`-th episode.
    pub sample_interval: usize,
    /// Hooks hear from the loop every `report_interval` episodes.
    pub report_interval: usize,
    pub td_error_window: usize,
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn new(episode_count: usize, max_steps_per_episode: usize, success_reward: f64) -> Self {
        Self {
            episode_count,
            max_steps_per_episode,
            success_reward,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            td_error_window: DEFAULT_TD_ERROR_WINDOW,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub total_reward: f64,
    pub steps: usize,
    pub success: bool,
    pub mean_abs_td_error: f64,
    /// Exploration rate the episode was played with.
    pub epsilon: Option<f64>,
    pub system_sample: Option<SystemSample>,
    /// Wall-clock seconds since training started, taken when the episode ended.
    pub cumulative_time_secs: f64,
}

/// Raw output of a training run. Records are appended in episode order and never touched again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSeries {
    pub records: Vec<EpisodeRecord>,
    /// Absolute TD error of every update, in order.
    pub td_errors: Vec<f64>,
    pub system_samples: Vec<SystemSample>,
    pub training_time: Duration,
    pub td_error_window: usize,
}

impl TrainingSeries {
    fn with_capacity(episodes: usize, td_error_window: usize) -> Self {
        Self {
            records: Vec::with_capacity(episodes),
            td_error_window,
            ..Default::default()
        }
    }

    pub fn episode_rewards(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.total_reward).collect()
    }

    pub fn episode_steps(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.steps).collect()
    }

    pub fn episode_successes(&self) -> Vec<bool> {
        self.records.iter().map(|r| r.success).collect()
    }

    pub fn cumulative_times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.cumulative_time_secs).collect()
    }

    /// Per-episode mean absolute TD error, in episode order.
    pub fn episode_td_errors(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean_abs_td_error).collect()
    }

    pub fn summary(&self) -> TrainingSummary {
        let (final_success_rate, final_avg_steps, final_avg_reward) =
            window_stats(self.trailing_records(FINAL_EPISODE_WINDOW));
        TrainingSummary {
            final_success_rate,
            final_avg_steps,
            final_avg_reward,
            final_td_error: trailing_mean(&self.td_errors, self.td_error_window),
            total_training_time_secs: self.training_time.as_secs_f64(),
        }
    }

    fn trailing_records(&self, window: usize) -> &[EpisodeRecord] {
        &self.records[self.records.len().saturating_sub(window)..]
    }

    fn progress(&self, total_episodes: usize, window: usize, epsilon: Option<f64>) -> TrainingProgress {
        let (recent_success_rate, recent_avg_steps, recent_avg_reward) =
            window_stats(self.trailing_records(window));
        TrainingProgress {
            episode: self.records.len(),
            total_episodes,
            recent_success_rate,
            recent_avg_steps,
            recent_avg_reward,
            epsilon,
        }
    }
}

/// Success rate, mean steps and mean reward of a run of episodes.
fn window_stats(records: &[EpisodeRecord]) -> (f64, f64, f64) {
    let successes: Vec<bool> = records.iter().map(|r| r.success).collect();
    let steps: Vec<usize> = records.iter().map(|r| r.steps).collect();
    let rewards: Vec<f64> = records.iter().map(|r| r.total_reward).collect();
    (success_rate(&successes), mean_steps(&steps), mean(&rewards))
}

/// Runs `config.episode_count` on-policy episodes. The next action is chosen under the current,
/// possibly still exploring, policy and is the one bootstrapped on and then taken.
pub fn train<A, E, H, S>(
    agent: &mut A,
    env: &mut E,
    config: &TrainingConfig,
    hooks: &mut H,
    load_sampler: &mut S,
) -> Result<TrainingSeries, EnvError>
where
    A: Agent,
    E: Env,
    H: TrainingHook,
    S: LoadSampler,
{
    let start = Instant::now();
    let mut series = TrainingSeries::with_capacity(config.episode_count, config.td_error_window);
    hooks.init_hook(config.episode_count);
    info!(
        episodes = config.episode_count,
        max_steps = config.max_steps_per_episode,
        "training started"
    );

    for episode in 0..config.episode_count {
        let system_sample = (config.sample_interval > 0 && episode % config.sample_interval == 0)
            .then(|| load_sampler.sample());
        let epsilon = agent.exploration_rate();

        agent.reset_episode();
        let mut state = env.reset(episode_seed(config.seed, episode))?;
        let mut action = agent.select_action(state, Exploration::Enabled);
        let mut total_reward = 0.;
        let mut steps = 0;
        let mut last_reward = None;
        let td_start = series.td_errors.len();

        for _ in 0..config.max_steps_per_episode {
            let snapshot = env.step(action)?;
            let next_action = agent.select_action(snapshot.state, Exploration::Enabled);
            let td_error = agent.learn(&Transition {
                state,
                action,
                reward: snapshot.reward,
                next_state: snapshot.state,
                next_action,
                done: snapshot.done(),
            });
            series.td_errors.push(td_error.abs());
            total_reward += snapshot.reward;
            steps += 1;
            last_reward = Some(snapshot.reward);
            if snapshot.done() {
                break;
            }
            state = snapshot.state;
            action = next_action;
        }

        agent.decay_exploration();
        if let Some(sample) = &system_sample {
            debug!(
                episode,
                cpu_percent = sample.cpu_percent,
                memory_mb = sample.memory_mb,
                "system sample"
            );
            series.system_samples.push(sample.clone());
        }
        series.records.push(EpisodeRecord {
            episode,
            total_reward,
            steps,
            success: last_reward == Some(config.success_reward),
            mean_abs_td_error: mean(&series.td_errors[td_start..]),
            epsilon,
            system_sample,
            cumulative_time_secs: start.elapsed().as_secs_f64(),
        });

        if config.report_interval > 0 && (episode + 1) % config.report_interval == 0 {
            let progress = series.progress(
                config.episode_count,
                config.report_interval,
                agent.exploration_rate(),
            );
            hooks.progress_hook(&progress);
        }
    }

    series.training_time = start.elapsed();
    let summary = series.summary();
    info!(
        success_rate = summary.final_success_rate,
        avg_steps = summary.final_avg_steps,
        avg_reward = summary.final_avg_reward,
        secs = summary.total_training_time_secs,
        "training finished"
    );
    hooks.shutdown_hook(&series);
    Ok(series)
}

/// Owns everything one training run needs. The agent stays accessible after `train` so that it
/// can be evaluated or persisted.
pub struct TrainingLoop<E: Env, A: Agent, H: TrainingHook, S: LoadSampler> {
    pub env: E,
    pub agent: A,
    pub hooks: H,
    pub load_sampler: S,
    pub config: TrainingConfig,
}

impl<E: Env, A: Agent, H: TrainingHook, S: LoadSampler> Algorithm for TrainingLoop<E, A, H, S> {
    fn train(&mut self) -> Result<TrainingSeries, EnvError> {
        train(
            &mut self.agent,
            &mut self.env,
            &self.config,
            &mut self.hooks,
            &mut self.load_sampler,
        )
    }
}
