use crate::training::TrainingSeries;
use serde::{Deserialize, Serialize};

/// Snapshot handed to hooks every `report_interval` episodes. The trailing figures are computed
/// over the last `report_interval` episodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgress {
    pub episode: usize,
    pub total_episodes: usize,
    pub recent_success_rate: f64,
    pub recent_avg_steps: f64,
    pub recent_avg_reward: f64,
    pub epsilon: Option<f64>,
}

/// Observability sink for the training loop. Hooks observe, they never steer: a run always
/// completes its configured episodes or fails.
pub trait TrainingHook {
    fn init_hook(&mut self, _total_episodes: usize) {}

    fn progress_hook(&mut self, progress: &TrainingProgress);

    fn shutdown_hook(&mut self, _series: &TrainingSeries) {}
}

impl<F: FnMut(&TrainingProgress)> TrainingHook for F {
    fn progress_hook(&mut self, progress: &TrainingProgress) {
        (self)(progress)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyTrainingHook;

impl TrainingHook for EmptyTrainingHook {
    fn progress_hook(&mut self, _: &TrainingProgress) {}
}

/// Fans every event out to a list of hooks, in order.
#[derive(Default)]
pub struct TrainingHooks {
    hooks: Vec<Box<dyn TrainingHook + Send>>,
}

impl TrainingHooks {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_hook(mut self, hook: impl TrainingHook + Send + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl TrainingHook for TrainingHooks {
    fn init_hook(&mut self, total_episodes: usize) {
        for hook in &mut self.hooks {
            hook.init_hook(total_episodes);
        }
    }

    fn progress_hook(&mut self, progress: &TrainingProgress) {
        for hook in &mut self.hooks {
            hook.progress_hook(progress);
        }
    }

    fn shutdown_hook(&mut self, series: &TrainingSeries) {
        for hook in &mut self.hooks {
            hook.shutdown_hook(series);
        }
    }
}
