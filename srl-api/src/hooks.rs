use crossbeam::channel::{Receiver, Sender, unbounded};
use srl_core::{
    hooks::{TrainingHook, TrainingProgress},
    metrics::TrainingSummary,
    training::TrainingSeries,
};
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggerTrainingHook {
    report_idx: usize,
}

impl TrainingHook for LoggerTrainingHook {
    fn init_hook(&mut self, total_episodes: usize) {
        self.report_idx = 0;
        info!(total_episodes, "training run registered");
    }

    fn progress_hook(&mut self, progress: &TrainingProgress) {
        info!(
            report = self.report_idx,
            episode = progress.episode,
            total = progress.total_episodes,
            success_rate = progress.recent_success_rate,
            avg_steps = progress.recent_avg_steps,
            avg_reward = progress.recent_avg_reward,
            epsilon = progress.epsilon.unwrap_or(0.),
            "training progress"
        );
        self.report_idx += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    Started { total_episodes: usize },
    Progress(TrainingProgress),
    Finished(TrainingSummary),
}

/// Forwards training events to another thread. A dropped receiver is not an error, the run goes
/// on without an audience.
#[derive(Debug, Clone)]
pub struct ChannelTrainingHook {
    sender: Sender<TrainingEvent>,
}

impl ChannelTrainingHook {
    pub fn new() -> (Self, Receiver<TrainingEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl TrainingHook for ChannelTrainingHook {
    fn init_hook(&mut self, total_episodes: usize) {
        let _ = self.sender.send(TrainingEvent::Started { total_episodes });
    }

    fn progress_hook(&mut self, progress: &TrainingProgress) {
        let _ = self.sender.send(TrainingEvent::Progress(*progress));
    }

    fn shutdown_hook(&mut self, series: &TrainingSeries) {
        let _ = self.sender.send(TrainingEvent::Finished(series.summary()));
    }
}
