use clap::{Args, Parser, Subcommand, ValueEnum};
use srl_api::{Hyperparameters, RunMode, error::ConfigError};
use srl_envs::EnvSpec;
use std::path::PathBuf;

/// Train and evaluate tabular SARSA agents
#[derive(Parser, Debug)]
#[command(name = "srl", version)]
pub struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train one agent, evaluate it against the random baseline and store the run
    Train(TrainArgs),
    /// Run several independent trainings in parallel, one per seed
    Batch {
        #[command(flatten)]
        train: TrainArgs,
        #[arg(long, default_value_t = 4)]
        runs: usize,
    },
    /// Evaluate a stored model
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub params: ParamArgs,
    /// `taxi`, `chain` or `chain:<n>`
    #[arg(long, default_value = "taxi")]
    pub env: EnvSpec,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value = "data/results")]
    pub output: PathBuf,
    /// Keep the results in memory only
    #[arg(long)]
    pub no_save: bool,
    /// Skip host load sampling
    #[arg(long)]
    pub no_system_load: bool,
}

/// Hyperparameters, read from an optional TOML or JSON file. Flags win over the file.
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub mode: Option<RunMode>,
    #[arg(long)]
    pub alpha: Option<f64>,
    #[arg(long)]
    pub gamma: Option<f64>,
    #[arg(long)]
    pub eps: Option<f64>,
    #[arg(long)]
    pub eps_decay: Option<f64>,
    #[arg(long)]
    pub eps_min: Option<f64>,
    #[arg(long)]
    pub training_runs: Option<usize>,
    #[arg(long)]
    pub max_steps_per_episode: Option<usize>,
    #[arg(long)]
    pub test_episodes: Option<usize>,
}

impl ParamArgs {
    pub fn resolve(&self) -> Result<Hyperparameters, ConfigError> {
        let mut params = match &self.config {
            Some(path) => Hyperparameters::from_file(path)?,
            None => Hyperparameters::default(),
        };
        macro_rules! override_with {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    params.$field = value;
                })*
            };
        }
        override_with!(
            mode,
            alpha,
            gamma,
            eps,
            eps_decay,
            eps_min,
            training_runs,
            max_steps_per_episode,
            test_episodes
        );
        Ok(params)
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub model: PathBuf,
    #[arg(long, default_value = "taxi")]
    pub env: EnvSpec,
    #[arg(long, default_value_t = 100)]
    pub episodes: usize,
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,
    /// Defaults to the environment's own success reward
    #[arg(long)]
    pub success_reward: Option<f64>,
    #[arg(long)]
    pub seed: Option<u64>,
}
