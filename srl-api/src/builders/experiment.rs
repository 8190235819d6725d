use crate::{
    builders::sarsa::SarsaBuilder,
    error::{ConfigError, RunError},
    params::Hyperparameters,
    system::{LoadSamplerType, SamplerKind},
};
use chrono::{DateTime, Utc};
use srl_agents::{
    random::RandomAgent,
    sarsa::{SarsaAgent, SarsaModel},
};
use srl_core::{
    Algorithm,
    env::Env,
    evaluation::Evaluator,
    hooks::{TrainingHook, TrainingHooks},
    metrics::RunReport,
    training::{DEFAULT_REPORT_INTERVAL, DEFAULT_SAMPLE_INTERVAL, TrainingConfig, TrainingLoop},
};
use srl_envs::{EnvBuilderTrait, EnvSpec};
use tracing::{info, info_span};
use uuid::Uuid;

// Evaluation episode seeds start here, clear of the seeds training consumes.
const EVALUATION_SEED_OFFSET: u64 = 1 << 32;

/// Everything a successful run hands back to its caller.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub params: Hyperparameters,
    pub report: RunReport,
    pub model: SarsaModel,
}

pub struct ExperimentBuilder<EB: EnvBuilderTrait = EnvSpec> {
    pub env_builder: EB,
    pub params: Hyperparameters,
    pub seed: Option<u64>,
    /// Overrides the environment's own success reward.
    pub success_reward: Option<f64>,
    pub sample_interval: usize,
    pub report_interval: usize,
    pub load_sampler_type: LoadSamplerType,
    pub hooks: TrainingHooks,
}

impl<EB: EnvBuilderTrait> ExperimentBuilder<EB> {
    pub fn new(env_builder: EB) -> Self {
        Self {
            env_builder,
            params: Hyperparameters::default(),
            seed: None,
            success_reward: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            load_sampler_type: LoadSamplerType::default(),
            hooks: TrainingHooks::empty(),
        }
    }

    pub fn with_params(mut self, params: Hyperparameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_success_reward(mut self, success_reward: f64) -> Self {
        self.success_reward = Some(success_reward);
        self
    }

    pub fn with_load_sampler(mut self, load_sampler_type: LoadSamplerType) -> Self {
        self.load_sampler_type = load_sampler_type;
        self
    }

    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }

    pub fn with_hook(mut self, hook: impl TrainingHook + Send + 'static) -> Self {
        self.hooks = self.hooks.add_hook(hook);
        self
    }

    /// Resolves the preset, validates and wires the run. Nothing has been trained when this
    /// returns, and a configuration error leaves nothing behind.
    pub fn build(self) -> Result<Experiment<EB::Env>, RunError> {
        let params = self.params.resolve();
        params.validate()?;
        let env = self.env_builder.build_env()?;
        let success_reward = self
            .success_reward
            .or_else(|| env.success_reward())
            .ok_or(ConfigError::MissingSuccessReward)?;
        let env_description = env.env_description();
        let agent = SarsaBuilder::from(&params).build(&env_description, self.seed);
        let baseline = RandomAgent::new(&env_description, self.seed.map(|s| s.wrapping_add(1)));
        let config = TrainingConfig {
            sample_interval: self.sample_interval,
            report_interval: self.report_interval,
            seed: self.seed,
            ..TrainingConfig::new(
                params.training_runs,
                params.max_steps_per_episode,
                success_reward,
            )
        };
        let evaluator = Evaluator::new(
            params.test_episodes,
            params.max_steps_per_episode,
            success_reward,
        )
        .with_seed(self.seed.map(|s| s.wrapping_add(EVALUATION_SEED_OFFSET)));
        Ok(Experiment {
            run_id: Uuid::new_v4(),
            params,
            training_loop: TrainingLoop {
                env,
                agent,
                hooks: self.hooks,
                load_sampler: self.load_sampler_type.build(),
                config,
            },
            baseline,
            evaluator,
        })
    }
}

/// One fully wired run: its own environment, agent, baseline and buffers.
pub struct Experiment<E: Env> {
    pub run_id: Uuid,
    pub params: Hyperparameters,
    pub training_loop: TrainingLoop<E, SarsaAgent, TrainingHooks, SamplerKind>,
    pub baseline: RandomAgent,
    pub evaluator: Evaluator,
}

impl<E: Env> Experiment<E> {
    /// Trains, evaluates the agent and the baseline on the same episode seeds, then aggregates.
    /// Any environment failure aborts the whole run without a report.
    pub fn run(mut self) -> Result<RunResult, RunError> {
        let span = info_span!("run", run_id = %self.run_id);
        let _guard = span.enter();
        info!(
            mode = %self.params.mode,
            episodes = self.params.training_runs,
            test_episodes = self.params.test_episodes,
            "run started"
        );

        let series = self.training_loop.train()?;
        let TrainingLoop { env, agent, .. } = &mut self.training_loop;
        let test = self.evaluator.evaluate(agent, env)?;
        let baseline = self.evaluator.evaluate(&mut self.baseline, env)?;
        let report = RunReport::aggregate(&series, &*agent, test, baseline);

        info!(
            success_rate = report.test.success_rate,
            avg_steps = report.test.avg_steps,
            baseline_success_rate = report.baseline.success_rate,
            steps_reduction = report.improvement.steps_reduction,
            success_rate_increase = report.improvement.success_rate_increase,
            "run finished"
        );
        Ok(RunResult {
            run_id: self.run_id,
            created_at: Utc::now(),
            params: self.params,
            model: agent.to_model(),
            report,
        })
    }
}
