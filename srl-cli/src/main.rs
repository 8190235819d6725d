mod cli;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, EvaluateArgs, TrainArgs};
use srl_agents::{random::RandomAgent, sarsa::SarsaAgent};
use srl_api::{
    Experiment, ExperimentBuilder, RunResponse, RunResult,
    batch::{batch_seeds, run_batch},
    hooks::LoggerTrainingHook,
    persistence::{load_model, persist_run},
    system::LoadSamplerType,
};
use srl_core::{
    env::Env,
    evaluation::Evaluator,
    metrics::ImprovementMetrics,
};
use srl_envs::EnvBuilderTrait;
use tracing::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format)?;
    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Batch { train, runs } => batch(train, runs),
        Commands::Evaluate(args) => evaluate(args),
    }
}

fn load_sampler_type(args: &TrainArgs) -> LoadSamplerType {
    if args.no_system_load {
        LoadSamplerType::Noop
    } else {
        LoadSamplerType::Proc
    }
}

fn respond(result: &RunResult, args: &TrainArgs) -> Result<RunResponse> {
    if args.no_save {
        return Ok(RunResponse::success(result, None));
    }
    Ok(persist_run(result, &args.output)?)
}

fn train(args: TrainArgs) -> Result<()> {
    let params = args.params.resolve()?;
    let outcome = ExperimentBuilder::new(args.env)
        .with_params(params)
        .with_seed(args.seed)
        .with_load_sampler(load_sampler_type(&args))
        .with_hook(LoggerTrainingHook::default())
        .build()
        .and_then(Experiment::run);
    match outcome {
        Ok(result) => {
            let response = respond(&result, &args)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            let response = RunResponse::error(&err, Some(params));
            println!("{}", serde_json::to_string_pretty(&response)?);
            Err(err.into())
        }
    }
}

fn batch(args: TrainArgs, runs: usize) -> Result<()> {
    let params = args.params.resolve()?;
    let seeds = batch_seeds(args.seed.unwrap_or(0), runs);
    let results = run_batch(&args.env, params, &seeds, load_sampler_type(&args));
    let mut responses = Vec::with_capacity(results.len());
    for (seed, outcome) in seeds.iter().zip(results) {
        let response = match outcome {
            Ok(result) => respond(&result, &args)?,
            Err(err) => {
                error!(seed, %err, "run failed");
                RunResponse::error(&err, Some(params))
            }
        };
        responses.push(response);
    }
    let succeeded = responses.iter().filter(|r| r.is_success()).count();
    info!(runs, succeeded, "batch done");
    println!("{}", serde_json::to_string_pretty(&responses)?);
    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let model = load_model(&args.model)
        .with_context(|| format!("cannot load model from {}", args.model.display()))?;
    let mut env = args.env.build_env()?;
    let description = env.env_description();
    anyhow::ensure!(
        description.state_count() == model.q_table.n_states()
            && description.action_count() == model.q_table.n_actions(),
        "model of shape {}x{} does not fit environment `{}`",
        model.q_table.n_states(),
        model.q_table.n_actions(),
        args.env
    );
    let success_reward = args
        .success_reward
        .or_else(|| env.success_reward())
        .context("no success reward configured")?;
    let evaluator =
        Evaluator::new(args.episodes, args.max_steps, success_reward).with_seed(args.seed);

    let mut agent = SarsaAgent::from_model(model, args.seed);
    let mut random_agent = RandomAgent::new(&description, args.seed.map(|s| s.wrapping_add(1)));
    let test = evaluator.evaluate(&mut agent, &mut env)?;
    let baseline = evaluator.evaluate(&mut random_agent, &mut env)?;
    let improvement = ImprovementMetrics::compare(&test, &baseline);
    info!(
        success_rate = test.success_rate,
        avg_steps = test.avg_steps,
        steps_reduction = improvement.steps_reduction,
        success_rate_increase = improvement.success_rate_increase,
        "evaluation done"
    );
    let report = serde_json::json!({
        "test": test,
        "baseline": baseline,
        "improvement": improvement,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
