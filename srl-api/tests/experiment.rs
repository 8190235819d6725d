use srl_api::{
    ExperimentBuilder, Hyperparameters, RunError, RunMode,
    batch::{batch_seeds, run_batch},
    error::ConfigError,
    hooks::{ChannelTrainingHook, TrainingEvent},
    run_to_response,
    system::LoadSamplerType,
    test_utils::{FailingEnv, chain_params, fast_params},
};
use srl_core::error::EnvError;
use srl_envs::EnvSpec;

fn chain() -> ExperimentBuilder {
    ExperimentBuilder::new(EnvSpec::Chain { n_states: 3 }).with_load_sampler(LoadSamplerType::Noop)
}

#[test]
fn chain_experiment_beats_the_baseline() -> Result<(), RunError> {
    let result = chain()
        .with_params(chain_params())
        .with_seed(Some(3))
        .build()?
        .run()?;
    let report = &result.report;
    assert!(report.test.success_rate >= 0.9);
    assert_eq!(report.test.episode_steps.len(), 100);
    assert_eq!(report.baseline.episode_steps.len(), 100);
    assert!(report.test.avg_steps < report.baseline.avg_steps);
    assert!(report.improvement.steps_reduction > 0.);
    assert_eq!(result.model.q_table.n_states(), 3);
    assert_eq!(result.params, chain_params());
    Ok(())
}

#[test]
fn unseeded_runs_differ_between_threads() {
    let unseeded = || {
        std::thread::spawn(|| {
            ExperimentBuilder::new(EnvSpec::Taxi)
                .with_params(fast_params())
                .with_load_sampler(LoadSamplerType::Noop)
                .build()
                .and_then(|experiment| experiment.run())
                .map(|result| result.model.q_table)
        })
        .join()
        .expect("run thread panicked")
        .expect("unseeded taxi run failed")
    };
    assert_ne!(unseeded(), unseeded());
}

#[test]
fn optimized_mode_replaces_the_whole_parameter_set() -> Result<(), RunError> {
    // out of range on purpose: the preset substitutes it before validation
    let params = Hyperparameters {
        alpha: 5.,
        training_runs: 1,
        mode: RunMode::Optimized,
        ..Default::default()
    };
    let experiment = ExperimentBuilder::new(EnvSpec::Taxi)
        .with_params(params)
        .build()?;
    assert_eq!(experiment.params, Hyperparameters::optimized());
    assert_eq!(experiment.training_loop.config.episode_count, 6000);
    assert_eq!(experiment.evaluator.episode_count, 250);
    assert_eq!(experiment.training_loop.agent.config().alpha, 0.12);
    Ok(())
}

#[test]
fn out_of_range_parameters_are_rejected_before_the_run() {
    let params = Hyperparameters {
        eps_decay: 0.5,
        ..fast_params()
    };
    let result = chain().with_params(params).build();
    assert!(matches!(
        result,
        Err(RunError::Config(ConfigError::OutOfRange {
            name: "eps_decay",
            ..
        }))
    ));
}

#[test]
fn an_environment_failure_aborts_the_whole_run() {
    // 100 training resets succeed, the evaluation then hits the failure
    let builder = ExperimentBuilder::new(|| Ok::<_, EnvError>(FailingEnv::new(3, 105)))
        .with_params(fast_params())
        .with_load_sampler(LoadSamplerType::Noop);
    let result = builder.build().and_then(|experiment| experiment.run());
    assert!(matches!(result, Err(RunError::Env(EnvError::Backend(_)))));

    let builder = ExperimentBuilder::new(|| Ok::<_, EnvError>(FailingEnv::new(3, 5)))
        .with_params(fast_params())
        .with_load_sampler(LoadSamplerType::Noop);
    let response = run_to_response(builder);
    assert!(!response.is_success());
    assert!(response.message().contains("simulator went away"));
}

#[test]
fn success_response_carries_the_summary_message() {
    let response = run_to_response(chain().with_params(fast_params()).with_seed(Some(8)));
    assert!(response.is_success());
    assert!(
        response
            .message()
            .starts_with("SARSA training completed successfully. Agent achieves ")
    );
    assert!(response.message().ends_with(" steps per episode."));
}

#[test]
fn channel_hook_reports_at_the_configured_cadence() -> Result<(), RunError> {
    let (hook, receiver) = ChannelTrainingHook::new();
    chain()
        .with_params(fast_params())
        .with_seed(Some(4))
        .with_report_interval(25)
        .with_hook(hook)
        .build()?
        .run()?;
    let events: Vec<TrainingEvent> = receiver.try_iter().collect();
    assert_eq!(events.len(), 6);
    assert_eq!(events[0], TrainingEvent::Started { total_episodes: 100 });
    let episodes: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            TrainingEvent::Progress(progress) => Some(progress.episode),
            _ => None,
        })
        .collect();
    assert_eq!(episodes, vec![25, 50, 75, 100]);
    assert!(matches!(events[5], TrainingEvent::Finished(_)));
    Ok(())
}

#[test]
fn batch_runs_are_independent() {
    let seeds = batch_seeds(10, 3);
    assert_eq!(seeds, vec![10, 11, 12]);
    let results = run_batch(
        &EnvSpec::Chain { n_states: 3 },
        fast_params(),
        &seeds,
        LoadSamplerType::Noop,
    );
    assert_eq!(results.len(), 3);
    let run_ids: Vec<_> = results
        .iter()
        .map(|result| result.as_ref().map(|r| r.run_id).expect("run succeeds"))
        .collect();
    assert_ne!(run_ids[0], run_ids[1]);
    assert_ne!(run_ids[1], run_ids[2]);
}
