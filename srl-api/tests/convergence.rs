use srl_agents::{
    random::RandomAgent,
    sarsa::{SarsaAgent, SarsaConfig},
};
use srl_core::{
    Algorithm,
    env::Env,
    error::EnvError,
    evaluation::Evaluator,
    hooks::EmptyTrainingHook,
    metrics::{ImprovementMetrics, RunReport},
    system::NoopLoadSampler,
    training::{TrainingConfig, TrainingLoop, train},
};
use srl_envs::{chain::ChainEnv, taxi::TaxiEnv};

#[test]
fn sarsa_solves_the_three_state_chain() -> Result<(), EnvError> {
    let env = ChainEnv::new(3);
    let description = env.env_description();
    let config = SarsaConfig {
        alpha: 0.5,
        gamma: 0.9,
        epsilon: 1.0,
        epsilon_decay: 0.995,
        epsilon_min: 0.01,
    };
    let mut training_loop = TrainingLoop {
        agent: SarsaAgent::new(config, &description, Some(11)),
        env,
        hooks: EmptyTrainingHook,
        load_sampler: NoopLoadSampler,
        config: TrainingConfig {
            seed: Some(11),
            ..TrainingConfig::new(2000, 4, 1.)
        },
    };
    let series = training_loop.train()?;
    assert_eq!(series.records.len(), 2000);
    assert!(series.records.iter().all(|r| r.steps <= 4));

    // four steps leave a uniformly random walker a coin flip of reaching the goal
    let evaluator = Evaluator::new(100, 4, 1.).with_seed(Some(99));
    let mut baseline = RandomAgent::new(&description, Some(12));
    let agent_summary = evaluator.evaluate(&mut training_loop.agent, &mut training_loop.env)?;
    let baseline_summary = evaluator.evaluate(&mut baseline, &mut training_loop.env)?;

    assert!(agent_summary.success_rate >= 0.9, "{agent_summary:?}");
    assert!(baseline_summary.success_rate < 0.75, "{baseline_summary:?}");
    assert_eq!(agent_summary.avg_steps, 2.);

    let report = RunReport::aggregate(
        &series,
        &training_loop.agent,
        agent_summary.clone(),
        baseline_summary.clone(),
    );
    assert_eq!(
        report.improvement,
        ImprovementMetrics::compare(&agent_summary, &baseline_summary)
    );
    assert!(report.improvement.steps_reduction > 0.);
    assert!(report.improvement.efficiency_gain > 1.);
    assert_eq!(report.learning_stability.final_epsilon, 0.01);
    assert!(report.value_table.non_zero_count > 0);
    Ok(())
}

#[test]
fn evaluation_of_a_frozen_agent_is_reproducible() -> Result<(), EnvError> {
    let mut env = TaxiEnv::new();
    let mut agent = SarsaAgent::new(SarsaConfig::default(), &env.env_description(), Some(5));
    let config = TrainingConfig {
        seed: Some(5),
        ..TrainingConfig::new(200, 200, 20.)
    };
    train(
        &mut agent,
        &mut env,
        &config,
        &mut EmptyTrainingHook,
        &mut NoopLoadSampler,
    )?;
    let table = agent.q_table().clone();
    let epsilon = agent.epsilon();

    let evaluator = Evaluator::new(20, 200, 20.).with_seed(Some(1234));
    let first = evaluator.evaluate(&mut agent, &mut env)?;
    let second = evaluator.evaluate(&mut agent, &mut env)?;
    assert_eq!(first, second);
    assert_eq!(agent.q_table(), &table);
    assert_eq!(agent.epsilon(), epsilon);
    Ok(())
}
