use crate::{
    builders::experiment::{ExperimentBuilder, RunResult},
    error::RunError,
    hooks::LoggerTrainingHook,
    params::Hyperparameters,
    system::LoadSamplerType,
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use srl_envs::EnvBuilderTrait;
use tracing::info;

/// Seeds for `runs` independent runs starting at `base_seed`.
pub fn batch_seeds(base_seed: u64, runs: usize) -> Vec<u64> {
    (0..runs as u64).map(|i| base_seed.wrapping_add(i)).collect()
}

/// Runs one experiment per seed on the rayon pool. Runs share nothing: each builds its own
/// environment, agent and buffers. Results come back in seed order and a failed run does not
/// affect the others.
pub fn run_batch<EB>(
    env_builder: &EB,
    params: Hyperparameters,
    seeds: &[u64],
    load_sampler_type: LoadSamplerType,
) -> Vec<Result<RunResult, RunError>>
where
    EB: EnvBuilderTrait + Clone,
{
    info!(runs = seeds.len(), "batch started");
    let results: Vec<_> = seeds
        .to_vec()
        .into_par_iter()
        .map(|seed| {
            ExperimentBuilder::new(env_builder.clone())
                .with_params(params)
                .with_seed(Some(seed))
                .with_load_sampler(load_sampler_type)
                .with_hook(LoggerTrainingHook::default())
                .build()?
                .run()
        })
        .collect();
    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(runs = seeds.len(), failed, "batch finished");
    results
}
