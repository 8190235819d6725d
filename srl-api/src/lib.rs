// builders, hooks and the plumbing around a single run
pub mod batch;
pub mod builders;
pub mod error;
pub mod hooks;
pub mod params;
pub mod persistence;
pub mod response;
pub mod system;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use builders::experiment::{Experiment, ExperimentBuilder, RunResult};
pub use error::RunError;
pub use params::{Hyperparameters, RunMode};
pub use response::RunResponse;

use srl_envs::EnvBuilderTrait;

/// Runs one experiment and turns the outcome into a response payload, failures included.
pub fn run_to_response<EB: EnvBuilderTrait>(builder: ExperimentBuilder<EB>) -> RunResponse {
    let params = builder.params;
    match builder.build().and_then(Experiment::run) {
        Ok(result) => RunResponse::success(&result, None),
        Err(error) => RunResponse::error(&error, Some(params)),
    }
}
