use crate::{builders::experiment::RunResult, error::RunError, params::Hyperparameters};
use serde::{Deserialize, Serialize};
use srl_core::metrics::RunReport;
use std::path::PathBuf;
use uuid::Uuid;

/// The payload handed to whatever transport fronts a run, and the content of `results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunResponse {
    Success {
        run_id: Uuid,
        params: Hyperparameters,
        model_path: Option<PathBuf>,
        statistics: RunReport,
        message: String,
    },
    Error {
        run_id: Option<Uuid>,
        params: Option<Hyperparameters>,
        message: String,
    },
}

impl RunResponse {
    pub fn success(result: &RunResult, model_path: Option<PathBuf>) -> Self {
        let test = &result.report.test;
        Self::Success {
            run_id: result.run_id,
            params: result.params,
            model_path,
            statistics: result.report.clone(),
            message: format!(
                "SARSA training completed successfully. Agent achieves {:.1}% success rate with average {:.1} steps per episode.",
                test.success_rate * 100.,
                test.avg_steps
            ),
        }
    }

    pub fn error(error: &RunError, params: Option<Hyperparameters>) -> Self {
        Self::Error {
            run_id: None,
            params,
            message: format!("Error during SARSA execution: {error}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Error { message, .. } => message,
        }
    }
}
