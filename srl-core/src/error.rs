use thiserror::Error;

/// Failures raised by an environment adapter. A run that hits one of these is aborted as a whole.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("action {action} is outside of the action space of size {n_actions}")]
    InvalidAction { action: usize, n_actions: usize },
    #[error("step called before the environment was reset")]
    NotReset,
    #[error("environment backend failed: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}
