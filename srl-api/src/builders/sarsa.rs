use crate::params::Hyperparameters;
use srl_agents::sarsa::{SarsaAgent, SarsaConfig};
use srl_core::env::EnvironmentDescription;

#[derive(Debug, Default, Clone, Copy)]
pub struct SarsaBuilder {
    pub config: SarsaConfig,
}

impl From<&Hyperparameters> for SarsaBuilder {
    fn from(params: &Hyperparameters) -> Self {
        Self {
            config: params.sarsa_config(),
        }
    }
}

impl SarsaBuilder {
    pub fn build(&self, env_description: &EnvironmentDescription, seed: Option<u64>) -> SarsaAgent {
        SarsaAgent::new(self.config, env_description, seed)
    }
}
