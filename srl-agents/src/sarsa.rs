use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use srl_core::{
    agents::{Agent, Exploration, Transition},
    env::{Discrete, EnvironmentDescription},
    exploration::EpsilonSchedule,
    rng::seeded_rng,
    value_table::QTable,
};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SarsaConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
}

impl Default for SarsaConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.99,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
        }
    }
}

/// Everything needed to bring a trained agent back: the learned table plus where the
/// exploration schedule stood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarsaModel {
    pub config: SarsaConfig,
    pub epsilon: f64,
    pub q_table: QTable,
}

/// Epsilon-greedy SARSA over a dense value table.
pub struct SarsaAgent {
    config: SarsaConfig,
    schedule: EpsilonSchedule,
    action_space: Discrete,
    q_table: QTable,
    rng: StdRng,
}

impl SarsaAgent {
    pub fn new(config: SarsaConfig, env_description: &EnvironmentDescription, seed: Option<u64>) -> Self {
        Self {
            schedule: EpsilonSchedule::new(config.epsilon, config.epsilon_decay, config.epsilon_min),
            action_space: env_description.action_space,
            q_table: QTable::zeros(env_description.state_count(), env_description.action_count()),
            rng: seeded_rng(seed),
            config,
        }
    }

    pub fn from_model(model: SarsaModel, seed: Option<u64>) -> Self {
        Self {
            schedule: EpsilonSchedule::new(
                model.epsilon,
                model.config.epsilon_decay,
                model.config.epsilon_min,
            ),
            action_space: Discrete::new(model.q_table.n_actions()),
            q_table: model.q_table,
            rng: seeded_rng(seed),
            config: model.config,
        }
    }

    pub fn to_model(&self) -> SarsaModel {
        SarsaModel {
            config: self.config,
            epsilon: self.schedule.epsilon(),
            q_table: self.q_table.clone(),
        }
    }

    pub fn config(&self) -> &SarsaConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.schedule.epsilon()
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    pub fn greedy_action(&self, state: usize) -> usize {
        self.q_table.argmax(state)
    }
}

impl Agent for SarsaAgent {
    fn select_action(&mut self, state: usize, exploration: Exploration) -> usize {
        assert!(
            state < self.q_table.n_states(),
            "state {state} is outside of the state space of size {}",
            self.q_table.n_states()
        );
        let epsilon = match exploration {
            Exploration::Enabled => self.schedule.epsilon(),
            Exploration::Suppressed => 0.,
        };
        // a zero rate leaves the generator untouched
        if epsilon > 0. && self.rng.random::<f64>() < epsilon {
            self.action_space.sample(&mut self.rng)
        } else {
            self.greedy_action(state)
        }
    }

    fn learn(&mut self, transition: &Transition) -> f64 {
        let Transition {
            state,
            action,
            reward,
            next_state,
            next_action,
            ..
        } = *transition;
        let current_q = self.q_table.get(state, action);
        let td_target = reward + self.config.gamma * self.q_table.get(next_state, next_action);
        let td_error = td_target - current_q;
        self.q_table
            .set(state, action, current_q + self.config.alpha * td_error);
        trace!(state, action, reward, td_error, "sarsa update");
        td_error
    }

    fn decay_exploration(&mut self) {
        self.schedule.decay();
    }

    fn exploration_rate(&self) -> Option<f64> {
        Some(self.schedule.epsilon())
    }

    fn value_table(&self) -> Option<&QTable> {
        Some(&self.q_table)
    }
}

#[cfg(test)]
mod test {
    use super::{SarsaAgent, SarsaConfig};
    use srl_core::{
        agents::{Agent, Exploration, Transition},
        env::EnvironmentDescription,
    };

    fn agent(config: SarsaConfig) -> SarsaAgent {
        SarsaAgent::new(config, &EnvironmentDescription::discrete(3, 2), Some(0))
    }

    #[test]
    fn bootstraps_on_the_action_taken_next() {
        let mut agent = agent(SarsaConfig {
            alpha: 1.0,
            gamma: 0.5,
            ..Default::default()
        });
        agent.q_table_mut().set(1, 0, 2.);
        agent.q_table_mut().set(1, 1, 10.);
        // Q-learning would bootstrap on 10, SARSA uses the action actually chosen.
        let td_error = agent.learn(&Transition {
            state: 0,
            action: 1,
            reward: 1.,
            next_state: 1,
            next_action: 0,
            done: false,
        });
        assert_eq!(td_error, 2.);
        assert_eq!(agent.q_table().get(0, 1), 2.);
    }

    #[test]
    fn suppressed_exploration_leaves_epsilon_alone() {
        let mut agent = agent(SarsaConfig::default());
        agent.q_table_mut().set(2, 1, 1.);
        for _ in 0..100 {
            assert_eq!(agent.select_action(2, Exploration::Suppressed), 1);
        }
        assert_eq!(agent.exploration_rate(), Some(1.0));
    }

    #[test]
    fn suppressed_exploration_does_not_advance_the_generator() {
        let mut evaluated = agent(SarsaConfig::default());
        let mut untouched = agent(SarsaConfig::default());
        for state in 0..3 {
            for _ in 0..50 {
                evaluated.select_action(state, Exploration::Suppressed);
            }
        }
        for _ in 0..200 {
            assert_eq!(
                evaluated.select_action(0, Exploration::Enabled),
                untouched.select_action(0, Exploration::Enabled)
            );
        }
    }

    #[test]
    fn model_round_trip_keeps_table_and_epsilon() {
        let mut agent = agent(SarsaConfig::default());
        agent.q_table_mut().set(0, 1, 0.25);
        agent.decay_exploration();
        let restored = SarsaAgent::from_model(agent.to_model(), None);
        assert_eq!(restored.q_table(), agent.q_table());
        assert_eq!(restored.epsilon(), agent.epsilon());
    }

    #[test]
    #[should_panic(expected = "outside of the state space")]
    fn selecting_on_an_unknown_state_fails_fast() {
        let mut agent = agent(SarsaConfig::default());
        agent.select_action(3, Exploration::Enabled);
    }
}
