//! Native port of the Taxi-v3 grid world.
//!
//! A taxi moves on a 5x5 grid with walls, picks a passenger up at one of four depots and drops
//! them off at another. Every step costs 1, an illegal pickup or dropoff costs 10 and a correct
//! dropoff pays 20 and ends the episode. Episodes are truncated after 200 steps.

use rand::{Rng, SeedableRng, rngs::StdRng};
use srl_core::{
    env::{Env, EnvironmentDescription, SnapShot},
    error::EnvError,
};

pub const N_STATES: usize = 500;
pub const N_ACTIONS: usize = 6;
pub const SUCCESS_REWARD: f64 = 20.;
pub const TIME_LIMIT: usize = 200;

const GRID: usize = 5;
const IN_TAXI: usize = 4;
const DEPOTS: [(usize, usize); 4] = [(0, 0), (0, 4), (4, 0), (4, 3)];
const MAP: [&[u8]; 7] = [
    b"+---------+",
    b"|R: | : :G|",
    b"| : | : : |",
    b"| : : : : |",
    b"| | : | : |",
    b"|Y| : |B: |",
    b"+---------+",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxiAction {
    South,
    North,
    East,
    West,
    Pickup,
    Dropoff,
}

impl TryFrom<usize> for TaxiAction {
    type Error = EnvError;

    fn try_from(action: usize) -> Result<Self, Self::Error> {
        Ok(match action {
            0 => Self::South,
            1 => Self::North,
            2 => Self::East,
            3 => Self::West,
            4 => Self::Pickup,
            5 => Self::Dropoff,
            _ => {
                return Err(EnvError::InvalidAction {
                    action,
                    n_actions: N_ACTIONS,
                });
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxiState {
    pub row: usize,
    pub col: usize,
    /// Depot index of the passenger, 4 while riding in the taxi.
    pub passenger: usize,
    pub destination: usize,
}

impl TaxiState {
    pub fn encode(&self) -> usize {
        ((self.row * GRID + self.col) * 5 + self.passenger) * 4 + self.destination
    }

    pub fn decode(state: usize) -> Self {
        let destination = state % 4;
        let state = state / 4;
        let passenger = state % 5;
        let state = state / 5;
        Self {
            row: state / GRID,
            col: state % GRID,
            passenger,
            destination,
        }
    }

    fn taxi_at(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

pub struct TaxiEnv {
    state: Option<TaxiState>,
    elapsed_steps: usize,
    time_limit: Option<usize>,
}

impl Default for TaxiEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxiEnv {
    pub fn new() -> Self {
        Self {
            state: None,
            elapsed_steps: 0,
            time_limit: Some(TIME_LIMIT),
        }
    }

    pub fn with_time_limit(mut self, time_limit: Option<usize>) -> Self {
        self.time_limit = time_limit;
        self
    }

    fn transition(state: TaxiState, action: TaxiAction) -> (TaxiState, f64, bool) {
        let mut next = state;
        let mut reward = -1.;
        let mut terminated = false;
        let row = &MAP[state.row + 1];
        match action {
            TaxiAction::South => next.row = usize::min(state.row + 1, GRID - 1),
            TaxiAction::North => next.row = state.row.saturating_sub(1),
            TaxiAction::East => {
                if row[2 * state.col + 2] == b':' {
                    next.col = usize::min(state.col + 1, GRID - 1);
                }
            }
            TaxiAction::West => {
                if row[2 * state.col] == b':' {
                    next.col = state.col.saturating_sub(1);
                }
            }
            TaxiAction::Pickup => {
                if state.passenger < IN_TAXI && state.taxi_at() == DEPOTS[state.passenger] {
                    next.passenger = IN_TAXI;
                } else {
                    reward = -10.;
                }
            }
            TaxiAction::Dropoff => {
                let depot = DEPOTS.iter().position(|d| *d == state.taxi_at());
                if state.passenger == IN_TAXI && depot == Some(state.destination) {
                    next.passenger = state.destination;
                    terminated = true;
                    reward = SUCCESS_REWARD;
                } else if let (IN_TAXI, Some(depot)) = (state.passenger, depot) {
                    next.passenger = depot;
                } else {
                    reward = -10.;
                }
            }
        }
        (next, reward, terminated)
    }
}

impl Env for TaxiEnv {
    fn reset(&mut self, seed: u64) -> Result<usize, EnvError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let passenger = rng.random_range(0..4);
        let destination = (passenger + rng.random_range(1..4)) % 4;
        let state = TaxiState {
            row: rng.random_range(0..GRID),
            col: rng.random_range(0..GRID),
            passenger,
            destination,
        };
        self.state = Some(state);
        self.elapsed_steps = 0;
        Ok(state.encode())
    }

    fn step(&mut self, action: usize) -> Result<SnapShot, EnvError> {
        let action = TaxiAction::try_from(action)?;
        let state = self.state.ok_or(EnvError::NotReset)?;
        let (next, reward, terminated) = Self::transition(state, action);
        self.state = Some(next);
        self.elapsed_steps += 1;
        let truncated = self.time_limit.is_some_and(|limit| self.elapsed_steps >= limit);
        Ok(SnapShot {
            state: next.encode(),
            reward,
            terminated,
            truncated,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::discrete(N_STATES, N_ACTIONS)
    }

    fn success_reward(&self) -> Option<f64> {
        Some(SUCCESS_REWARD)
    }
}

#[cfg(test)]
mod test {
    use super::{N_STATES, TaxiAction, TaxiEnv, TaxiState};
    use srl_core::{env::Env, error::EnvError};

    fn env_at(state: TaxiState) -> TaxiEnv {
        let mut env = TaxiEnv::new();
        env.state = Some(state);
        env
    }

    #[test]
    fn encoding_is_a_bijection() {
        for state in 0..N_STATES {
            assert_eq!(TaxiState::decode(state).encode(), state);
        }
    }

    #[test]
    fn reset_never_places_the_passenger_at_the_destination() -> Result<(), EnvError> {
        let mut env = TaxiEnv::new();
        for seed in 0..500 {
            let state = TaxiState::decode(env.reset(seed)?);
            assert!(state.passenger < 4);
            assert_ne!(state.passenger, state.destination);
        }
        Ok(())
    }

    #[test]
    fn walls_block_lateral_moves() -> Result<(), EnvError> {
        // a wall separates columns 1 and 2 on the top row
        let mut env = env_at(TaxiState {
            row: 0,
            col: 1,
            passenger: 0,
            destination: 1,
        });
        let snapshot = env.step(TaxiAction::East as usize)?;
        assert_eq!(TaxiState::decode(snapshot.state).col, 1);
        assert_eq!(snapshot.reward, -1.);
        let snapshot = env.step(TaxiAction::West as usize)?;
        assert_eq!(TaxiState::decode(snapshot.state).col, 0);
        Ok(())
    }

    #[test]
    fn pickup_and_dropoff_complete_an_episode() -> Result<(), EnvError> {
        let mut env = env_at(TaxiState {
            row: 0,
            col: 0,
            passenger: 0,
            destination: 2,
        });
        let snapshot = env.step(TaxiAction::Dropoff as usize)?;
        assert_eq!(snapshot.reward, -10.);
        let snapshot = env.step(TaxiAction::Pickup as usize)?;
        assert_eq!(TaxiState::decode(snapshot.state).passenger, 4);
        for _ in 0..4 {
            env.step(TaxiAction::South as usize)?;
        }
        let snapshot = env.step(TaxiAction::Dropoff as usize)?;
        assert_eq!(snapshot.reward, 20.);
        assert!(snapshot.terminated);
        Ok(())
    }

    #[test]
    fn episodes_are_truncated_at_the_time_limit() -> Result<(), EnvError> {
        let mut env = TaxiEnv::new().with_time_limit(Some(3));
        env.reset(1)?;
        assert!(!env.step(0)?.truncated);
        assert!(!env.step(0)?.truncated);
        assert!(env.step(0)?.truncated);
        Ok(())
    }

    #[test]
    fn rejects_unknown_actions_and_unreset_steps() {
        let mut env = TaxiEnv::new();
        assert!(matches!(env.step(0), Err(EnvError::NotReset)));
        assert!(matches!(
            env.step(6),
            Err(EnvError::InvalidAction { action: 6, .. })
        ));
    }
}
