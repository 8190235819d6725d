pub mod experiment;
pub mod sarsa;
