pub mod random;
pub mod sarsa;
