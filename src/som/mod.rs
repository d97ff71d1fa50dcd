//! Competitive-learning clustering core.
//!
//! A batch-update Self-Organizing Map variant over a one-dimensional cluster
//! arrangement: per-iteration winner selection, neighborhood-weighted delta
//! accumulation, a decayed learning rate, and an error-delta convergence
//! test.

mod map;
mod neighborhood;
mod training;

pub use map::{decayed_learning_rate, Som, TrainingState};
pub use neighborhood::Neighborhood;
pub use training::{run, run_capped, train, TrainingOutcome};
