//! Training entry points and the convergence loop.

use crate::config::SomConfig;
use crate::error::{Result, VigilError};
use crate::features::FeaturizedHeader;
use crate::math::Matrix;
use crate::som::{Som, TrainingState};
use log::info;

/// Iterations between progress log lines.
const LOG_INTERVAL: usize = 100;

/// Result of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Winning cluster per input row after convergence.
    pub winners: Vec<u32>,
    /// Trained prototype vectors, one row per cluster.
    pub weights: Matrix,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Total squared error at convergence.
    pub error: f32,
}

/// Runs the training loop to convergence.
///
/// The loop itself imposes no iteration cap; callers that want one should
/// use [`run_capped`].
pub fn run(som: &mut Som) -> TrainingState {
    loop {
        let state = som.iterate();

        if som.iteration() % LOG_INTERVAL == 0 || state == TrainingState::Converged {
            info!(
                "iteration = {}, error = {:.6}, learning_rate = {:.6}",
                som.iteration(),
                som.last_error(),
                som.effective_learning_rate()
            );
        }

        if state == TrainingState::Converged {
            return state;
        }
    }
}

/// Runs at most `max_iterations` training iterations.
///
/// Returns the state reached, which may still be [`TrainingState::Running`].
pub fn run_capped(som: &mut Som, max_iterations: usize) -> TrainingState {
    for _ in 0..max_iterations {
        if som.iterate() == TrainingState::Converged {
            return TrainingState::Converged;
        }
    }
    TrainingState::Running
}

/// Trains cluster prototypes on a featurized dataset.
///
/// Validates the header against the matrix shape, then iterates to
/// convergence and returns the winner assignments and trained weights.
pub fn train(
    config: &SomConfig,
    header: &FeaturizedHeader,
    inputs: Matrix,
) -> Result<TrainingOutcome> {
    if header.rows as usize != inputs.rows() || header.features_per_row as usize != inputs.cols() {
        return Err(VigilError::Structural(format!(
            "header claims {}x{}, matrix is {}x{}",
            header.rows,
            header.features_per_row,
            inputs.rows(),
            inputs.cols()
        )));
    }

    info!(
        "training {} clusters on {} rows of {} features",
        config.cluster_count, header.rows, header.features_per_row
    );

    let mut som = Som::new(config.clone(), inputs)?;
    run(&mut som);

    Ok(TrainingOutcome {
        winners: som.winners().to_vec(),
        weights: som.weights().clone(),
        iterations: som.iteration(),
        error: som.last_error(),
    })
}
