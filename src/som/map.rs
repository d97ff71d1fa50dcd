//! The training session: inputs, weights, deltas, and the iteration step.

use crate::config::SomConfig;
use crate::error::{Result, VigilError};
use crate::math::{self, Matrix};
use crate::som::Neighborhood;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// State of the training loop after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// The error delta has not yet fallen below the threshold.
    Running,
    /// The error delta fell below the threshold; training is complete.
    Converged,
}

/// Computes the decayed learning rate at a given iteration.
///
/// Decays linearly to zero at `iteration == decay_rate` and is floored at
/// zero thereafter.
#[inline]
pub fn decayed_learning_rate(config: &SomConfig, iteration: usize) -> f32 {
    (config.learning_rate * (1.0 - iteration as f32 / config.decay_rate)).max(0.0)
}

/// A batch competitive-learning clustering session.
///
/// Holds the normalized input matrix, one prototype weight vector per
/// cluster, the per-iteration delta accumulator, and the winner assignment
/// for every input row. Created once per run and mutated by [`Som::iterate`]
/// until convergence.
#[derive(Debug)]
pub struct Som {
    config: SomConfig,
    neighborhood: Neighborhood,
    /// Input feature matrix, rows normalized at initialization.
    inputs: Matrix,
    /// Cluster prototype vectors, `cluster_count x cols`.
    weights: Matrix,
    /// Pending weight adjustments, zeroed after every iteration.
    deltas: Matrix,
    /// Winning cluster per input row, overwritten every iteration.
    winners: Vec<u32>,
    /// Shuffled row visit order.
    order: Vec<usize>,
    iteration: usize,
    last_error: f32,
}

impl Som {
    /// Creates a session from a configuration and a feature matrix.
    ///
    /// Shuffles the input order, normalizes every input row in place, and
    /// initializes the weight rows to normalized uniform-random vectors.
    pub fn new(config: SomConfig, mut inputs: Matrix) -> Result<Self> {
        let neighborhood = Neighborhood::from_name(&config.neighborhood)?;

        if config.cluster_count == 0 {
            return Err(VigilError::Config(
                "cluster_count must be at least 1".to_string(),
            ));
        }
        if inputs.rows() == 0 {
            return Err(VigilError::Training("empty input matrix".to_string()));
        }

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let rows = inputs.rows();
        let cols = inputs.cols();

        let mut order: Vec<usize> = (0..rows).collect();
        for i in 0..rows {
            let j = rng.gen_range(0..rows);
            order.swap(i, j);
        }

        for r in 0..rows {
            math::normalize(inputs.row_mut(r));
        }

        let mut weights = Matrix::zeros(config.cluster_count, cols);
        for c in 0..config.cluster_count {
            for w in weights.row_mut(c) {
                *w = rng.gen::<f32>();
            }
            math::normalize(weights.row_mut(c));
        }

        let deltas = Matrix::zeros(config.cluster_count, cols);
        let winners = vec![0u32; rows];

        Ok(Self {
            config,
            neighborhood,
            inputs,
            weights,
            deltas,
            winners,
            order,
            iteration: 0,
            last_error: f32::INFINITY,
        })
    }

    /// Returns the trained prototype vectors.
    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Returns the normalized input matrix.
    #[inline]
    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    /// Returns the winning cluster per input row.
    #[inline]
    pub fn winners(&self) -> &[u32] {
        &self.winners
    }

    /// Returns the shuffled row visit order.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the current iteration counter.
    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Returns the total squared error from the most recent iteration.
    #[inline]
    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    /// Returns the learning rate in effect for the current iteration.
    #[inline]
    pub fn effective_learning_rate(&self) -> f32 {
        decayed_learning_rate(&self.config, self.iteration)
    }

    /// Finds the cluster whose weight vector is closest to the input.
    ///
    /// Strict less-than against a running minimum, so ties deterministically
    /// favor the lowest cluster index.
    pub fn find_winner(&self, input: &[f32]) -> usize {
        let mut winner = 0;
        let mut min_distance = f32::MAX;

        for cluster in 0..self.config.cluster_count {
            let distance = math::distance(input, self.weights.row(cluster));
            if distance < min_distance {
                winner = cluster;
                min_distance = distance;
            }
        }

        winner
    }

    /// Accumulates neighborhood-weighted deltas for one input row.
    fn accumulate_deltas(&mut self, row: usize, winner: usize, learning_rate: f32) {
        for cluster in 0..self.config.cluster_count {
            let strength = self.neighborhood.strength(winner, cluster);
            if strength == 0.0 {
                continue;
            }

            let influence = learning_rate * strength;
            let input = self.inputs.row(row);
            let weight = self.weights.row(cluster);
            let delta = self.deltas.row_mut(cluster);
            for ((d, i), w) in delta.iter_mut().zip(input.iter()).zip(weight.iter()) {
                *d += influence * (i - w);
            }
        }
    }

    /// Averages the accumulated deltas into the weights and zeroes them.
    ///
    /// The divisor is the full delta-matrix size (`cluster_count * cols`),
    /// matching the reference batch-update convention.
    fn apply_deltas(&mut self) {
        self.deltas.scale(1.0 / self.deltas.len() as f32);
        self.weights.add_assign(&self.deltas);
        self.deltas.reset();
    }

    /// Sums the squared distance from every row to its winning prototype.
    fn total_squared_error(&self) -> f32 {
        (0..self.inputs.rows())
            .map(|r| {
                let winner = self.winners[r] as usize;
                math::distance_squared(self.inputs.row(r), self.weights.row(winner))
            })
            .sum()
    }

    /// Performs one training iteration.
    ///
    /// Visits every row in shuffled order, accumulates deltas, applies the
    /// batched update, and tests the error delta against the convergence
    /// threshold.
    pub fn iterate(&mut self) -> TrainingState {
        let learning_rate = self.effective_learning_rate();

        for k in 0..self.order.len() {
            let row = self.order[k];
            let winner = self.find_winner(self.inputs.row(row));
            self.accumulate_deltas(row, winner, learning_rate);
            self.winners[row] = winner as u32;
        }

        self.apply_deltas();

        let error = self.total_squared_error();
        let delta_error = (error - self.last_error).abs();
        self.last_error = error;

        if delta_error < self.config.error_threshold {
            TrainingState::Converged
        } else {
            self.iteration += 1;
            TrainingState::Running
        }
    }
}
