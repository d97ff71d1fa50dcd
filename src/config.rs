//! Configuration for the Vigil clustering pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Human-readable name for this run.
    pub name: String,

    /// Dataset generation configuration.
    pub generator: GeneratorConfig,

    /// SOM (Self-Organizing Map) training configuration.
    pub som: SomConfig,
}

/// Dataset generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Name of the generator function ("test", "paths", or "csv").
    pub function: String,

    /// Source file for generators that read external data (e.g. "csv").
    pub source_file: Option<String>,

    /// Output path for the raw tagged dataset.
    pub raw_data_file: String,

    /// Output path for the featurized dataset.
    pub featurized_data_file: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            function: "test".to_string(),
            source_file: None,
            raw_data_file: "raw.dat".to_string(),
            featurized_data_file: "featurized.dat".to_string(),
        }
    }
}

/// Self-Organizing Map training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Base learning rate before decay.
    /// Default: 0.1.
    pub learning_rate: f32,

    /// Iteration at which the decayed learning rate reaches zero.
    /// Default: 1000.
    pub decay_rate: f32,

    /// Number of clusters (weight vectors) to train.
    /// Default: 2.
    pub cluster_count: usize,

    /// Convergence threshold on the change in total squared error.
    /// Default: 1e-5.
    pub error_threshold: f32,

    /// Random seed for reproducibility.
    /// Default: None (random).
    pub seed: Option<u64>,

    /// Name of the neighborhood function ("linear" or "none").
    /// Default: "linear".
    pub neighborhood: String,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            decay_rate: 1000.0,
            cluster_count: 2,
            error_threshold: 1e-5,
            seed: None,
            neighborhood: "linear".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generator.function, "test");
        assert_eq!(config.som.cluster_count, 2);
        assert_eq!(config.som.neighborhood, "linear");
        assert!(config.som.seed.is_none());
    }

    #[test]
    fn test_decay_defaults() {
        let som = SomConfig::default();
        assert!(som.learning_rate > 0.0);
        assert!(som.decay_rate > 0.0);
        assert!(som.error_threshold > 0.0);
    }
}
