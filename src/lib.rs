//! # Vigil - Anomaly Clustering Pipeline
//!
//! Vigil turns streams of raw, heterogeneous records (numeric scalars, path
//! strings) into fixed-width feature vectors, then clusters them with an
//! unsupervised competitive-learning algorithm (a batch Self-Organizing Map
//! variant).
//!
//! ## Key Features
//!
//! - **Self-describing binary record protocol** with tagged, variable-size
//!   records, explicit row delimiters, and magic-number validation
//! - **Feature extraction** from float and path-string records into a dense,
//!   row-consistent matrix
//! - **Batch SOM training** with neighborhood-weighted updates, a decayed
//!   learning rate, and an error-delta convergence test
//! - **Flat binary featurized format** for handing data between pipeline
//!   stages
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vigil::{codec::Decoder, features, som, SomConfig};
//!
//! // Decode and featurize a raw dataset
//! let mut decoder = Decoder::open("raw.dat")?;
//! let (header, matrix) = features::featurize(&mut decoder)?;
//!
//! // Cluster it
//! let config = SomConfig { seed: Some(42), ..Default::default() };
//! let outcome = som::train(&config, &header, matrix)?;
//!
//! for (row, cluster) in outcome.winners.iter().enumerate() {
//!     println!("input {row}: cluster {cluster}");
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`math`] - flat-buffer vector and matrix containers
//! - [`codec`] - tagged binary record encoder/decoder
//! - [`features`] - record-stream featurization and the featurized file format
//! - [`gen`] - raw dataset generators
//! - [`som`] - the competitive-learning training core

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod error;
pub mod features;
pub mod gen;
pub mod math;
pub mod som;

// Re-export commonly used types
pub use codec::{Decoder, Encoder, RecordHeader, RecordKind};
pub use config::{Config, GeneratorConfig, SomConfig};
pub use error::{Result, VigilError};
pub use features::{featurize, FeaturizedFile, FeaturizedHeader};
pub use gen::Generator;
pub use math::Matrix;
pub use som::{Neighborhood, Som, TrainingOutcome, TrainingState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
