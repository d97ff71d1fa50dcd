//! Raw dataset generators.
//!
//! Generators write tagged record streams through an [`Encoder`]. They are
//! selected by name from the configuration; an unrecognized name is an error,
//! not a silent fallback.

use crate::codec::Encoder;
use crate::config::Config;
use crate::error::{Result, VigilError};
use log::info;

/// The 8 canonical 2-D points forming two linearly separable clusters.
const TEST_POINTS: [[f32; 2]; 8] = [
    [1.0, 1.0],
    [0.9, 0.9],
    [0.8, 1.0],
    [1.0, 0.75],
    [-1.0, -1.0],
    [-0.9, -0.9],
    [-0.75, -0.9],
    [-0.9, -0.75],
];

/// Filesystem paths exercising the string-record featurizer.
const TEST_PATHS: [&str; 8] = [
    "/usr/bin/ssh",
    "/usr/bin/grep",
    "/bin/mv",
    "/bin/zsh",
    "/Users/anomaly/build/gen",
    "/Users/anomaly/build/featurize",
    "/Users/anomaly/build/train",
    "/Users/anomaly/build/gui",
];

/// A named dataset generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// Two linearly separable 2-D point clusters.
    Test,
    /// Filesystem path strings.
    Paths,
    /// Numeric CSV parsed from an external file.
    Csv,
}

impl Generator {
    /// Resolves a generator by its configured name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "test" => Ok(Generator::Test),
            "paths" => Ok(Generator::Paths),
            "csv" => Ok(Generator::Csv),
            other => Err(VigilError::UnknownGenerator(other.to_string())),
        }
    }
}

/// Encodes the canonical two-cluster point set.
pub fn gen_test(encoder: &mut Encoder) -> Result<()> {
    for point in TEST_POINTS {
        encoder.write_row_marker()?;
        encoder.write_float(point[0])?;
        encoder.write_float(point[1])?;
    }
    encoder.write_end_marker()
}

/// Encodes the path-string dataset.
pub fn gen_paths(encoder: &mut Encoder) -> Result<()> {
    for path in TEST_PATHS {
        encoder.write_row_marker()?;
        encoder.write_string(path)?;
    }
    encoder.write_end_marker()
}

/// Encodes numeric CSV text, one row per line.
///
/// Fields that do not parse as floats (e.g. a trailing class label) are
/// skipped; lines with no numeric fields are skipped entirely.
pub fn gen_csv(encoder: &mut Encoder, text: &str) -> Result<()> {
    for line in text.lines() {
        let values: Vec<f32> = line
            .split(',')
            .filter_map(|field| field.trim().parse::<f32>().ok())
            .collect();
        if values.is_empty() {
            continue;
        }

        encoder.write_row_marker()?;
        for value in values {
            encoder.write_float(value)?;
        }
    }
    encoder.write_end_marker()
}

/// Runs the configured generator and flushes the raw dataset to its
/// configured output path.
pub fn generate(config: &Config, capacity: usize) -> Result<()> {
    let generator = Generator::from_name(&config.generator.function)?;
    info!(
        "generating data using {:?} into {}",
        generator, config.generator.raw_data_file
    );

    let mut encoder = Encoder::new(capacity)?;
    match generator {
        Generator::Test => gen_test(&mut encoder)?,
        Generator::Paths => gen_paths(&mut encoder)?,
        Generator::Csv => {
            let source = config.generator.source_file.as_ref().ok_or_else(|| {
                VigilError::Config("csv generator requires a source_file".to_string())
            })?;
            let text = std::fs::read_to_string(source)
                .map_err(|_| VigilError::FileNotFound(source.into()))?;
            gen_csv(&mut encoder, &text)?;
        }
    }

    encoder.flush_to_file(&config.generator.raw_data_file)
}
