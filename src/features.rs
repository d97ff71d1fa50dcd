//! Feature extraction: turns a decoded record stream into a dense matrix.
//!
//! Float records contribute their value unmodified. String records are
//! treated as filesystem paths and contribute one boolean prefix-membership
//! indicator per entry in [`PATH_PREFIXES`]. New per-kind derivations belong
//! here; the codec stays oblivious.
//!
//! ## Featurized File Layout
//!
//! ```text
//! +--------------------------+
//! | rows (4, LE u32)         |
//! +--------------------------+
//! | features_per_row (4, LE) |
//! +--------------------------+
//! | packed LE f32 data       |  rows * features_per_row entries, no padding
//! +--------------------------+
//! ```

use crate::codec::{Decoder, RecordKind};
use crate::error::{Result, VigilError};
use crate::math::Matrix;
use log::info;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Path prefixes checked when featurizing string records.
///
/// Each prefix yields one boolean feature (1.0 if the path starts with it).
pub const PATH_PREFIXES: [&str; 4] = ["/bin", "/usr", "/sbin", "/Users"];

/// Header size of a featurized file in bytes.
const FEATURIZED_HEADER_SIZE: usize = 8;

/// Header of a featurized dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturizedHeader {
    /// Number of datapoints.
    pub rows: u32,
    /// Number of features per datapoint.
    pub features_per_row: u32,
}

impl FeaturizedHeader {
    /// Writes the header to bytes.
    pub fn to_bytes(self) -> [u8; FEATURIZED_HEADER_SIZE] {
        let mut bytes = [0u8; FEATURIZED_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.rows.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.features_per_row.to_le_bytes());
        bytes
    }

    /// Reads a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FEATURIZED_HEADER_SIZE {
            return Err(VigilError::HeaderMismatch(
                "featurized header too short".to_string(),
            ));
        }
        Ok(Self {
            rows: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            features_per_row: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

/// Derives boolean prefix-membership features from a path string.
fn path_features(path: &str) -> [f32; PATH_PREFIXES.len()] {
    let mut features = [0.0; PATH_PREFIXES.len()];
    for (i, prefix) in PATH_PREFIXES.iter().enumerate() {
        if path.starts_with(prefix) {
            features[i] = 1.0;
        }
    }
    features
}

/// Drains a decoder, producing a feature matrix and its header.
///
/// Every row must contribute the same number of features; a mismatch is a
/// structural error, not silently truncated.
pub fn featurize(decoder: &mut Decoder) -> Result<(FeaturizedHeader, Matrix)> {
    let mut data: Vec<f32> = Vec::new();
    let mut rows: u32 = 0;
    let mut features_per_row: Option<u32> = None;
    // Features seen since the last row marker.
    let mut running_count: u32 = 0;

    let close_row = |fixed: &mut Option<u32>, count: u32, row: u32| -> Result<()> {
        match *fixed {
            None => {
                *fixed = Some(count);
                Ok(())
            }
            Some(expected) if expected != count => Err(VigilError::Structural(format!(
                "row {row} has {count} features, expected {expected}"
            ))),
            Some(_) => Ok(()),
        }
    };

    while !decoder.is_done()? {
        let (header, payload) = decoder.next()?;
        match header.kind {
            RecordKind::Row => {
                if rows > 0 {
                    close_row(&mut features_per_row, running_count, rows - 1)?;
                }
                rows += 1;
                running_count = 0;
            }
            RecordKind::Float => {
                let value = f32::from_le_bytes(payload.try_into().map_err(|_| {
                    VigilError::HeaderMismatch(format!(
                        "float record with {} payload bytes",
                        payload.len()
                    ))
                })?);
                data.push(value);
                running_count += 1;
            }
            RecordKind::String => {
                // Drop the NUL terminator before interpreting.
                let end = payload.len().saturating_sub(1);
                let path = String::from_utf8_lossy(&payload[..end]);
                let derived = path_features(&path);
                data.extend_from_slice(&derived);
                running_count += derived.len() as u32;
            }
            RecordKind::End => break,
        }
    }

    if rows > 0 {
        close_row(&mut features_per_row, running_count, rows - 1)?;
    }

    let features_per_row = features_per_row.unwrap_or(0);
    if data.len() != (rows as usize) * (features_per_row as usize) {
        return Err(VigilError::Structural(format!(
            "{} features total do not fill {rows} rows of {features_per_row}",
            data.len()
        )));
    }

    info!("featurized {rows} rows, {features_per_row} features per row");

    let header = FeaturizedHeader {
        rows,
        features_per_row,
    };
    let matrix = Matrix::from_vec(data, rows as usize, features_per_row as usize);
    Ok((header, matrix))
}

/// Writes a featurized dataset to disk: header followed by packed floats.
pub fn write_featurized<P: AsRef<Path>>(
    path: P,
    header: FeaturizedHeader,
    matrix: &Matrix,
) -> Result<()> {
    let file = File::create(&path)
        .map_err(|_| VigilError::FileNotFound(path.as_ref().to_path_buf()))?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&header.to_bytes())?;
    for value in matrix.as_slice() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// A memory-mapped featurized dataset.
pub struct FeaturizedFile {
    mmap: Mmap,
    header: FeaturizedHeader,
}

impl FeaturizedFile {
    /// Opens and memory-maps a featurized file, validating its header against
    /// the file length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|_| VigilError::FileNotFound(path.as_ref().to_path_buf()))?;
        let mmap = unsafe { Mmap::map(&file)? };

        let header = FeaturizedHeader::from_bytes(&mmap)?;
        let expected = (header.rows as usize)
            .checked_mul(header.features_per_row as usize)
            .and_then(|entries| entries.checked_mul(4))
            .and_then(|data| data.checked_add(FEATURIZED_HEADER_SIZE))
            .ok_or_else(|| {
                VigilError::HeaderMismatch(format!(
                    "featurized header implies an impossible size: {} rows of {}",
                    header.rows, header.features_per_row
                ))
            })?;
        if mmap.len() < expected {
            return Err(VigilError::HeaderMismatch(format!(
                "featurized file is {} bytes, header implies {expected}",
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    /// Returns the header.
    pub fn header(&self) -> FeaturizedHeader {
        self.header
    }

    /// Copies the packed float data out into an owned matrix.
    pub fn matrix(&self) -> Matrix {
        let rows = self.header.rows as usize;
        let cols = self.header.features_per_row as usize;
        let data: Vec<f32> = self.mmap[FEATURIZED_HEADER_SIZE..FEATURIZED_HEADER_SIZE + rows * cols * 4]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Matrix::from_vec(data, rows, cols)
    }
}
