//! Flat-buffer numeric containers used throughout the pipeline.
//!
//! A [`Matrix`] is a dense, row-major `f32` buffer with explicit dimensions.
//! Rows are handed out as plain slices; call sites carry `(matrix, row index)`
//! pairs rather than reconstructing indices from pointers.

use serde::{Deserialize, Serialize};

/// Norms below this are treated as zero when normalizing.
const NORM_EPSILON: f32 = 1e-10;

/// A dense, row-major matrix of `f32` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    /// Flat storage, `rows * cols` entries.
    data: Vec<f32>,
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Wraps an existing flat buffer as a matrix.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(data: Vec<f32>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Buffer length must match shape");
        Self { data, rows, cols }
    }

    /// Returns the number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the total number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks whether the matrix has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns row `r` as a slice.
    #[inline]
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Returns row `r` as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [f32] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Returns the flat underlying buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Multiplies every entry by `scalar`.
    pub fn scale(&mut self, scalar: f32) {
        for v in &mut self.data {
            *v *= scalar;
        }
    }

    /// Adds `other` entry-wise into this matrix.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn add_assign(&mut self, other: &Matrix) {
        assert_eq!(self.rows, other.rows, "Row counts must match");
        assert_eq!(self.cols, other.cols, "Column counts must match");
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }

    /// Resets every entry to zero.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
    }
}

/// Computes the Euclidean (L2) length of a vector.
pub fn length(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalizes a vector to unit length in place.
///
/// Vectors with near-zero norm are left unchanged.
pub fn normalize(v: &mut [f32]) {
    let norm = length(v);
    if norm > NORM_EPSILON {
        for x in v {
            *x /= norm;
        }
    }
}

/// Computes the squared Euclidean distance between two vectors.
#[inline]
pub fn distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Computes the Euclidean distance between two vectors.
#[inline]
pub fn distance(a: &[f32], b: &[f32]) -> f32 {
    distance_squared(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let m = Matrix::zeros(3, 4);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 4);
        assert_eq!(m.len(), 12);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_row_access() {
        let m = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_row_mut() {
        let mut m = Matrix::zeros(2, 2);
        m.row_mut(1)[0] = 7.0;
        assert_eq!(m.row(1), &[7.0, 0.0]);
        assert_eq!(m.row(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_scale_and_add() {
        let mut m = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        m.scale(0.5);
        assert_eq!(m.as_slice(), &[0.5, 1.0, 1.5, 2.0]);

        let other = Matrix::from_vec(vec![1.0; 4], 2, 2);
        m.add_assign(&other);
        assert_eq!(m.as_slice(), &[1.5, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn test_reset() {
        let mut m = Matrix::from_vec(vec![1.0, 2.0], 1, 2);
        m.reset();
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_length() {
        assert!((length(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((length(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_idempotent() {
        let mut v = vec![1.0 / 2.0_f32.sqrt(), 1.0 / 2.0_f32.sqrt()];
        let before = v.clone();
        normalize(&mut v);
        assert!((v[0] - before[0]).abs() < 1e-6);
        assert!((v[1] - before[1]).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_distance() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert!((distance(&a, &b) - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert!((distance_squared(&a, &b) - 2.0).abs() < 1e-6);
    }
}
