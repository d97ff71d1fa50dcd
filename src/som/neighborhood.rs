//! Neighborhood functions for competitive-learning updates.

use crate::error::{Result, VigilError};

/// Maps (winning cluster, candidate cluster) to an update strength in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// Strength falls off linearly with cluster-index distance from the
    /// winner, reaching zero beyond a fixed cutoff.
    Linear,
    /// Only the winner itself is updated.
    None,
}

impl Neighborhood {
    /// Resolves a neighborhood function by its configured name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "linear" => Ok(Neighborhood::Linear),
            "none" => Ok(Neighborhood::None),
            other => Err(VigilError::UnknownNeighborhood(other.to_string())),
        }
    }

    /// Computes the update strength for `cluster` given the winning cluster.
    pub fn strength(&self, winner: usize, cluster: usize) -> f32 {
        match self {
            Neighborhood::Linear => {
                const MAX_DISTANCE: i64 = 2;
                const DECAY: f32 = 0.5;

                let distance = (cluster as i64 - winner as i64).abs();
                if distance > MAX_DISTANCE {
                    return 0.0;
                }
                1.0 - distance as f32 * DECAY
            }
            Neighborhood::None => {
                if cluster == winner {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Neighborhood::from_name("linear").unwrap(), Neighborhood::Linear);
        assert_eq!(Neighborhood::from_name("none").unwrap(), Neighborhood::None);
        assert!(matches!(
            Neighborhood::from_name("gaussian"),
            Err(VigilError::UnknownNeighborhood(_))
        ));
    }

    #[test]
    fn test_linear_falloff() {
        let ns = Neighborhood::Linear;
        assert_eq!(ns.strength(3, 3), 1.0);
        assert_eq!(ns.strength(3, 4), 0.5);
        assert_eq!(ns.strength(3, 2), 0.5);
        assert_eq!(ns.strength(3, 5), 0.0);
        assert_eq!(ns.strength(3, 1), 0.0);
        assert_eq!(ns.strength(3, 6), 0.0);
    }

    #[test]
    fn test_none_is_winner_only() {
        let ns = Neighborhood::None;
        assert_eq!(ns.strength(1, 1), 1.0);
        assert_eq!(ns.strength(1, 0), 0.0);
        assert_eq!(ns.strength(1, 2), 0.0);
    }
}
