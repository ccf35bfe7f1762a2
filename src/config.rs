//! Ellipsoid Factor Configuration and Builder
//!
//! This module provides the parameters of an ellipsoid factor run. The same
//! configuration applied to the same volume always produces the same
//! ellipsoids and the same voxel assignment.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EllipsoidFactorError, Result};

/// Options for the closest-surface Newton-Raphson solver
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Stop when the change between consecutive angle estimates drops below this
    pub tolerance: f64,
    /// Hard cap on Newton iterations; the best estimate is returned when reached
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-12,
            max_iterations: 100,
        }
    }
}

/// Configuration for an ellipsoid factor run
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
///
/// let config = EllipsoidFactorConfigBuilder::new()
///     .ridge_fraction(0.6)
///     .unwrap()
///     .spiral_directions(20)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.spiral_directions, 20);
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: EllipsoidFactorConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidFactorConfig {
    /// Fraction of the maximum ridge value a voxel must exceed to become a seed
    ///
    /// - 1.0: nothing can exceed the maximum, no seeds
    /// - 0.8: default, only the strongest medial-axis voxels
    /// - 0.2: many seeds, slow
    pub ridge_fraction: f64,

    /// Number of spiral directions used both for casting contact rays and for
    /// validating fitted ellipsoids (the six axis directions are always added)
    pub spiral_directions: usize,

    /// Closest-surface solver settings
    pub solver: SolverOptions,

    /// Upper bound on the contact combinations fitted per seed
    ///
    /// `None` fits every combination. With a bound, a deterministic subset is
    /// drawn using `sampling_seed`.
    pub max_combinations_per_seed: Option<usize>,

    /// Seed for the combination subsampling generator
    pub sampling_seed: u64,

    /// Run the per-seed and per-slice phases on the rayon pool
    ///
    /// Ignored when the crate is built without the `parallel` feature.
    pub parallel: bool,
}

impl Default for EllipsoidFactorConfig {
    fn default() -> Self {
        Self {
            ridge_fraction: 0.8,
            spiral_directions: 30,
            solver: SolverOptions::default(),
            max_combinations_per_seed: None,
            sampling_seed: 0,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

/// Builder for creating [`EllipsoidFactorConfig`] with validation
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
///
/// let config = EllipsoidFactorConfigBuilder::new()
///     .max_combinations_per_seed(5_000)
///     .unwrap()
///     .sampling_seed(7)
///     .parallel(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_combinations_per_seed, Some(5_000));
/// ```
#[derive(Debug, Clone)]
pub struct EllipsoidFactorConfigBuilder {
    config: EllipsoidFactorConfig,
}

impl EllipsoidFactorConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - ridge_fraction: 0.8
    /// - spiral_directions: 30
    /// - solver: tolerance 1e-12, 100 iterations
    /// - max_combinations_per_seed: None (all combinations)
    /// - sampling_seed: 0
    /// - parallel: true when the `parallel` feature is enabled
    pub fn new() -> Self {
        Self {
            config: EllipsoidFactorConfig::default(),
        }
    }

    /// Set the ridge retention fraction
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` unless `0 < fraction <= 1`
    pub fn ridge_fraction(mut self, fraction: f64) -> Result<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "ridge fraction must be in (0, 1] (got {})",
                fraction
            )));
        }
        self.config.ridge_fraction = fraction;
        Ok(self)
    }

    /// Set the number of spiral sampling directions
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `count <= 2`
    pub fn spiral_directions(mut self, count: usize) -> Result<Self> {
        if count <= 2 {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "spiral direction count must be > 2 (got {})",
                count
            )));
        }
        self.config.spiral_directions = count;
        Ok(self)
    }

    /// Set the closest-surface solver tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the tolerance is not a positive finite number
    pub fn solver_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "solver tolerance must be positive (got {})",
                tolerance
            )));
        }
        self.config.solver.tolerance = tolerance;
        Ok(self)
    }

    /// Set the closest-surface solver iteration cap
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `iterations == 0`
    pub fn solver_max_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(EllipsoidFactorError::InvalidArgument(
                "solver needs at least one iteration".to_string(),
            ));
        }
        self.config.solver.max_iterations = iterations;
        Ok(self)
    }

    /// Bound the number of contact combinations fitted per seed
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `limit == 0`
    pub fn max_combinations_per_seed(mut self, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(EllipsoidFactorError::InvalidArgument(
                "combination limit must be positive".to_string(),
            ));
        }
        self.config.max_combinations_per_seed = Some(limit);
        Ok(self)
    }

    /// Set the seed of the combination subsampling generator
    pub fn sampling_seed(mut self, seed: u64) -> Self {
        self.config.sampling_seed = seed;
        self
    }

    /// Enable or disable the rayon-backed phases
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.config.parallel = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EllipsoidFactorConfig> {
        Ok(self.config)
    }
}

impl Default for EllipsoidFactorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EllipsoidFactorConfigBuilder::new().build().unwrap();
        assert_eq!(config.ridge_fraction, 0.8);
        assert_eq!(config.spiral_directions, 30);
        assert_eq!(config.solver.tolerance, 1.0e-12);
        assert_eq!(config.solver.max_iterations, 100);
        assert_eq!(config.max_combinations_per_seed, None);
        assert_eq!(config, EllipsoidFactorConfig::default());
    }

    #[test]
    fn test_builder_custom() {
        let config = EllipsoidFactorConfigBuilder::new()
            .ridge_fraction(0.5)
            .unwrap()
            .spiral_directions(12)
            .unwrap()
            .solver_tolerance(1e-9)
            .unwrap()
            .solver_max_iterations(20)
            .unwrap()
            .sampling_seed(99)
            .parallel(false)
            .build()
            .unwrap();

        assert_eq!(config.ridge_fraction, 0.5);
        assert_eq!(config.spiral_directions, 12);
        assert_eq!(config.solver.tolerance, 1e-9);
        assert_eq!(config.solver.max_iterations, 20);
        assert_eq!(config.sampling_seed, 99);
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder_invalid_ridge_fraction() {
        assert!(EllipsoidFactorConfigBuilder::new().ridge_fraction(0.0).is_err());
        assert!(EllipsoidFactorConfigBuilder::new().ridge_fraction(1.5).is_err());
        assert!(EllipsoidFactorConfigBuilder::new().ridge_fraction(f64::NAN).is_err());
        assert!(EllipsoidFactorConfigBuilder::new().ridge_fraction(1.0).is_ok());
    }

    #[test]
    fn test_builder_invalid_direction_count() {
        let result = EllipsoidFactorConfigBuilder::new().spiral_directions(2);
        assert!(matches!(result, Err(EllipsoidFactorError::InvalidArgument(_))));
        assert!(EllipsoidFactorConfigBuilder::new().spiral_directions(3).is_ok());
    }

    #[test]
    fn test_builder_invalid_solver_options() {
        assert!(EllipsoidFactorConfigBuilder::new().solver_tolerance(0.0).is_err());
        assert!(EllipsoidFactorConfigBuilder::new().solver_tolerance(-1.0).is_err());
        assert!(EllipsoidFactorConfigBuilder::new().solver_max_iterations(0).is_err());
    }

    #[test]
    fn test_builder_invalid_combination_limit() {
        assert!(EllipsoidFactorConfigBuilder::new().max_combinations_per_seed(0).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = EllipsoidFactorConfigBuilder::new()
            .max_combinations_per_seed(100)
            .unwrap()
            .sampling_seed(12345)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: EllipsoidFactorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
