//! Ellipsoid Factor analysis of binary volumes
//!
//! A standalone library that characterizes local 3D shape in a binary voxel
//! image: maximal inscribed ellipsoids are grown from seed points on the
//! medial ridge of the foreground, and every foreground voxel is labelled by
//! the largest ellipsoid containing it. The ellipsoid factor `a/b − b/c`
//! then ranges from −1 (plate-like) to +1 (rod-like).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_ellipsoid_factor::*;
//!
//! // A 40×40×40 volume holding a thick rod along z
//! let dims = Dimensions::new(40, 40, 40).unwrap();
//! let volume = BinaryVolume::from_fn(dims, |x, y, _| {
//!     let (dx, dy) = (x as f64 - 20.0, y as f64 - 20.0);
//!     dx * dx + dy * dy < 36.0
//! });
//!
//! let config = EllipsoidFactorConfigBuilder::new()
//!     .ridge_fraction(0.8).unwrap()
//!     .max_combinations_per_seed(2_000).unwrap()
//!     .build().unwrap();
//!
//! let analysis = EllipsoidFactorAnalysis::run(&volume, config).unwrap();
//! let fields = analysis.derived_fields();
//! println!("{} ellipsoids, EF at centre {}", analysis.ellipsoids().len(), fields.ellipsoid_factor.get(20, 20, 20));
//! ```
//!
//! # Features
//!
//! - `parallel` (default): Runs the per-seed search and per-slice assignment on the rayon pool
//! - `spatial-index` (default): Enables point-to-ellipsoid lookups using a KD-tree
//! - `serde`: Enables serialization support for configuration, ellipsoids and summaries

// Modules
pub mod error;
pub mod config;
pub mod cancel;
pub mod grid;
pub mod sampling;
pub mod geometry;
pub mod raycast;
pub mod ridge;
pub mod seeds;
pub mod fitting;
pub mod validation;
pub mod assignment;
pub mod outputs;
pub mod analysis;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{DegenerateFit, EllipsoidFactorError, Result};
pub use config::{EllipsoidFactorConfig, EllipsoidFactorConfigBuilder, SolverOptions};
pub use cancel::CancellationToken;
pub use grid::{voxel_center, BinaryVolume, Dimensions, Field, VoxelGrid, UNASSIGNED};
pub use sampling::{axis_directions, generate_directions, seeding_directions};
pub use geometry::{
    closest_surface_distance, inside_test, solve_closest_surface_point, surface_containment_test, Ellipsoid,
    SurfaceDistance, VOXEL_ROUNDING_SHRINK,
};
pub use raycast::cast_ray;
pub use ridge::ridge_field;
pub use seeds::extract_seed_points;
pub use fitting::{find_ellipsoids, fit_ellipsoid, ContactPoint, FitOutcome, SeedSearch, SortedEllipsoids};
pub use validation::wholly_contained_in_foreground;
pub use assignment::{assign_voxels, AssignmentOutcome};
pub use outputs::{paint_labels, DerivedFields, RunSummary};
pub use analysis::EllipsoidFactorAnalysis;

#[cfg(feature = "spatial-index")]
pub use spatial::EllipsoidIndex;

// Re-export glam vector types for convenience
pub use glam::{DMat3, DVec3};
