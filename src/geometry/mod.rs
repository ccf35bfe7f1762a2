//! Ellipsoid geometry primitives
//!
//! Stateless building blocks shared by fitting, validation and assignment:
//! the [`Ellipsoid`] value type, the point-in-ellipsoid test, the
//! closest-surface distance solver and the foreground probe along a ray.

mod containment;
mod distance;
mod ellipsoid;

pub use containment::{inside_test, surface_containment_test, VOXEL_ROUNDING_SHRINK};
pub use distance::{closest_surface_distance, solve_closest_surface_point, SurfaceDistance};
pub use ellipsoid::Ellipsoid;
