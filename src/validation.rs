//! Rejection of ellipsoids that leave the foreground

use glam::DVec3;

use crate::geometry::{surface_containment_test, Ellipsoid};
use crate::grid::VoxelGrid;

/// Whether the (shrunk) surface of `ellipsoid` stays in foreground
///
/// Probes the six signed principal axes followed by `sample_directions`;
/// a single failing probe rejects. An ellipsoid whose centroid lies outside
/// the grid is rejected outright.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
/// use rust_ellipsoid_factor::sampling::seeding_directions;
/// use glam::DVec3;
///
/// let dims = Dimensions::new(20, 20, 20).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |_, _, z| z < 10);
/// let directions = seeding_directions(30).unwrap();
///
/// let inside = Ellipsoid::sphere(DVec3::new(10.0, 10.0, 5.0), 4.0).unwrap();
/// assert!(wholly_contained_in_foreground(&volume, &inside, &directions));
///
/// let crossing = Ellipsoid::sphere(DVec3::new(10.0, 10.0, 8.0), 6.0).unwrap();
/// assert!(!wholly_contained_in_foreground(&volume, &crossing, &directions));
/// ```
pub fn wholly_contained_in_foreground<G>(grid: &G, ellipsoid: &Ellipsoid, sample_directions: &[DVec3]) -> bool
where
    G: VoxelGrid + ?Sized,
{
    if grid.sample(ellipsoid.centroid()).is_none() {
        return false;
    }

    ellipsoid
        .principal_directions()
        .iter()
        .chain(sample_directions)
        .all(|&direction| surface_containment_test(grid, ellipsoid, direction))
}
