//! Point-in-ellipsoid and surface-in-foreground tests

use glam::DVec3;

use crate::geometry::Ellipsoid;
use crate::grid::VoxelGrid;

/// Semi-axis reduction applied before probing the foreground: the length of
/// a voxel diagonal, √3
pub const VOXEL_ROUNDING_SHRINK: f64 = 1.732_050_807_568_877_2;

/// Whether `point` lies strictly inside `ellipsoid`
///
/// Points farther than the longest semi-axis from the centroid (per axis or
/// in length) are rejected before the frame change.
#[inline]
pub fn inside_test(point: DVec3, ellipsoid: &Ellipsoid) -> bool {
    let c = ellipsoid.c();
    let offset = point - ellipsoid.centroid();
    if offset.abs().max_element() > c || offset.length_squared() > c * c {
        return false;
    }

    let local = ellipsoid.orientation().transpose() * offset;
    let [a, b, c] = ellipsoid.semi_axes();
    local.x * local.x / (a * a) + local.y * local.y / (b * b) + local.z * local.z / (c * c) < 1.0
}

impl Ellipsoid {
    /// Whether `point` lies strictly inside; see [`inside_test`]
    #[inline]
    pub fn contains(&self, point: DVec3) -> bool {
        inside_test(point, self)
    }
}

/// Whether the shrunk surface point along `direction` lands in foreground
///
/// Surface points outside the grid count as foreground, so an ellipsoid is
/// never penalized for touching the image border.
pub fn surface_containment_test<G>(grid: &G, ellipsoid: &Ellipsoid, direction: DVec3) -> bool
where
    G: VoxelGrid + ?Sized,
{
    let point = ellipsoid.surface_point_along(direction, VOXEL_ROUNDING_SHRINK);
    grid.sample(point).unwrap_or(true)
}
