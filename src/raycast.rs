//! Unit-step ray marching through a voxel grid

use glam::DVec3;

use crate::grid::{voxel_index, VoxelGrid};

/// March from `origin` along `direction` to the first background crossing
///
/// The position advances by one unit step at a time and is mapped to a voxel
/// by truncation, without sub-voxel interpolation. The first position whose
/// voxel is background or outside the grid is returned. An origin that is
/// already in background (or outside the grid) is returned unchanged, as is
/// any origin when `direction` is zero or `origin` is not finite.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
/// use glam::DVec3;
///
/// let dims = Dimensions::new(10, 10, 10).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |x, _, _| x < 6);
/// let contact = cast_ray(&volume, DVec3::new(2.5, 5.5, 5.5), DVec3::X);
/// assert_eq!(contact, DVec3::new(6.5, 5.5, 5.5));
/// ```
pub fn cast_ray<G>(grid: &G, origin: DVec3, direction: DVec3) -> DVec3
where
    G: VoxelGrid + ?Sized,
{
    let step = direction.normalize_or_zero();
    let mut position = origin;
    if step == DVec3::ZERO || !origin.is_finite() || !is_foreground(grid, position) {
        return position;
    }

    loop {
        position += step;
        if !is_foreground(grid, position) {
            return position;
        }
    }
}

#[inline]
fn is_foreground<G: VoxelGrid + ?Sized>(grid: &G, position: DVec3) -> bool {
    let [x, y, z] = voxel_index(position);
    grid.get(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BinaryVolume, Dimensions};
    use crate::sampling::generate_directions;

    fn half_space() -> BinaryVolume {
        let dims = Dimensions::new(16, 16, 16).unwrap();
        BinaryVolume::from_fn(dims, |_, _, z| z < 8)
    }

    #[test]
    fn test_one_voxel_inside_flat_boundary() {
        let volume = half_space();
        let origin = DVec3::new(8.5, 8.5, 7.5);
        let contact = cast_ray(&volume, origin, DVec3::Z);
        assert!(((contact - origin).length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_background_origin_is_returned_unchanged() {
        let volume = half_space();
        let origin = DVec3::new(3.5, 3.5, 12.5);
        assert_eq!(cast_ray(&volume, origin, DVec3::NEG_Z), origin);

        let outside = DVec3::new(-3.0, 3.5, 3.5);
        assert_eq!(cast_ray(&volume, outside, DVec3::X), outside);
    }

    #[test]
    fn test_zero_direction_does_not_march() {
        let volume = half_space();
        let origin = DVec3::new(3.5, 3.5, 3.5);
        assert_eq!(cast_ray(&volume, origin, DVec3::ZERO), origin);
    }

    #[test]
    fn test_ray_leaves_grid() {
        let volume = half_space();
        let contact = cast_ray(&volume, DVec3::new(8.5, 8.5, 2.5), DVec3::NEG_Z);
        assert_eq!(contact, DVec3::new(8.5, 8.5, -1.5));

        let contact = cast_ray(&volume, DVec3::new(8.5, 8.5, 2.5), DVec3::X);
        assert_eq!(contact, DVec3::new(16.5, 8.5, 2.5));
    }

    #[test]
    fn test_low_face_contact_uses_truncation() {
        let dims = Dimensions::new(10, 10, 10).unwrap();
        let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
        // -0.5 still truncates into voxel 0; the first index off the grid is -1
        let contact = cast_ray(&volume, DVec3::new(0.5, 5.5, 5.5), DVec3::NEG_X);
        assert_eq!(contact, DVec3::new(-1.5, 5.5, 5.5));

        let contact = cast_ray(&volume, DVec3::new(9.5, 5.5, 5.5), DVec3::X);
        assert_eq!(contact, DVec3::new(10.5, 5.5, 5.5));
    }

    #[test]
    fn test_non_finite_origin_does_not_march() {
        let dims = Dimensions::new(4, 4, 4).unwrap();
        let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
        let origin = DVec3::new(f64::NAN, 0.5, 0.5);
        let contact = cast_ray(&volume, origin, DVec3::X);
        assert!(contact.x.is_nan());
        assert_eq!((contact.y, contact.z), (0.5, 0.5));

        let origin = DVec3::new(f64::INFINITY, 0.5, 0.5);
        assert_eq!(cast_ray(&volume, origin, DVec3::NEG_X), origin);
    }

    #[test]
    fn test_contacts_land_in_background() {
        let volume = half_space();
        let origin = DVec3::new(8.5, 8.5, 4.5);
        for direction in generate_directions(50).unwrap() {
            let contact = cast_ray(&volume, origin, direction);
            assert!(volume.sample(contact) != Some(true));
            // The previous step was still inside the foreground
            assert_eq!(volume.sample(contact - direction), Some(true));
        }
    }
}
