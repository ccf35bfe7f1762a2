//! Seed point extraction from a ridge field

use glam::DVec3;

use crate::error::{EllipsoidFactorError, Result};
use crate::grid::{voxel_center, BinaryVolume, Field, VoxelGrid};

/// Centres of the foreground voxels whose ridge value exceeds
/// `fraction · max(ridge)`
///
/// Ridge values at background voxels are ignored. Seeds come out in raster
/// order (x fastest, then y, then z). A ridge field with no positive value
/// in the foreground yields no seeds.
///
/// # Errors
///
/// Returns `InvalidArgument` if `fraction` is outside `(0, 1]` or the ridge
/// field does not have the volume's extent.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
///
/// let dims = Dimensions::new(3, 1, 1).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
/// let ridge = Field::from_vec(dims, vec![1.0, 5.0, 4.5]).unwrap();
/// let seeds = extract_seed_points(&volume, &ridge, 0.8).unwrap();
/// assert_eq!(seeds.len(), 2);
/// assert_eq!(seeds[0].x, 1.5);
/// ```
pub fn extract_seed_points(
    volume: &BinaryVolume,
    ridge: &Field<f64>,
    fraction: f64,
) -> Result<Vec<DVec3>> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(EllipsoidFactorError::InvalidArgument(format!(
            "ridge fraction must be in (0, 1] (got {})",
            fraction
        )));
    }
    let dims = volume.dimensions();
    if ridge.dimensions() != dims {
        return Err(EllipsoidFactorError::InvalidArgument(format!(
            "ridge field is {:?} but the volume is {:?}",
            ridge.dimensions(),
            dims
        )));
    }

    let masked: Vec<f64> = ridge
        .as_slice()
        .iter()
        .zip(volume.as_slice())
        .map(|(&r, &foreground)| if foreground { r } else { 0.0 })
        .collect();

    let max = masked.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Ok(Vec::new());
    }

    let threshold = fraction * max;
    Ok(masked
        .iter()
        .enumerate()
        .filter(|(_, &r)| r > threshold)
        .map(|(index, _)| {
            let [x, y, z] = dims.coordinates(index);
            voxel_center(x, y, z)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dimensions;

    #[test]
    fn test_background_ridge_is_ignored() {
        let dims = Dimensions::new(4, 1, 1).unwrap();
        let volume = BinaryVolume::from_fn(dims, |x, _, _| x != 3);
        let ridge = Field::from_vec(dims, vec![1.0, 2.0, 3.0, 100.0]).unwrap();
        // Masked maximum is 3, so the threshold is 1.5 rather than 50
        let seeds = extract_seed_points(&volume, &ridge, 0.5).unwrap();
        assert_eq!(seeds, vec![DVec3::new(1.5, 0.5, 0.5), DVec3::new(2.5, 0.5, 0.5)]);

        let seeds = extract_seed_points(&volume, &ridge, 0.7).unwrap();
        assert_eq!(seeds, vec![DVec3::new(2.5, 0.5, 0.5)]);
    }

    #[test]
    fn test_raster_order() {
        let dims = Dimensions::new(2, 2, 2).unwrap();
        let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
        let ridge = Field::filled(dims, 1.0);
        // Full fraction keeps nothing; smaller keeps every voxel
        assert!(extract_seed_points(&volume, &ridge, 1.0).unwrap().is_empty());

        let seeds = extract_seed_points(&volume, &Field::from_fn(dims, |x, y, z| {
            1.0 + (x + 2 * y + 4 * z) as f64
        }), 0.1)
        .unwrap();
        assert_eq!(seeds.len(), 8);
        assert_eq!(seeds[0], DVec3::new(0.5, 0.5, 0.5));
        assert_eq!(seeds[1], DVec3::new(1.5, 0.5, 0.5));
        assert_eq!(seeds[2], DVec3::new(0.5, 1.5, 0.5));
        assert_eq!(seeds[4], DVec3::new(0.5, 0.5, 1.5));
    }

    #[test]
    fn test_zero_ridge_gives_no_seeds() {
        let dims = Dimensions::new(3, 3, 3).unwrap();
        let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
        let ridge = Field::filled(dims, 0.0);
        assert!(extract_seed_points(&volume, &ridge, 0.8).unwrap().is_empty());

        let empty = BinaryVolume::from_fn(dims, |_, _, _| false);
        assert!(extract_seed_points(&empty, &Field::filled(dims, 4.0), 0.8)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_rejects_invalid_input() {
        let dims = Dimensions::new(3, 3, 3).unwrap();
        let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
        let ridge = Field::filled(dims, 1.0);
        assert!(extract_seed_points(&volume, &ridge, 0.0).is_err());
        assert!(extract_seed_points(&volume, &ridge, 1.2).is_err());

        let other = Field::filled(Dimensions::new(3, 3, 2).unwrap(), 1.0);
        assert!(matches!(
            extract_seed_points(&volume, &other, 0.5),
            Err(EllipsoidFactorError::InvalidArgument(_))
        ));
    }
}
