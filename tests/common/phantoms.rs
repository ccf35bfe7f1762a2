use rust_ellipsoid_factor::{voxel_center, BinaryVolume, Dimensions, Field};

/// Ball of `radius` around the centre of voxel `(c, c, c)` in a `size³` grid
pub fn ball(size: usize, c: usize, radius: f64) -> BinaryVolume {
    let dims = Dimensions::new(size, size, size).unwrap();
    let centre = voxel_center(c, c, c);
    BinaryVolume::from_fn(dims, |x, y, z| (voxel_center(x, y, z) - centre).length() <= radius)
}

/// Axis-aligned box of voxels `lo..hi` on every axis in a `size³` grid
pub fn cube(size: usize, lo: usize, hi: usize) -> BinaryVolume {
    let dims = Dimensions::new(size, size, size).unwrap();
    BinaryVolume::from_fn(dims, |x, y, z| {
        (lo..hi).contains(&x) && (lo..hi).contains(&y) && (lo..hi).contains(&z)
    })
}

/// A rod along x joined to a plate normal to z
pub fn rod_and_plate() -> BinaryVolume {
    let dims = Dimensions::new(32, 24, 24).unwrap();
    BinaryVolume::from_fn(dims, |x, y, z| {
        let (dy, dz) = (y as f64 - 11.5, z as f64 - 11.5);
        let rod = (2..30).contains(&x) && dy * dy + dz * dz <= 9.0;
        let plate = (4..20).contains(&x) && (3..21).contains(&y) && (16..19).contains(&z);
        rod || plate
    })
}

/// Ridge field that seeds exactly one voxel
pub fn single_seed(dims: Dimensions, x: usize, y: usize, z: usize) -> Field<f64> {
    let mut ridge = Field::filled(dims, 0.0);
    ridge.set(x, y, z, 1.0);
    ridge
}
