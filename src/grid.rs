//! Voxel grids and dense per-voxel fields
//!
//! Grid coordinates are raw voxel indices; voxel `(x, y, z)` covers the unit
//! cube `[x, x+1) × [y, y+1) × [z, z+1)` and has its centre at `+0.5`.
//! Fields are stored in raster order: x fastest, then y, then z.

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EllipsoidFactorError, Result};

/// Identity value of a voxel that belongs to no ellipsoid
pub const UNASSIGNED: i32 = -1;

/// Extent of a 3D voxel grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dimensions {
    /// Create dimensions, rejecting empty extents
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "grid extent must be non-empty (got {}x{}x{})",
                width, height, depth
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Create dimensions from an arbitrary shape, rejecting anything but 3D
    pub fn from_shape(shape: &[usize]) -> Result<Self> {
        match *shape {
            [width, height, depth] => Self::new(width, height, depth),
            _ => Err(EllipsoidFactorError::InvalidArgument(format!(
                "expected a 3D grid, got {} dimensions",
                shape.len()
            ))),
        }
    }

    /// Total number of voxels
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Always false for validated dimensions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of voxels in one z-slice
    #[inline]
    pub fn slice_len(&self) -> usize {
        self.width * self.height
    }

    /// Whether a signed voxel index lies inside the grid
    #[inline]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    /// Linear raster index of an in-bounds voxel
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Voxel coordinates of a linear raster index
    #[inline]
    pub fn coordinates(&self, index: usize) -> [usize; 3] {
        let x = index % self.width;
        let y = (index / self.width) % self.height;
        let z = index / self.slice_len();
        [x, y, z]
    }

    /// Voxel containing a real-valued position, or `None` outside the grid
    pub fn voxel_of(&self, point: DVec3) -> Option<[usize; 3]> {
        let [x, y, z] = voxel_index(point);
        self.contains(x, y, z)
            .then(|| [x as usize, y as usize, z as usize])
    }
}

/// Signed voxel index of a real-valued position
///
/// Each coordinate is truncated toward zero, so positions in `(-1, 0)`
/// still index voxel 0.
#[inline]
pub fn voxel_index(point: DVec3) -> [i64; 3] {
    [point.x as i64, point.y as i64, point.z as i64]
}

/// Centre of voxel `(x, y, z)`
#[inline]
pub fn voxel_center(x: usize, y: usize, z: usize) -> DVec3 {
    DVec3::new(x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5)
}

/// Read-only binary voxel grid
///
/// Implementors report out-of-grid reads as background.
pub trait VoxelGrid: Sync {
    /// Grid extent
    fn dimensions(&self) -> Dimensions;

    /// Whether voxel `(x, y, z)` is foreground; false outside the grid
    fn get(&self, x: i64, y: i64, z: i64) -> bool;

    /// Foreground state of the voxel containing `point`, `None` outside the grid
    fn sample(&self, point: DVec3) -> Option<bool> {
        let [x, y, z] = voxel_index(point);
        self.dimensions()
            .contains(x, y, z)
            .then(|| self.get(x, y, z))
    }
}

/// Dense per-voxel values in raster order
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    dimensions: Dimensions,
    data: Vec<T>,
}

impl<T: Copy> Field<T> {
    /// Create a field with every voxel set to `value`
    pub fn filled(dimensions: Dimensions, value: T) -> Self {
        Self {
            dimensions,
            data: vec![value; dimensions.len()],
        }
    }

    /// Wrap raster-ordered data
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the data length does not match the extent
    pub fn from_vec(dimensions: Dimensions, data: Vec<T>) -> Result<Self> {
        if data.len() != dimensions.len() {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "field of {}x{}x{} needs {} values (got {})",
                dimensions.width,
                dimensions.height,
                dimensions.depth,
                dimensions.len(),
                data.len()
            )));
        }
        Ok(Self { dimensions, data })
    }

    /// Build a field by evaluating `f` at every voxel
    pub fn from_fn(dimensions: Dimensions, mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(dimensions.len());
        for z in 0..dimensions.depth {
            for y in 0..dimensions.height {
                for x in 0..dimensions.width {
                    data.push(f(x, y, z));
                }
            }
        }
        Self { dimensions, data }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Value at an in-bounds voxel
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.data[self.dimensions.index(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) {
        let index = self.dimensions.index(x, y, z);
        self.data[index] = value;
    }

    /// Raster-ordered values
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

/// Owned binary volume
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
///
/// let dims = Dimensions::new(4, 4, 4).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |x, _, _| x < 2);
/// assert!(volume.get(1, 0, 0));
/// assert!(!volume.get(2, 0, 0));
/// assert!(!volume.get(-1, 0, 0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryVolume {
    voxels: Field<bool>,
}

impl BinaryVolume {
    /// Wrap raster-ordered foreground flags
    pub fn new(dimensions: Dimensions, data: Vec<bool>) -> Result<Self> {
        Ok(Self {
            voxels: Field::from_vec(dimensions, data)?,
        })
    }

    /// Wrap raster-ordered flags of an arbitrary shape; only 3D is accepted
    pub fn from_shape(shape: &[usize], data: Vec<bool>) -> Result<Self> {
        Self::new(Dimensions::from_shape(shape)?, data)
    }

    /// Build a volume by evaluating a predicate at every voxel
    pub fn from_fn(dimensions: Dimensions, f: impl FnMut(usize, usize, usize) -> bool) -> Self {
        Self {
            voxels: Field::from_fn(dimensions, f),
        }
    }

    /// Interpret a grey-level volume as binary: non-zero is foreground
    pub fn from_u8(dimensions: Dimensions, data: &[u8]) -> Result<Self> {
        Self::new(dimensions, data.iter().map(|&v| v != 0).collect())
    }

    /// Number of foreground voxels
    pub fn foreground_count(&self) -> usize {
        self.voxels.as_slice().iter().filter(|&&v| v).count()
    }

    /// Raster-ordered foreground flags
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        self.voxels.as_slice()
    }
}

impl VoxelGrid for BinaryVolume {
    #[inline]
    fn dimensions(&self) -> Dimensions {
        self.voxels.dimensions()
    }

    #[inline]
    fn get(&self, x: i64, y: i64, z: i64) -> bool {
        let dims = self.voxels.dimensions();
        dims.contains(x, y, z) && self.voxels.get(x as usize, y as usize, z as usize)
    }
}
