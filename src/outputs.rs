//! Per-voxel descriptor fields and run summary

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fitting::SortedEllipsoids;
use crate::geometry::Ellipsoid;
use crate::grid::Field;

/// Paint `values[id]` into every assigned voxel, NaN elsewhere
///
/// Identities without a corresponding value are painted NaN as well.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
///
/// let dims = Dimensions::new(3, 1, 1).unwrap();
/// let identity = Field::from_vec(dims, vec![-1, 0, 1]).unwrap();
/// let painted = paint_labels(&identity, &[0.25, -0.5]);
/// assert!(painted.get(0, 0, 0).is_nan());
/// assert_eq!(&painted.as_slice()[1..], &[0.25f32, -0.5]);
/// ```
pub fn paint_labels(identity: &Field<i32>, values: &[f32]) -> Field<f32> {
    let mut painted = Field::filled(identity.dimensions(), f32::NAN);
    for (out, &id) in painted.as_mut_slice().iter_mut().zip(identity.as_slice()) {
        if let Some(&value) = usize::try_from(id).ok().and_then(|i| values.get(i)) {
            *out = value;
        }
    }
    painted
}

/// Descriptor fields painted from the identity field
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    /// Ellipsoid factor a/b − b/c
    pub ellipsoid_factor: Field<f32>,
    /// Volume of the assigned ellipsoid
    pub volume: Field<f32>,
    /// Short to middle axis ratio a/b
    pub a_to_b: Field<f32>,
    /// Middle to long axis ratio b/c
    pub b_to_c: Field<f32>,
}

impl DerivedFields {
    pub fn compute(identity: &Field<i32>, ellipsoids: &SortedEllipsoids) -> Self {
        let paint = |descriptor: fn(&Ellipsoid) -> f64| {
            let values: Vec<f32> = ellipsoids.iter().map(|e| descriptor(e) as f32).collect();
            paint_labels(identity, &values)
        };
        Self {
            ellipsoid_factor: paint(Ellipsoid::factor),
            volume: paint(Ellipsoid::volume),
            a_to_b: paint(Ellipsoid::a_to_b),
            b_to_c: paint(Ellipsoid::b_to_c),
        }
    }
}

/// Counts describing a finished (or cancelled) run
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub ellipsoid_count: usize,
    pub seed_count: usize,
    pub foreground_voxels: usize,
    pub assigned_voxels: usize,
    /// Cancellation cut the run short
    pub partial: bool,
}

impl RunSummary {
    /// Share of foreground voxels assigned to an ellipsoid, in percent
    pub fn filling_percentage(&self) -> f64 {
        if self.foreground_voxels == 0 {
            return 0.0;
        }
        100.0 * self.assigned_voxels as f64 / self.foreground_voxels as f64
    }
}
