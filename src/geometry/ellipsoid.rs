//! Ellipsoid value type

use glam::{DMat3, DVec3};
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EllipsoidFactorError, Result};

/// Tolerance for accepting an orientation as orthonormal
const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// An oriented ellipsoid
///
/// Semi-axes are stored sorted, `a <= b <= c`, and the columns of the
/// orientation are the unit principal axes belonging to `a`, `b` and `c`
/// (a right-handed orthonormal frame). A world point `p` has local
/// coordinates `orientationᵀ · (p - centroid)`.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
/// use glam::{DMat3, DVec3};
///
/// let e = Ellipsoid::new(DVec3::ZERO, [3.0, 1.0, 2.0], DMat3::IDENTITY).unwrap();
/// assert_eq!(e.semi_axes(), [1.0, 2.0, 3.0]);
/// assert_eq!(e.orientation().z_axis, DVec3::X); // `c` belongs to the old x axis
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    centroid: DVec3,
    semi_axes: [f64; 3],
    orientation: DMat3,
}

impl Ellipsoid {
    /// Create an ellipsoid
    ///
    /// `semi_axes[i]` belongs to column `i` of `orientation`. Axes are sorted
    /// ascending and the frame is made right-handed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a semi-axis is not a positive finite number,
    /// the centroid is not finite, or `orientation` is not orthonormal.
    pub fn new(centroid: DVec3, semi_axes: [f64; 3], orientation: DMat3) -> Result<Self> {
        if !centroid.is_finite() {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "centroid must be finite (got {:?})",
                centroid
            )));
        }
        if semi_axes.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return Err(EllipsoidFactorError::InvalidArgument(format!(
                "semi-axes must be positive (got {:?})",
                semi_axes
            )));
        }
        let gram = orientation.transpose() * orientation;
        if !gram.abs_diff_eq(DMat3::IDENTITY, ORTHONORMAL_TOLERANCE) {
            return Err(EllipsoidFactorError::InvalidArgument(
                "orientation must be orthonormal".to_string(),
            ));
        }

        let columns = [orientation.x_axis, orientation.y_axis, orientation.z_axis];
        let mut order = [0, 1, 2];
        order.sort_by(|&i, &j| semi_axes[i].total_cmp(&semi_axes[j]));

        let sorted_axes = order.map(|i| semi_axes[i]);
        let [u, v, mut w] = order.map(|i| columns[i]);
        if u.cross(v).dot(w) < 0.0 {
            w = -w;
        }

        Ok(Self {
            centroid,
            semi_axes: sorted_axes,
            orientation: DMat3::from_cols(u, v, w),
        })
    }

    /// Axis-aligned ellipsoid
    pub fn axis_aligned(centroid: DVec3, semi_axes: [f64; 3]) -> Result<Self> {
        Self::new(centroid, semi_axes, DMat3::IDENTITY)
    }

    /// Sphere of the given radius
    pub fn sphere(centroid: DVec3, radius: f64) -> Result<Self> {
        Self::axis_aligned(centroid, [radius; 3])
    }

    #[inline]
    pub fn centroid(&self) -> DVec3 {
        self.centroid
    }

    /// Semi-axes `[a, b, c]` with `a <= b <= c`
    #[inline]
    pub fn semi_axes(&self) -> [f64; 3] {
        self.semi_axes
    }

    /// Shortest semi-axis
    #[inline]
    pub fn a(&self) -> f64 {
        self.semi_axes[0]
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.semi_axes[1]
    }

    /// Longest semi-axis
    #[inline]
    pub fn c(&self) -> f64 {
        self.semi_axes[2]
    }

    /// Principal axes as matrix columns, ordered like [`Self::semi_axes`]
    #[inline]
    pub fn orientation(&self) -> DMat3 {
        self.orientation
    }

    /// 4/3·π·a·b·c
    #[inline]
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.semi_axes[0] * self.semi_axes[1] * self.semi_axes[2]
    }

    /// Ellipsoid factor a/b − b/c, from −1 (plate) to +1 (rod)
    #[inline]
    pub fn factor(&self) -> f64 {
        let [a, b, c] = self.semi_axes;
        a / b - b / c
    }

    /// Axis ratio a/b
    #[inline]
    pub fn a_to_b(&self) -> f64 {
        self.semi_axes[0] / self.semi_axes[1]
    }

    /// Axis ratio b/c
    #[inline]
    pub fn b_to_c(&self) -> f64 {
        self.semi_axes[1] / self.semi_axes[2]
    }

    /// Express a world point in the ellipsoid's local frame
    #[inline]
    pub fn to_local(&self, point: DVec3) -> DVec3 {
        self.orientation.transpose() * (point - self.centroid)
    }

    /// Map a local-frame point back to world coordinates
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.centroid + self.orientation * local
    }

    /// The six signed principal axes: +a, -a, +b, -b, +c, -c
    pub fn principal_directions(&self) -> [DVec3; 6] {
        let m = self.orientation;
        [m.x_axis, -m.x_axis, m.y_axis, -m.y_axis, m.z_axis, -m.z_axis]
    }

    /// Quadratic form `M` with `(p - centroid)ᵀ M (p - centroid) = 1` on the surface
    pub fn quadric_matrix(&self) -> DMat3 {
        let [a, b, c] = self.semi_axes;
        let scale = DMat3::from_diagonal(DVec3::new(1.0 / (a * a), 1.0 / (b * b), 1.0 / (c * c)));
        self.orientation * scale * self.orientation.transpose()
    }

    /// Distance `t` from the centroid to the surface along a unit direction,
    /// after shrinking every semi-axis by `shrink` (clamped at zero)
    ///
    /// A fully collapsed axis yields `t = 0` for any direction with a
    /// component along it.
    pub fn ray_surface_parameter(&self, direction: DVec3, shrink: f64) -> f64 {
        let local = self.orientation.transpose() * direction;
        let denominator: f64 = local
            .to_array()
            .iter()
            .zip(self.semi_axes)
            .filter(|(component, _)| **component != 0.0)
            .map(|(component, axis)| {
                let shrunk = (axis - shrink).max(0.0);
                component * component / (shrunk * shrunk)
            })
            .sum();
        (1.0 / denominator).sqrt()
    }

    /// Point on the surface of the (shrunk) ellipsoid along a unit direction
    #[inline]
    pub fn surface_point_along(&self, direction: DVec3, shrink: f64) -> DVec3 {
        self.centroid + direction * self.ray_surface_parameter(direction, shrink)
    }
}
