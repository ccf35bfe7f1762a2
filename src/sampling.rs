//! Generalized Spiral Direction Sampling
//!
//! Generates quasi-uniform unit vectors on the sphere with the generalized
//! spiral construction of Rakhmanov, Saff and Zhou, indexed from zero.
//!
//! # Algorithm
//!
//! For `k = 0..n`:
//! - Height: `h_k = -1 + 2k/(n-1)`, polar angle `θ_k = acos(h_k)`
//! - Azimuth: `φ_0 = φ_{n-1} = 0`, otherwise
//!   `φ_k = (φ_{k-1} + 3.6/√n · 1/√(1-h_k²)) mod 2π`
//!
//! There is no randomness: the same `n` always yields the same sequence,
//! which pins the contact rays and validation probes of every run.
//!
//! # References
//!
//! - Saff & Kuijlaars, "Distributing many points on a sphere", 1997
//!   ([doi:10.1007/BF03024331](https://doi.org/10.1007/BF03024331))

use glam::DVec3;
use std::f64::consts::TAU;

use crate::error::{EllipsoidFactorError, Result};

/// Spiral step constant from Saff & Kuijlaars
const SPIRAL_STEP: f64 = 3.6;

/// Generate `n` deterministic spiral directions
///
/// # Errors
///
/// Returns `InvalidArgument` if `n <= 2`
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::sampling::generate_directions;
///
/// let directions = generate_directions(30).unwrap();
/// assert_eq!(directions.len(), 30);
/// assert!((directions[0].z + 1.0).abs() < 1e-12); // starts at the south pole
/// ```
pub fn generate_directions(n: usize) -> Result<Vec<DVec3>> {
    if n <= 2 {
        return Err(EllipsoidFactorError::InvalidArgument(format!(
            "direction count must be > 2 (got {})",
            n
        )));
    }

    let n_f = n as f64;
    let step = SPIRAL_STEP / n_f.sqrt();
    let height = |k: usize| -1.0 + 2.0 * k as f64 / (n_f - 1.0);

    let mut phi = 0.0_f64;
    Ok((0..n)
        .map(|k| {
            let h = height(k);
            if k == 0 || k == n - 1 {
                phi = 0.0;
            } else {
                phi = (phi + step / (1.0 - h * h).sqrt()).rem_euclid(TAU);
            }
            let theta = h.acos();
            DVec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
        })
        .collect())
}

/// The six signed world axes: +x, +y, +z, -x, -y, -z
pub fn axis_directions() -> [DVec3; 6] {
    [
        DVec3::X,
        DVec3::Y,
        DVec3::Z,
        DVec3::NEG_X,
        DVec3::NEG_Y,
        DVec3::NEG_Z,
    ]
}

/// Spiral directions followed by the six world axes
///
/// This is the direction set used both for casting contact rays from a seed
/// and for probing fitted ellipsoids during validation.
pub fn seeding_directions(n: usize) -> Result<Vec<DVec3>> {
    let mut directions = generate_directions(n)?;
    directions.extend_from_slice(&axis_directions());
    Ok(directions)
}
