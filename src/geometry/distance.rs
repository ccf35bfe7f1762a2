//! Closest distance from a point to an ellipsoid surface
//!
//! The surface is parametrized as
//! `X(θ, φ) = (a·cosφ·cosθ, b·cosφ·sinθ, c·sinφ)` in the ellipsoid's local
//! frame. The closest surface point satisfies the orthogonality conditions
//! `(X - p)·∂X/∂θ = 0` and `(X - p)·∂X/∂φ = 0`; after removing common factors
//! these are the residuals
//!
//! ```text
//! F1 = (a²-b²)·cosθ·sinθ·cosφ - x·a·sinθ + y·b·cosθ
//! F2 = (a²cos²θ + b²sin²θ - c²)·sinφ·cosφ - x·a·sinφ·cosθ - y·b·sinφ·sinθ + z·c·cosφ
//! ```
//!
//! which are solved with a bivariate Newton-Raphson iteration using the
//! analytic Jacobian.
//!
//! # References
//!
//! - R. Nürnberg, "Distance from a point to an ellipse, an ellipsoid, or a
//!   hyperellipsoid"

use glam::{DVec2, DVec3};

use crate::config::SolverOptions;
use crate::error::{EllipsoidFactorError, Result};
use crate::geometry::Ellipsoid;

/// Outcome of the closest-surface solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDistance {
    /// Euclidean distance between the query point and `surface_point`
    pub distance: f64,
    /// Surface parameters `(θ, φ)` at the final estimate
    pub angles: DVec2,
    /// Closest surface point estimate, in world coordinates
    pub surface_point: DVec3,
    /// Newton iterations performed
    pub iterations: usize,
    /// Whether the angle update fell below the tolerance
    ///
    /// When false the iteration cap was reached and the fields hold the last
    /// estimate, which is still a usable approximation.
    pub converged: bool,
}

/// Shortest distance between `point` and the surface of `ellipsoid`
///
/// # Errors
///
/// Returns `NonUniqueSolution` when the point coincides with the centroid or
/// the solver meets a singular Jacobian.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
/// use glam::DVec3;
///
/// let sphere = Ellipsoid::sphere(DVec3::ZERO, 2.0).unwrap();
/// let d = closest_surface_distance(&sphere, DVec3::new(3.0, 1.0, 1.0), &SolverOptions::default()).unwrap();
/// assert!((d - (11f64.sqrt() - 2.0)).abs() < 1e-9);
/// ```
pub fn closest_surface_distance(
    ellipsoid: &Ellipsoid,
    point: DVec3,
    options: &SolverOptions,
) -> Result<f64> {
    solve_closest_surface_point(ellipsoid, point, options).map(|solution| solution.distance)
}

/// Solve for the closest surface point, reporting convergence details
///
/// Running out of iterations is not an error: the last estimate is returned
/// with `converged == false`.
pub fn solve_closest_surface_point(
    ellipsoid: &Ellipsoid,
    point: DVec3,
    options: &SolverOptions,
) -> Result<SurfaceDistance> {
    let local = ellipsoid.to_local(point);
    if local == DVec3::ZERO {
        // Every surface point along the shortest axis is equally close
        return Err(EllipsoidFactorError::NonUniqueSolution(
            "query point coincides with the ellipsoid centroid".to_string(),
        ));
    }

    let [a, b, c] = ellipsoid.semi_axes();
    let mut angles = initial_angles(a, b, c, local);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        let step = newton_step(angles, [a, b, c], local)?;
        angles -= step;
        iterations += 1;
        if step.length() < options.tolerance {
            converged = true;
            break;
        }
    }

    let surface_local = surface_at(angles, [a, b, c]);
    Ok(SurfaceDistance {
        distance: (surface_local - local).length(),
        angles,
        surface_point: ellipsoid.to_world(surface_local),
        iterations,
        converged,
    })
}

/// Angles of the point's radial projection onto the surface
fn initial_angles(a: f64, b: f64, c: f64, p: DVec3) -> DVec2 {
    let root = (p.x * p.x / (a * a) + p.y * p.y / (b * b)).sqrt();
    DVec2::new((a * p.y).atan2(b * p.x), p.z.atan2(c * root))
}

/// Local-frame surface point at `(θ, φ)`
fn surface_at(angles: DVec2, [a, b, c]: [f64; 3]) -> DVec3 {
    let (sin_theta, cos_theta) = angles.x.sin_cos();
    let (sin_phi, cos_phi) = angles.y.sin_cos();
    DVec3::new(a * cos_phi * cos_theta, b * cos_phi * sin_theta, c * sin_phi)
}

/// `J⁻¹·F` at the current angles
fn newton_step(angles: DVec2, [a, b, c]: [f64; 3], p: DVec3) -> Result<DVec2> {
    let (sin_t, cos_t) = angles.x.sin_cos();
    let (sin_p, cos_p) = angles.y.sin_cos();
    let a2_b2 = a * a - b * b;
    let planar = a * a * cos_t * cos_t + b * b * sin_t * sin_t - c * c;
    let (xa, yb, zc) = (p.x * a, p.y * b, p.z * c);

    let f1 = a2_b2 * cos_t * sin_t * cos_p - xa * sin_t + yb * cos_t;
    let f2 = planar * sin_p * cos_p - xa * sin_p * cos_t - yb * sin_p * sin_t + zc * cos_p;

    let j11 = a2_b2 * (cos_t * cos_t - sin_t * sin_t) * cos_p - xa * cos_t - yb * sin_t;
    let j12 = -a2_b2 * cos_t * sin_t * sin_p;
    let j21 = -2.0 * a2_b2 * cos_t * sin_t * sin_p * cos_p + xa * sin_p * sin_t
        - yb * sin_p * cos_t;
    let j22 = planar * (cos_p * cos_p - sin_p * sin_p)
        - xa * cos_p * cos_t
        - yb * cos_p * sin_t
        - zc * sin_p;

    let determinant = j11 * j22 - j12 * j21;
    if determinant == 0.0 {
        return Err(EllipsoidFactorError::NonUniqueSolution(format!(
            "singular Jacobian at angles ({}, {})",
            angles.x, angles.y
        )));
    }

    Ok(DVec2::new(
        (j22 * f1 - j12 * f2) / determinant,
        (j11 * f2 - j21 * f1) / determinant,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DMat3;

    fn rotated_ellipsoid() -> Ellipsoid {
        let rotation = DMat3::from_axis_angle(DVec3::new(0.2, -1.0, 0.5).normalize(), 1.1);
        Ellipsoid::new(DVec3::new(10.0, -3.0, 7.5), [2.0, 3.0, 5.0], rotation).unwrap()
    }

    /// Outward unit normal of the local surface at `(θ, φ)`
    fn local_normal(angles: DVec2, [a, b, c]: [f64; 3]) -> DVec3 {
        let s = surface_at(angles, [a, b, c]);
        DVec3::new(s.x / (a * a), s.y / (b * b), s.z / (c * c)).normalize()
    }

    #[test]
    fn test_point_on_surface_has_zero_distance() {
        let e = rotated_ellipsoid();
        for (theta, phi) in [(0.7, 0.4), (-2.0, -0.9), (2.9, 1.2), (0.1, -0.05)] {
            let angles = DVec2::new(theta, phi);
            let point = e.to_world(surface_at(angles, e.semi_axes()));
            let d = closest_surface_distance(&e, point, &SolverOptions::default()).unwrap();
            assert!(d.abs() < 1e-9, "distance {} at ({}, {})", d, theta, phi);
        }
    }

    #[test]
    fn test_point_along_normal() {
        let e = rotated_ellipsoid();
        let angles = DVec2::new(0.6, 0.3);
        let offset = 0.75;
        let local = surface_at(angles, e.semi_axes()) + local_normal(angles, e.semi_axes()) * offset;

        let solution =
            solve_closest_surface_point(&e, e.to_world(local), &SolverOptions::default()).unwrap();
        assert!(solution.converged);
        assert_relative_eq!(solution.distance, offset, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_matches_analytic_distance() {
        let sphere = Ellipsoid::sphere(DVec3::new(1.0, 2.0, 3.0), 4.0).unwrap();
        for offset in [DVec3::new(1.0, 2.0, 0.5), DVec3::new(-6.0, 1.0, 2.0), DVec3::new(0.3, -0.2, 0.1)] {
            let d = closest_surface_distance(&sphere, sphere.centroid() + offset, &SolverOptions::default())
                .unwrap();
            assert_relative_eq!(d, (offset.length() - 4.0).abs(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_centroid_is_not_unique() {
        let e = rotated_ellipsoid();
        let result = closest_surface_distance(&e, e.centroid(), &SolverOptions::default());
        assert!(matches!(result, Err(EllipsoidFactorError::NonUniqueSolution(_))));

        let sphere = Ellipsoid::sphere(DVec3::ZERO, 1.0).unwrap();
        let result = closest_surface_distance(&sphere, DVec3::ZERO, &SolverOptions::default());
        assert!(matches!(result, Err(EllipsoidFactorError::NonUniqueSolution(_))));
    }

    #[test]
    fn test_polar_axis_of_sphere_is_singular() {
        // θ is undefined on the polar axis, so the Jacobian vanishes exactly
        let sphere = Ellipsoid::sphere(DVec3::ZERO, 1.0).unwrap();
        let result = closest_surface_distance(&sphere, DVec3::new(0.0, 0.0, 3.0), &SolverOptions::default());
        assert!(matches!(result, Err(EllipsoidFactorError::NonUniqueSolution(_))));
    }

    #[test]
    fn test_iteration_cap_returns_best_estimate() {
        let e = rotated_ellipsoid();
        let angles = DVec2::new(0.9, -0.6);
        let local = surface_at(angles, e.semi_axes()) + local_normal(angles, e.semi_axes()) * 1.5;
        let point = e.to_world(local);

        let capped = SolverOptions {
            tolerance: 1e-12,
            max_iterations: 1,
        };
        let partial = solve_closest_surface_point(&e, point, &capped).unwrap();
        assert!(!partial.converged);
        assert_eq!(partial.iterations, 1);
        assert!(partial.distance.is_finite());
        assert!(partial.distance >= 1.5 - 1e-9);

        let full = solve_closest_surface_point(&e, point, &SolverOptions::default()).unwrap();
        assert!(full.converged);
        assert!(full.iterations > 1);
        assert_relative_eq!(full.distance, 1.5, epsilon = 1e-9);
        assert_relative_eq!((full.surface_point - point).length(), full.distance, epsilon = 1e-12);
    }
}
