//! Ellipsoid through four contacts, tangent to the boundary at each
//!
//! The unknown is a general quadric `f(x) = xᵀAx + bᵀx + d` with symmetric
//! `A`, ten homogeneous coefficients in all. Each contact `(p, n)` gives
//!
//! - incidence: `f(p) = 0`
//! - tangency: `t·∇f(p) = t·(2Ap + b) = 0` for two unit vectors `t ⟂ n`
//!
//! so four contacts give a 12×10 homogeneous system, solved in the least
//! squares sense by the right singular vector of the smallest singular value.
//! Coordinates are centred on the seed and scaled by the mean contact
//! distance first, which keeps the system well scaled.

use glam::{DMat3, DVec3};
use nalgebra::{DMatrix, Matrix3, SymmetricEigen, Vector3};

use crate::error::DegenerateFit;
use crate::fitting::ContactPoint;
use crate::geometry::Ellipsoid;

/// Normalized contact tetrahedra with smaller |det| are treated as flat
const COPLANAR_TOLERANCE: f64 = 1e-6;

/// Relative size of the second smallest singular value below which the
/// null space is not one-dimensional
const NULL_SPACE_TOLERANCE: f64 = 1e-8;

/// Relative eigenvalue size below which `A` counts as singular
const DEFINITE_TOLERANCE: f64 = 1e-12;

const ROWS: usize = 12;
const UNKNOWNS: usize = 10;

/// Fit an ellipsoid tangent to the boundary at four contacts around `seed`
///
/// # Errors
///
/// The returned [`DegenerateFit`] tags why no ellipsoid was produced.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::fitting::{fit_ellipsoid, ContactPoint};
/// use glam::DVec3;
///
/// let seed = DVec3::ZERO;
/// let contacts = [DVec3::X, DVec3::NEG_X, DVec3::Y, DVec3::Z]
///     .map(|p| ContactPoint::new(seed, p * 2.0).unwrap());
/// let sphere = fit_ellipsoid(seed, &contacts).unwrap();
/// assert!((sphere.a() - 2.0).abs() < 1e-9 && (sphere.c() - 2.0).abs() < 1e-9);
/// ```
pub fn fit_ellipsoid(seed: DVec3, contacts: &[ContactPoint; 4]) -> Result<Ellipsoid, DegenerateFit> {
    let scale = contacts
        .iter()
        .map(|c| (c.position - seed).length())
        .sum::<f64>()
        / contacts.len() as f64;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(DegenerateFit::AffinelyDependent);
    }

    let points = (*contacts).map(|c| (c.position - seed) / scale);
    let tetrahedron = DMat3::from_cols(points[1] - points[0], points[2] - points[0], points[3] - points[0]);
    if tetrahedron.determinant().abs() <= COPLANAR_TOLERANCE {
        return Err(DegenerateFit::AffinelyDependent);
    }

    let coefficients = solve_quadric(&points, contacts)?;
    let quadric = centre_quadric(coefficients)?;
    let (semi_axes, axes) = principal_axes(&quadric)?;

    // The seed is the origin of the normalized frame
    let centre = quadric.centre;
    if centre.dot(&(quadric.a * centre)) >= quadric.radius {
        return Err(DegenerateFit::SeedOutside);
    }

    let centroid = seed + scale * to_glam(centre);
    let semi_axes = semi_axes.map(|s| s * scale);
    let orientation = DMat3::from_cols(
        to_glam(axes.column(0).into_owned()),
        to_glam(axes.column(1).into_owned()),
        to_glam(axes.column(2).into_owned()),
    );
    Ellipsoid::new(centroid, semi_axes, orientation).map_err(|_| DegenerateFit::IllConditioned)
}

/// Coefficients `[A11, A22, A33, A12, A13, A23, b1, b2, b3, d]`
fn solve_quadric(points: &[DVec3; 4], contacts: &[ContactPoint; 4]) -> Result<[f64; UNKNOWNS], DegenerateFit> {
    let mut system = DMatrix::<f64>::zeros(ROWS, UNKNOWNS);
    for (i, (p, contact)) in points.iter().zip(contacts).enumerate() {
        let row = 3 * i;
        let incidence = [
            p.x * p.x,
            p.y * p.y,
            p.z * p.z,
            2.0 * p.x * p.y,
            2.0 * p.x * p.z,
            2.0 * p.y * p.z,
            p.x,
            p.y,
            p.z,
            1.0,
        ];
        for (j, value) in incidence.into_iter().enumerate() {
            system[(row, j)] = value;
        }

        let (t1, t2) = contact.normal.any_orthonormal_pair();
        for (k, t) in [t1, t2].into_iter().enumerate() {
            let tangency = [
                2.0 * t.x * p.x,
                2.0 * t.y * p.y,
                2.0 * t.z * p.z,
                2.0 * (t.x * p.y + t.y * p.x),
                2.0 * (t.x * p.z + t.z * p.x),
                2.0 * (t.y * p.z + t.z * p.y),
                t.x,
                t.y,
                t.z,
                0.0,
            ];
            for (j, value) in tangency.into_iter().enumerate() {
                system[(row + 1 + k, j)] = value;
            }
        }
    }

    let svd = system.svd(false, true);
    let v_t = svd.v_t.ok_or(DegenerateFit::IllConditioned)?;
    let singular_values = svd.singular_values;

    let mut order: Vec<usize> = (0..singular_values.len()).collect();
    order.sort_by(|&i, &j| singular_values[i].total_cmp(&singular_values[j]));
    let smallest = order[0];
    let second = singular_values[order[1]];
    let largest = singular_values[order[order.len() - 1]];
    if !(largest.is_finite() && largest > 0.0) || second <= NULL_SPACE_TOLERANCE * largest {
        return Err(DegenerateFit::IllConditioned);
    }

    let row = v_t.row(smallest);
    let mut coefficients = [0.0; UNKNOWNS];
    for (j, c) in coefficients.iter_mut().enumerate() {
        *c = row[j];
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(DegenerateFit::IllConditioned);
    }
    Ok(coefficients)
}

/// Quadric in centred form `(x - centre)ᵀA(x - centre) = radius`
struct CentredQuadric {
    a: Matrix3<f64>,
    centre: Vector3<f64>,
    radius: f64,
}

/// Orient the quadric so that `A` is positive definite and centre it
fn centre_quadric(coefficients: [f64; UNKNOWNS]) -> Result<CentredQuadric, DegenerateFit> {
    let [a11, a22, a33, a12, a13, a23, b1, b2, b3, d] = coefficients;
    let mut a = Matrix3::new(a11, a12, a13, a12, a22, a23, a13, a23, a33);
    let mut b = Vector3::new(b1, b2, b3);
    let mut d = d;

    let eigenvalues = SymmetricEigen::new(a).eigenvalues;
    let largest = eigenvalues.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let threshold = DEFINITE_TOLERANCE * largest;
    if eigenvalues.iter().all(|&v| v < -threshold) {
        a = -a;
        b = -b;
        d = -d;
    } else if !eigenvalues.iter().all(|&v| v > threshold) {
        return Err(DegenerateFit::NotPositiveDefinite);
    }

    let inverse = a.try_inverse().ok_or(DegenerateFit::NotPositiveDefinite)?;
    let centre = -0.5 * inverse * b;
    let radius = centre.dot(&(a * centre)) - d;
    if !centre.iter().all(|c| c.is_finite()) {
        return Err(DegenerateFit::IllConditioned);
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(DegenerateFit::NotPositiveDefinite);
    }
    Ok(CentredQuadric { a, centre, radius })
}

/// Semi-axes and principal axes (as columns) in normalized units
fn principal_axes(quadric: &CentredQuadric) -> Result<([f64; 3], Matrix3<f64>), DegenerateFit> {
    let eigen = SymmetricEigen::new(quadric.a);
    let mut semi_axes = [0.0; 3];
    for (axis, &lambda) in semi_axes.iter_mut().zip(eigen.eigenvalues.iter()) {
        *axis = (quadric.radius / lambda).sqrt();
    }
    if semi_axes.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
        return Err(DegenerateFit::IllConditioned);
    }
    Ok((semi_axes, eigen.eigenvectors))
}

#[inline]
fn to_glam(v: Vector3<f64>) -> DVec3 {
    DVec3::new(v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Contact on the surface of `e` at local angles, with the true inward normal
    fn surface_contact(e: &Ellipsoid, theta: f64, phi: f64) -> ContactPoint {
        let [a, b, c] = e.semi_axes();
        let local = DVec3::new(a * phi.cos() * theta.cos(), b * phi.cos() * theta.sin(), c * phi.sin());
        let gradient = DVec3::new(local.x / (a * a), local.y / (b * b), local.z / (c * c));
        ContactPoint {
            position: e.to_world(local),
            normal: -(e.orientation() * gradient).normalize(),
        }
    }

    fn well_spread_contacts(e: &Ellipsoid) -> [ContactPoint; 4] {
        [
            surface_contact(e, 0.3, 0.2),
            surface_contact(e, 2.2, -0.5),
            surface_contact(e, -2.0, 0.7),
            surface_contact(e, -0.4, -1.1),
        ]
    }

    #[test]
    fn test_recovers_axis_aligned_ellipsoid() {
        let truth = Ellipsoid::axis_aligned(DVec3::new(10.0, 12.0, 8.0), [2.0, 3.0, 5.0]).unwrap();
        let seed = truth.centroid() + DVec3::new(0.3, -0.2, 0.5);
        let fitted = fit_ellipsoid(seed, &well_spread_contacts(&truth)).unwrap();

        assert!((fitted.centroid() - truth.centroid()).length() < 1e-7);
        for (f, t) in fitted.semi_axes().iter().zip(truth.semi_axes()) {
            assert_relative_eq!(*f, t, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_recovers_rotated_ellipsoid() {
        let rotation = DMat3::from_axis_angle(DVec3::new(1.0, -2.0, 0.5).normalize(), 0.9);
        let truth = Ellipsoid::new(DVec3::new(-4.0, 2.0, 7.0), [1.5, 2.5, 6.0], rotation).unwrap();
        let fitted = fit_ellipsoid(truth.centroid(), &well_spread_contacts(&truth)).unwrap();

        assert!((fitted.centroid() - truth.centroid()).length() < 1e-7);
        for (f, t) in fitted.semi_axes().iter().zip(truth.semi_axes()) {
            assert_relative_eq!(*f, t, epsilon = 1e-7);
        }
        // Principal axes agree up to sign
        for (f, t) in fitted.principal_directions().iter().step_by(2).zip(truth.principal_directions().iter().step_by(2)) {
            assert_relative_eq!(f.dot(*t).abs(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sphere_from_radial_contacts() {
        let seed = DVec3::new(3.0, 3.0, 3.0);
        let directions = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(-1.0, -1.0, -1.0).normalize(),
        ];
        let contacts = directions.map(|d| ContactPoint::new(seed, seed + d * 4.0).unwrap());
        let sphere = fit_ellipsoid(seed, &contacts).unwrap();
        assert!((sphere.centroid() - seed).length() < 1e-9);
        assert_relative_eq!(sphere.a(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(sphere.c(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_coplanar_contacts_are_rejected() {
        let seed = DVec3::new(0.0, 0.0, 1.0);
        let contacts = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
        ]
        .map(|p| ContactPoint::new(seed, p).unwrap());
        assert_eq!(fit_ellipsoid(seed, &contacts), Err(DegenerateFit::AffinelyDependent));
    }

    #[test]
    fn test_seed_must_be_inside() {
        let truth = Ellipsoid::axis_aligned(DVec3::ZERO, [2.0, 3.0, 5.0]).unwrap();
        let outside = DVec3::new(0.0, 0.0, 9.0);
        assert_eq!(
            fit_ellipsoid(outside, &well_spread_contacts(&truth)),
            Err(DegenerateFit::SeedOutside)
        );
    }

    #[test]
    fn test_rejections_are_tagged() {
        // Slab walls: every tangent plane is z = ±1, no ellipsoid touches them at these points
        let seed = DVec3::ZERO;
        let contacts = [
            ContactPoint { position: DVec3::new(0.0, 0.0, 1.0), normal: DVec3::NEG_Z },
            ContactPoint { position: DVec3::new(3.0, 0.0, 1.0), normal: DVec3::NEG_Z },
            ContactPoint { position: DVec3::new(0.0, 0.0, -1.0), normal: DVec3::Z },
            ContactPoint { position: DVec3::new(0.0, 3.0, -1.0), normal: DVec3::Z },
        ];
        match fit_ellipsoid(seed, &contacts) {
            Ok(e) => panic!("unexpected ellipsoid {:?}", e),
            Err(reason) => assert!(matches!(
                reason,
                DegenerateFit::IllConditioned | DegenerateFit::NotPositiveDefinite | DegenerateFit::SeedOutside
            )),
        }
    }
}
