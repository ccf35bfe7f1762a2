//! Error types for ellipsoid factor analysis

use std::fmt;

/// Errors surfaced by the analysis and its geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum EllipsoidFactorError {
    /// A parameter or input volume was rejected before any work started
    InvalidArgument(String),
    /// The closest-surface solver hit a singular Jacobian
    NonUniqueSolution(String),
}

impl fmt::Display for EllipsoidFactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EllipsoidFactorError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            EllipsoidFactorError::NonUniqueSolution(msg) => {
                write!(f, "solution is not unique: {}", msg)
            }
        }
    }
}

impl std::error::Error for EllipsoidFactorError {}

/// Result type alias for ellipsoid factor operations
pub type Result<T> = std::result::Result<T, EllipsoidFactorError>;

/// Reason a four-contact combination produced no ellipsoid
///
/// Fits fail routinely (most contact combinations are not consistent with
/// any inscribed ellipsoid), so this is a tagged absence rather than an error:
/// the fitter discards the combination and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegenerateFit {
    /// The four contact points are (nearly) coplanar or coincide
    AffinelyDependent,
    /// The linear system has no well-defined unique solution
    IllConditioned,
    /// The fitted quadric is not an ellipsoid
    NotPositiveDefinite,
    /// The fitted ellipsoid does not contain the seed point
    SeedOutside,
}

impl fmt::Display for DegenerateFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DegenerateFit::AffinelyDependent => "contact points are not affinely independent",
            DegenerateFit::IllConditioned => "fit system is ill-conditioned",
            DegenerateFit::NotPositiveDefinite => "quadric is not positive definite",
            DegenerateFit::SeedOutside => "seed point lies outside the fitted ellipsoid",
        };
        write!(f, "degenerate fit: {}", reason)
    }
}

impl std::error::Error for DegenerateFit {}
