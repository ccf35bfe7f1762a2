//! Spatial indexing for point-to-ellipsoid lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::fitting::SortedEllipsoids;
use crate::geometry::{inside_test, Ellipsoid};

/// KD-tree over ellipsoid centroids
///
/// Answers "which is the largest ellipsoid containing this point" without
/// scanning every ellipsoid: only ellipsoids whose centroid lies within the
/// longest semi-axis of the whole set are tested.
///
/// # Example
///
/// ```
/// use rust_ellipsoid_factor::*;
/// use glam::DVec3;
///
/// let ellipsoids = SortedEllipsoids::from_unsorted(vec![
///     Ellipsoid::sphere(DVec3::new(0.0, 0.0, 0.0), 1.0).unwrap(),
///     Ellipsoid::sphere(DVec3::new(5.0, 0.0, 0.0), 2.0).unwrap(),
/// ]);
/// let index = EllipsoidIndex::new(&ellipsoids);
/// assert_eq!(index.largest_containing(DVec3::new(4.0, 0.5, 0.0)), Some(0));
/// assert_eq!(index.largest_containing(DVec3::new(0.2, 0.0, 0.0)), Some(1));
/// assert_eq!(index.largest_containing(DVec3::new(2.5, 0.0, 0.0)), None);
/// ```
#[derive(Clone)]
pub struct EllipsoidIndex {
    tree: Option<ImmutableKdTree<f64, usize, 3, 32>>,
    ellipsoids: Vec<Ellipsoid>,
    search_radius: f64,
}

impl EllipsoidIndex {
    /// Build the index over ellipsoids sorted largest first
    pub fn new(ellipsoids: &SortedEllipsoids) -> Self {
        let centroids: Vec<[f64; 3]> = ellipsoids
            .iter()
            .map(|e| e.centroid().to_array())
            .collect();
        let search_radius = ellipsoids.iter().map(Ellipsoid::c).fold(0.0, f64::max);

        Self {
            tree: (!centroids.is_empty()).then(|| ImmutableKdTree::new_from_slice(&centroids)),
            ellipsoids: ellipsoids.as_slice().to_vec(),
            search_radius,
        }
    }

    /// Number of indexed ellipsoids
    pub fn len(&self) -> usize {
        self.ellipsoids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ellipsoids.is_empty()
    }

    /// Index of the largest ellipsoid whose inside test accepts `point`
    pub fn largest_containing(&self, point: DVec3) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let radius_squared = self.search_radius * self.search_radius;
        tree.within_unsorted::<SquaredEuclidean>(&point.to_array(), radius_squared)
            .into_iter()
            .map(|neighbour| neighbour.item)
            .filter(|&index| inside_test(point, &self.ellipsoids[index]))
            .min()
    }
}

impl std::fmt::Debug for EllipsoidIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EllipsoidIndex")
            .field("len", &self.len())
            .field("search_radius", &self.search_radius)
            .finish()
    }
}
