//! Combinatorial ellipsoid fitting at seed points
//!
//! For every seed, rays are cast along the seeding directions to find where
//! the foreground ends. Every four-contact combination is fitted with an
//! ellipsoid tangent to the boundary at its contacts, and the fits that stay
//! inside the foreground are kept.
//!
//! # Pipeline
//!
//! ```text
//! seed ──▶ contacts ──▶ 4-combinations ──▶ quadric fit ──▶ validation
//!                                                              │
//!  seeds (parallel) ──▶ merge in seed order ──▶ stable sort by volume
//! ```

mod combinations;
mod contacts;
mod quadric;

pub use combinations::{binomial, unrank, CombinationPlan, FourCombinations, CONTACTS_PER_FIT};
pub use contacts::{collect_contacts, ContactPoint};
pub use quadric::fit_ellipsoid;

use glam::DVec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::config::EllipsoidFactorConfig;
use crate::error::Result;
use crate::geometry::Ellipsoid;
use crate::grid::VoxelGrid;
use crate::sampling::seeding_directions;
use crate::validation::wholly_contained_in_foreground;

/// Ellipsoids ordered by non-increasing volume
///
/// Equal volumes keep the order in which their seeds and combinations were
/// visited, so the same inputs always give the same order. This is the only
/// list type the voxel assigner accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedEllipsoids(Vec<Ellipsoid>);

impl SortedEllipsoids {
    /// Sort ellipsoids by descending volume, keeping the order of ties
    pub fn from_unsorted(mut ellipsoids: Vec<Ellipsoid>) -> Self {
        ellipsoids.sort_by(|a, b| b.volume().total_cmp(&a.volume()));
        Self(ellipsoids)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Ellipsoid] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Ellipsoid> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ellipsoid> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Ellipsoid> {
        self.0
    }
}

impl<'a> IntoIterator for &'a SortedEllipsoids {
    type Item = &'a Ellipsoid;
    type IntoIter = std::slice::Iter<'a, Ellipsoid>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-seed work shared by every seed of a run
#[derive(Debug, Clone)]
pub struct SeedSearch {
    directions: Vec<DVec3>,
    max_combinations: Option<usize>,
    sampling_seed: u64,
}

impl SeedSearch {
    /// Search set up from a run configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the spiral direction count is too small
    pub fn new(config: &EllipsoidFactorConfig) -> Result<Self> {
        Ok(Self {
            directions: seeding_directions(config.spiral_directions)?,
            max_combinations: config.max_combinations_per_seed,
            sampling_seed: config.sampling_seed,
        })
    }

    /// Directions used for contact rays and validation probes
    pub fn directions(&self) -> &[DVec3] {
        &self.directions
    }

    /// Validated ellipsoids of one seed, in combination order
    ///
    /// `seed_index` selects the subsampling stream when combinations are
    /// capped.
    pub fn fit_seed<G>(&self, grid: &G, seed: DVec3, seed_index: usize) -> Vec<Ellipsoid>
    where
        G: VoxelGrid + ?Sized,
    {
        let contacts = collect_contacts(grid, seed, &self.directions);
        CombinationPlan::new(contacts.len(), self.max_combinations, self.sampling_seed, seed_index)
            .filter_map(|[i, j, k, l]| fit_ellipsoid(seed, &[contacts[i], contacts[j], contacts[k], contacts[l]]).ok())
            .filter(|ellipsoid| wholly_contained_in_foreground(grid, ellipsoid, &self.directions))
            .collect()
    }
}

/// Outcome of fitting every seed of a run
#[derive(Debug, Clone, Default)]
pub struct FitOutcome {
    pub ellipsoids: SortedEllipsoids,
    /// Seeds whose search ran before cancellation was observed
    pub seeds_processed: usize,
    /// False if cancellation skipped any seed
    pub completed: bool,
}

/// Fit and validate ellipsoids at every seed, largest first
///
/// Seeds are searched independently (on the rayon pool when `parallel` is
/// set and the feature is enabled) and merged once in seed order.
/// Cancellation is checked before each seed.
pub fn find_ellipsoids<G>(
    grid: &G,
    seeds: &[DVec3],
    search: &SeedSearch,
    parallel: bool,
    cancel: &CancellationToken,
) -> FitOutcome
where
    G: VoxelGrid + ?Sized,
{
    let fit = |(index, seed): (usize, &DVec3)| -> Option<Vec<Ellipsoid>> {
        if cancel.is_cancelled() {
            return None;
        }
        Some(search.fit_seed(grid, *seed, index))
    };

    let per_seed: Vec<Option<Vec<Ellipsoid>>> = if parallel && cfg!(feature = "parallel") {
        fit_parallel(seeds, &fit)
    } else {
        seeds.iter().enumerate().map(&fit).collect()
    };

    let seeds_processed = per_seed.iter().filter(|s| s.is_some()).count();
    let merged: Vec<Ellipsoid> = per_seed.into_iter().flatten().flatten().collect();
    FitOutcome {
        ellipsoids: SortedEllipsoids::from_unsorted(merged),
        seeds_processed,
        completed: seeds_processed == seeds.len(),
    }
}

#[cfg(feature = "parallel")]
fn fit_parallel<F>(seeds: &[DVec3], fit: &F) -> Vec<Option<Vec<Ellipsoid>>>
where
    F: Fn((usize, &DVec3)) -> Option<Vec<Ellipsoid>> + Sync,
{
    seeds.par_iter().enumerate().map(fit).collect()
}

#[cfg(not(feature = "parallel"))]
fn fit_parallel<F>(seeds: &[DVec3], fit: &F) -> Vec<Option<Vec<Ellipsoid>>>
where
    F: Fn((usize, &DVec3)) -> Option<Vec<Ellipsoid>>,
{
    seeds.iter().enumerate().map(fit).collect()
}
