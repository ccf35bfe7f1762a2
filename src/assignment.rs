//! Greedy size-priority assignment of voxels to ellipsoids

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::fitting::SortedEllipsoids;
use crate::geometry::{inside_test, Ellipsoid};
use crate::grid::{voxel_center, Dimensions, Field, VoxelGrid, UNASSIGNED};

/// Identity field produced by [`assign_voxels`]
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    /// Index into the sorted ellipsoids per voxel, [`UNASSIGNED`] when none
    pub identity: Field<i32>,
    /// False if cancellation left slices unvisited
    pub completed: bool,
}

/// Assign every foreground voxel to the largest ellipsoid containing its centre
///
/// Slices are independent and may be processed in parallel; each writes only
/// its own part of the identity field. Background voxels and voxels outside
/// every ellipsoid stay [`UNASSIGNED`]. Cancellation is checked before each
/// slice; skipped slices stay unassigned.
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
/// use glam::DVec3;
///
/// let dims = Dimensions::new(8, 8, 8).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
/// let ellipsoids = SortedEllipsoids::from_unsorted(vec![
///     Ellipsoid::sphere(DVec3::splat(2.0), 1.5).unwrap(),
///     Ellipsoid::sphere(DVec3::splat(4.0), 3.0).unwrap(),
/// ]);
/// let outcome = assign_voxels(&volume, &ellipsoids, &CancellationToken::new(), false);
/// assert!(outcome.completed);
/// assert_eq!(outcome.identity.get(1, 1, 1), 1);
/// assert_eq!(outcome.identity.get(4, 4, 4), 0);
/// ```
pub fn assign_voxels<G>(
    grid: &G,
    ellipsoids: &SortedEllipsoids,
    cancel: &CancellationToken,
    parallel: bool,
) -> AssignmentOutcome
where
    G: VoxelGrid + ?Sized,
{
    let dims = grid.dimensions();
    let mut identity = Field::filled(dims, UNASSIGNED);

    let assign = |(z, slice): (usize, &mut [i32])| -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        assign_slice(grid, dims, ellipsoids.as_slice(), z, slice);
        true
    };

    let visited = if parallel && cfg!(feature = "parallel") {
        assign_parallel(identity.as_mut_slice(), dims.slice_len(), &assign)
    } else {
        identity
            .as_mut_slice()
            .chunks_mut(dims.slice_len())
            .enumerate()
            .map(&assign)
            .filter(|&done| done)
            .count()
    };

    AssignmentOutcome {
        identity,
        completed: visited == dims.depth,
    }
}

#[cfg(feature = "parallel")]
fn assign_parallel<F>(data: &mut [i32], slice_len: usize, assign: &F) -> usize
where
    F: Fn((usize, &mut [i32])) -> bool + Sync,
{
    data.par_chunks_mut(slice_len)
        .enumerate()
        .map(assign)
        .filter(|&done| done)
        .count()
}

#[cfg(not(feature = "parallel"))]
fn assign_parallel<F>(data: &mut [i32], slice_len: usize, assign: &F) -> usize
where
    F: Fn((usize, &mut [i32])) -> bool,
{
    data.chunks_mut(slice_len)
        .enumerate()
        .map(assign)
        .filter(|&done| done)
        .count()
}

/// Label one z-slice
fn assign_slice<G>(grid: &G, dims: Dimensions, ellipsoids: &[Ellipsoid], z: usize, slice: &mut [i32])
where
    G: VoxelGrid + ?Sized,
{
    let candidates = slice_candidates(ellipsoids, z);
    if candidates.is_empty() {
        return;
    }

    for y in 0..dims.height {
        for x in 0..dims.width {
            if !grid.get(x as i64, y as i64, z as i64) {
                continue;
            }
            let centre = voxel_center(x, y, z);
            if let Some(&index) = candidates
                .iter()
                .find(|&&index| inside_test(centre, &ellipsoids[index]))
            {
                slice[y * dims.width + x] = index as i32;
            }
        }
    }
}

/// Indices of the ellipsoids whose z-extent can reach the centre plane of slice `z`
fn slice_candidates(ellipsoids: &[Ellipsoid], z: usize) -> Vec<usize> {
    let plane = z as f64 + 0.5;
    ellipsoids
        .iter()
        .enumerate()
        .filter(|(_, e)| (e.centroid().z - plane).abs() < e.c())
        .map(|(index, _)| index)
        .collect()
}
