//! EllipsoidFactorAnalysis main structure

use std::time::Instant;

use glam::DVec3;
use log::{debug, info, warn};

use crate::assignment::assign_voxels;
use crate::cancel::CancellationToken;
use crate::config::EllipsoidFactorConfig;
use crate::error::{EllipsoidFactorError, Result};
use crate::fitting::{find_ellipsoids, SeedSearch, SortedEllipsoids};
use crate::geometry::{closest_surface_distance, Ellipsoid};
use crate::grid::{BinaryVolume, Field, VoxelGrid, UNASSIGNED};
use crate::outputs::{DerivedFields, RunSummary};
use crate::ridge::ridge_field;
use crate::seeds::extract_seed_points;

#[cfg(feature = "spatial-index")]
use crate::spatial::EllipsoidIndex;

/// A complete ellipsoid factor run over one binary volume
///
/// Holds the fitted ellipsoids (largest first), the seeds they were grown
/// from, and the identity field mapping every foreground voxel to the
/// largest ellipsoid containing it.
///
/// # Examples
///
/// ```
/// use rust_ellipsoid_factor::*;
///
/// let dims = Dimensions::new(14, 14, 14).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |x, y, z| {
///     (2..12).contains(&x) && (2..12).contains(&y) && (2..12).contains(&z)
/// });
/// let config = EllipsoidFactorConfigBuilder::new()
///     .spiral_directions(10)
///     .unwrap()
///     .max_combinations_per_seed(200)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let analysis = EllipsoidFactorAnalysis::run(&volume, config).unwrap();
/// println!("{} ellipsoids", analysis.ellipsoids().len());
/// println!("{:.1}% filled", analysis.summary().filling_percentage());
/// ```
#[derive(Debug, Clone)]
pub struct EllipsoidFactorAnalysis {
    /// Configuration the run used
    config: EllipsoidFactorConfig,

    /// Seed points in raster order
    seeds: Vec<DVec3>,

    /// Validated ellipsoids, largest volume first
    ellipsoids: SortedEllipsoids,

    /// Index into `ellipsoids` per voxel, `UNASSIGNED` where none applies
    identity: Field<i32>,

    summary: RunSummary,

    /// Point lookup over the ellipsoids (requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    index: EllipsoidIndex,
}

impl EllipsoidFactorAnalysis {
    /// Run the full analysis, deriving seeds from the volume's ridge field
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the configuration is out of range.
    pub fn run(volume: &BinaryVolume, config: EllipsoidFactorConfig) -> Result<Self> {
        let start = Instant::now();
        let ridge = ridge_field(volume);
        debug!("Ridge field computed in {:.2?}", start.elapsed());
        Self::run_with_ridge(volume, &ridge, config)
    }

    /// Run the analysis with an externally computed ridge field
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the configuration is out of range or the
    /// ridge field does not match the volume's extent.
    pub fn run_with_ridge(
        volume: &BinaryVolume,
        ridge: &Field<f64>,
        config: EllipsoidFactorConfig,
    ) -> Result<Self> {
        Self::run_with_cancel(volume, ridge, config, &CancellationToken::new())
    }

    /// Run the analysis, stopping early once `cancel` is triggered
    ///
    /// A cancelled run still succeeds: it holds whatever was finished before
    /// the cancellation was observed, and [`Self::is_partial`] reports true.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_with_ridge`].
    pub fn run_with_cancel(
        volume: &BinaryVolume,
        ridge: &Field<f64>,
        config: EllipsoidFactorConfig,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        if config.max_combinations_per_seed == Some(0) {
            return Err(EllipsoidFactorError::InvalidArgument(
                "combination limit must be positive".to_string(),
            ));
        }
        let total_start = Instant::now();
        let search = SeedSearch::new(&config)?;

        let stage_start = Instant::now();
        let seeds = extract_seed_points(volume, ridge, config.ridge_fraction)?;
        debug!(
            "Found {} seed points in {:.2?}",
            seeds.len(),
            stage_start.elapsed()
        );

        let stage_start = Instant::now();
        let fit = find_ellipsoids(volume, &seeds, &search, config.parallel, cancel);
        debug!(
            "Fitted {} ellipsoids from {}/{} seeds in {:.2?}",
            fit.ellipsoids.len(),
            fit.seeds_processed,
            seeds.len(),
            stage_start.elapsed()
        );

        let stage_start = Instant::now();
        let assignment = assign_voxels(volume, &fit.ellipsoids, cancel, config.parallel);
        debug!("Assigned voxels in {:.2?}", stage_start.elapsed());

        let summary = RunSummary {
            ellipsoid_count: fit.ellipsoids.len(),
            seed_count: seeds.len(),
            foreground_voxels: volume.foreground_count(),
            assigned_voxels: assignment
                .identity
                .as_slice()
                .iter()
                .filter(|&&id| id != UNASSIGNED)
                .count(),
            partial: !(fit.completed && assignment.completed),
        };

        if summary.partial {
            warn!(
                "Ellipsoid factor run cancelled after {}/{} seeds",
                fit.seeds_processed,
                seeds.len()
            );
        } else if summary.ellipsoid_count == 0 {
            warn!("No ellipsoids found from {} seeds", summary.seed_count);
        }
        info!(
            "{} ellipsoids, {}/{} foreground voxels assigned ({:.1}%) in {:.2?}",
            summary.ellipsoid_count,
            summary.assigned_voxels,
            summary.foreground_voxels,
            summary.filling_percentage(),
            total_start.elapsed()
        );

        #[cfg(feature = "spatial-index")]
        let index = EllipsoidIndex::new(&fit.ellipsoids);

        Ok(Self {
            config,
            seeds,
            ellipsoids: fit.ellipsoids,
            identity: assignment.identity,
            summary,
            #[cfg(feature = "spatial-index")]
            index,
        })
    }

    #[inline]
    pub fn config(&self) -> &EllipsoidFactorConfig {
        &self.config
    }

    /// Seed points in raster order
    #[inline]
    pub fn seeds(&self) -> &[DVec3] {
        &self.seeds
    }

    /// Validated ellipsoids, largest volume first
    #[inline]
    pub fn ellipsoids(&self) -> &SortedEllipsoids {
        &self.ellipsoids
    }

    /// Per-voxel index into [`Self::ellipsoids`], [`UNASSIGNED`] where none applies
    #[inline]
    pub fn identity(&self) -> &Field<i32> {
        &self.identity
    }

    #[inline]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Whether cancellation cut the run short
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.summary.partial
    }

    /// Ellipsoid factor, volume and axis-ratio fields
    pub fn derived_fields(&self) -> DerivedFields {
        DerivedFields::compute(&self.identity, &self.ellipsoids)
    }

    /// Ellipsoid assigned to voxel `(x, y, z)`
    ///
    /// Returns `None` outside the grid or where no ellipsoid was assigned.
    pub fn ellipsoid_for_voxel(&self, x: usize, y: usize, z: usize) -> Option<&Ellipsoid> {
        let dims = self.identity.dimensions();
        if !dims.contains(x as i64, y as i64, z as i64) {
            return None;
        }
        let id = usize::try_from(self.identity.get(x, y, z)).ok()?;
        self.ellipsoids.get(id)
    }

    /// Index of the largest ellipsoid containing an arbitrary point
    ///
    /// Unlike the identity field this is not restricted to foreground voxel
    /// centres (requires spatial-index feature).
    ///
    /// # Example
    ///
    /// ```
    /// # use rust_ellipsoid_factor::*;
    /// # use glam::DVec3;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// # let dims = Dimensions::new(12, 12, 12).unwrap();
    /// # let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
    /// # let config = EllipsoidFactorConfigBuilder::new().spiral_directions(8).unwrap().build().unwrap();
    /// # let analysis = EllipsoidFactorAnalysis::run(&volume, config).unwrap();
    /// if let Some(id) = analysis.ellipsoid_at(DVec3::new(6.0, 6.0, 6.0)) {
    ///     println!("largest containing ellipsoid: {:?}", analysis.ellipsoids().get(id));
    /// }
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn ellipsoid_at(&self, point: DVec3) -> Option<usize> {
        self.index.largest_containing(point)
    }

    /// Distance from `point` to the surface of the ellipsoid assigned at its voxel
    ///
    /// Returns `Ok(None)` when the point's voxel is outside the grid or
    /// unassigned. Uses the configured solver options.
    ///
    /// # Errors
    ///
    /// Returns `NonUniqueSolution` when the point is the ellipsoid's centroid.
    pub fn surface_distance(&self, point: DVec3) -> Result<Option<f64>> {
        let Some([x, y, z]) = self.identity.dimensions().voxel_of(point) else {
            return Ok(None);
        };
        match self.ellipsoid_for_voxel(x, y, z) {
            Some(ellipsoid) => closest_surface_distance(ellipsoid, point, &self.config.solver).map(Some),
            None => Ok(None),
        }
    }
}
