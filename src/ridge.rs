//! Ridge field of the foreground distance map
//!
//! The ridge marks voxels near the medial axis of the foreground: the
//! difference between the grey-scale closing and opening of the Euclidean
//! distance transform. Local maxima of the distance map survive the closing
//! but are flattened by the opening, so their ridge value is large.
//!
//! # Algorithm
//!
//! 1. Exact squared Euclidean distance transform, one separable pass per
//!    axis using the lower envelope of parabolas. Everything outside the grid
//!    counts as background, so foreground touching the border is at
//!    distance 1 there.
//! 2. Grey erosion and dilation over a ball of radius [`BALL_RADIUS`],
//!    restricted to in-grid neighbours.
//! 3. `ridge = close(d) - open(d)`, never negative since the opening lies
//!    below `d` and the closing above it.
//!
//! # References
//!
//! - Felzenszwalb & Huttenlocher, "Distance Transforms of Sampled Functions",
//!   2012 ([doi:10.4086/toc.2012.v008a019](https://doi.org/10.4086/toc.2012.v008a019))

use crate::grid::{BinaryVolume, Dimensions, Field, VoxelGrid};

/// Radius of the structuring ball used for opening and closing
pub const BALL_RADIUS: i64 = 2;

/// Stand-in for an infinite squared distance
const FAR: f64 = 1.0e20;

/// Ridge field `close(edt) - open(edt)` of a binary volume
///
/// # Example
///
/// ```rust
/// use rust_ellipsoid_factor::*;
///
/// let dims = Dimensions::new(9, 9, 9).unwrap();
/// let volume = BinaryVolume::from_fn(dims, |_, _, _| true);
/// let ridge = ridge_field(&volume);
/// assert!(ridge.get(4, 4, 4) > 0.0);
/// ```
pub fn ridge_field(volume: &BinaryVolume) -> Field<f64> {
    let distance = distance_transform(volume);
    let opened = dilate(&erode(&distance));
    let closed = erode(&dilate(&distance));

    let mut ridge = closed;
    for (r, o) in ridge.as_mut_slice().iter_mut().zip(opened.as_slice()) {
        *r -= o;
    }
    ridge
}

/// Euclidean distance from every foreground voxel to the nearest background
/// voxel (including the region outside the grid); zero on background
pub fn distance_transform(volume: &BinaryVolume) -> Field<f64> {
    let dims = volume.dimensions();
    let mut distance = Field::filled(dims, 0.0);
    for (d, &foreground) in distance.as_mut_slice().iter_mut().zip(volume.as_slice()) {
        if foreground {
            *d = FAR;
        }
    }

    let squared = distance.as_mut_slice();
    transform_axis(squared, dims, 1, dims.width);
    transform_axis(squared, dims, dims.width, dims.height);
    transform_axis(squared, dims, dims.slice_len(), dims.depth);

    for d in squared.iter_mut() {
        *d = d.sqrt();
    }
    distance
}

/// Run the 1D transform over every line of the grid parallel to one axis
fn transform_axis(values: &mut [f64], dims: Dimensions, stride: usize, length: usize) {
    // Lines are padded with a background sample at both ends
    let padded = length + 2;
    let mut line = vec![0.0; padded];
    let mut output = vec![0.0; padded];
    let mut vertices = vec![0usize; padded];
    let mut bounds = vec![0.0; padded + 1];

    for start in 0..dims.len() {
        if (start / stride) % length != 0 {
            continue;
        }
        for i in 0..length {
            line[i + 1] = values[start + i * stride];
        }
        line[0] = 0.0;
        line[padded - 1] = 0.0;

        lower_envelope(&line, &mut output, &mut vertices, &mut bounds);

        for i in 0..length {
            values[start + i * stride] = output[i + 1];
        }
    }
}

/// 1D squared distance transform of a sampled function
fn lower_envelope(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let qf = q as f64;
        let mut s;
        loop {
            let p = v[k] as f64;
            s = ((f[q] + qf * qf) - (f[v[k]] + p * p)) / (2.0 * qf - 2.0 * p);
            if s <= z[k] && k > 0 {
                k -= 1;
            } else {
                break;
            }
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for q in 0..n {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k] as f64;
        d[q] = (qf - p) * (qf - p) + f[v[k]];
    }
}

/// Offsets of the structuring ball
fn ball_offsets() -> Vec<[i64; 3]> {
    let r = BALL_RADIUS;
    let mut offsets = Vec::new();
    for dz in -r..=r {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy + dz * dz <= r * r {
                    offsets.push([dx, dy, dz]);
                }
            }
        }
    }
    offsets
}

fn erode(field: &Field<f64>) -> Field<f64> {
    filter_ball(field, f64::INFINITY, f64::min)
}

fn dilate(field: &Field<f64>) -> Field<f64> {
    filter_ball(field, f64::NEG_INFINITY, f64::max)
}

/// Reduce every in-grid ball neighbourhood with `combine`
fn filter_ball(field: &Field<f64>, identity: f64, combine: fn(f64, f64) -> f64) -> Field<f64> {
    let dims = field.dimensions();
    let offsets = ball_offsets();
    Field::from_fn(dims, |x, y, z| {
        offsets.iter().fold(identity, |acc, [dx, dy, dz]| {
            let (nx, ny, nz) = (x as i64 + dx, y as i64 + dy, z as i64 + dz);
            if dims.contains(nx, ny, nz) {
                combine(acc, field.get(nx as usize, ny as usize, nz as usize))
            } else {
                acc
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Distance by exhaustive search, with the grid exterior as background
    fn brute_force_distance(volume: &BinaryVolume, x: usize, y: usize, z: usize) -> f64 {
        let dims = volume.dimensions();
        if !volume.get(x as i64, y as i64, z as i64) {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for bz in -1..=dims.depth as i64 {
            for by in -1..=dims.height as i64 {
                for bx in -1..=dims.width as i64 {
                    if volume.get(bx, by, bz) {
                        continue;
                    }
                    let d = ((bx - x as i64).pow(2) + (by - y as i64).pow(2) + (bz - z as i64).pow(2))
                        as f64;
                    best = best.min(d);
                }
            }
        }
        best.sqrt()
    }

    #[test]
    fn test_distance_of_single_line() {
        let dims = Dimensions::new(7, 1, 1).unwrap();
        let volume = BinaryVolume::from_fn(dims, |x, _, _| x != 2);
        let distance = distance_transform(&volume);
        // Only the x axis separates voxels from background: y and z exits are 1 away
        assert_eq!(distance.as_slice(), &[1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_distance_matches_brute_force() {
        let dims = Dimensions::new(9, 8, 7).unwrap();
        let volume = BinaryVolume::from_fn(dims, |x, y, z| {
            let (fx, fy, fz) = (x as f64 - 4.0, y as f64 - 3.5, z as f64 - 3.0);
            fx * fx / 16.0 + fy * fy / 12.0 + fz * fz / 9.0 < 1.0 && !(x == 3 && y == 4 && z == 3)
        });
        let distance = distance_transform(&volume);
        for z in 0..dims.depth {
            for y in 0..dims.height {
                for x in 0..dims.width {
                    assert_relative_eq!(
                        distance.get(x, y, z),
                        brute_force_distance(&volume, x, y, z),
                        epsilon = 1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn test_ball_offsets() {
        let offsets = ball_offsets();
        // 1 + 6 + 12 + 8 + 6 lattice points within radius 2
        assert_eq!(offsets.len(), 33);
        assert!(offsets.contains(&[0, 0, 2]));
        assert!(!offsets.contains(&[1, 1, 2]));
    }

    #[test]
    fn test_ridge_is_non_negative_and_zero_on_flat_field() {
        let dims = Dimensions::new(6, 6, 6).unwrap();
        let empty = BinaryVolume::from_fn(dims, |_, _, _| false);
        assert!(ridge_field(&empty).as_slice().iter().all(|&r| r == 0.0));

        let volume = BinaryVolume::from_fn(dims, |x, y, _| x + y < 8);
        assert!(ridge_field(&volume).as_slice().iter().all(|&r| r >= 0.0));
    }

    #[test]
    fn test_ridge_peaks_on_medial_plane() {
        // Wide slab of thickness 9 along z, medial plane z = 6
        let dims = Dimensions::new(20, 20, 13).unwrap();
        let volume = BinaryVolume::from_fn(dims, |x, y, z| {
            (1..19).contains(&x) && (1..19).contains(&y) && (2..11).contains(&z)
        });
        let ridge = ridge_field(&volume);
        assert_relative_eq!(ridge.get(10, 10, 6), 2.0, epsilon = 1e-9);
        assert_relative_eq!(ridge.get(10, 10, 4), 0.0, epsilon = 1e-9);
        assert_relative_eq!(ridge.get(10, 10, 8), 0.0, epsilon = 1e-9);
    }
}
