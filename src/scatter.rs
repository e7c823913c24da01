//! Random scatter placement for cloned model instances.
//!
//! Produces the transforms for a batch of instances: positions drawn from a
//! cube around the origin, a capped tilt about X, a free half-turn about Y and
//! one uniform scale factor. Sampling is driven by an injected [`rand::Rng`]
//! so placement stays deterministic under test.

use cgmath::Vector3;
use rand::Rng;
use std::f32::consts::PI;

use crate::responsive;

/// Instances cloned per source model.
pub const INSTANCES_PER_MODEL: usize = 15;

/// Tilt cap about the X axis. Keeps instances from ending up upside down.
pub const MAX_TILT: f32 = PI / 4.0;

/// One immutable placement for a scattered clone.
///
/// Sampled once at creation and never mutated; rotation about Z is always 0.
#[derive(Debug, Clone, Copy)]
pub struct InstanceTransform {
    pub position: Vector3<f32>,
    /// Rotation about the X axis, in [-pi/4, pi/4].
    pub rotation_x: f32,
    /// Rotation about the Y axis, in [0, pi).
    pub rotation_y: f32,
    /// Uniform scale applied to all three axes.
    pub scale: f32,
}

/// Samples [`INSTANCES_PER_MODEL`] independent transforms.
///
/// `min_scale` and `max_scale` are the model's desktop bounds; each is passed
/// through the responsive scaler independently before sampling. Positions fall
/// in a cube of side `responsive::scatter_distance(width)` centered at the
/// origin.
pub fn scatter_transforms<R: Rng>(
    rng: &mut R,
    width: f32,
    min_scale: f32,
    max_scale: f32,
) -> Vec<InstanceTransform> {
    let min = responsive::instance_scale(width, min_scale);
    let max = responsive::instance_scale(width, max_scale);
    let distance = responsive::scatter_distance(width);
    let half = distance / 2.0;

    (0..INSTANCES_PER_MODEL)
        .map(|_| InstanceTransform {
            position: Vector3::new(
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
            ),
            rotation_x: rng.random_range(-MAX_TILT..=MAX_TILT),
            rotation_y: rng.random_range(0.0..PI),
            scale: rng.random_range(min..=max),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(width: f32, min: f32, max: f32) -> Vec<InstanceTransform> {
        let mut rng = StdRng::seed_from_u64(42);
        scatter_transforms(&mut rng, width, min, max)
    }

    #[test]
    fn test_batch_size_is_fixed() {
        assert_eq!(sample(1920.0, 1.0, 8.0).len(), INSTANCES_PER_MODEL);
        assert_eq!(sample(500.0, 0.2, 0.5).len(), INSTANCES_PER_MODEL);
    }

    #[test]
    fn test_positions_inside_scatter_cube() {
        for &(width, half) in &[(1920.0, 5.0), (700.0, 4.0), (500.0, 3.0)] {
            for t in sample(width, 0.2, 0.5) {
                assert!(t.position.x.abs() <= half, "x out of cube at width {width}");
                assert!(t.position.y.abs() <= half, "y out of cube at width {width}");
                assert!(t.position.z.abs() <= half, "z out of cube at width {width}");
            }
        }
    }

    #[test]
    fn test_rotation_ranges() {
        for t in sample(1920.0, 1.0, 8.0) {
            assert!(t.rotation_x >= -MAX_TILT && t.rotation_x <= MAX_TILT);
            assert!(t.rotation_y >= 0.0 && t.rotation_y < PI);
        }
    }

    #[test]
    fn test_scale_within_responsive_bounds() {
        // desktop: bounds pass through unchanged
        for t in sample(1920.0, 1.0, 8.0) {
            assert!(t.scale >= 1.0 && t.scale <= 8.0);
        }
        // mobile: both bounds halved
        for t in sample(500.0, 1.0, 8.0) {
            assert!(t.scale >= 0.5 && t.scale <= 4.0);
        }
        // tablet: 0.8x
        for t in sample(700.0, 0.2, 0.5) {
            assert!(t.scale >= 0.2 * 0.8 - 1e-6 && t.scale <= 0.5 * 0.8 + 1e-6);
        }
    }

    #[test]
    fn test_instances_are_independent() {
        let batch = sample(1920.0, 1.0, 8.0);
        // with a continuous distribution two identical placements would mean
        // the rng state is being reused per instance
        let distinct = batch
            .windows(2)
            .filter(|w| w[0].position != w[1].position)
            .count();
        assert_eq!(distinct, INSTANCES_PER_MODEL - 1);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let a = sample(1920.0, 1.0, 8.0);
        let b = sample(1920.0, 1.0, 8.0);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.scale, y.scale);
        }
    }
}
