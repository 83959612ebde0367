//! Point generators for the two formations
//!
//! Every generator draws from a caller-supplied random source, so a seeded
//! generator reproduces the same cloud.

use std::f32::consts::TAU;
use rand::Rng;
use super::Vec3;

/// Uniform-by-volume point inside a sphere of `radius` centered at the origin
///
/// The radius follows a cube-root law and the direction is uniform on the
/// unit sphere, so density is flat from center to surface.
pub fn sample_sphere_point<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = TAU * rng.gen::<f32>();
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;

    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Vertical coordinate for a height fraction, with the tree centered on the origin
#[inline]
pub fn tree_height_at(height: f32, height_ratio: f32) -> f32 {
    height_ratio * height - height / 2.0
}

/// Cone radius at a height fraction, tapering linearly to zero at the apex
#[inline]
pub fn tree_radius_at(max_radius: f32, height_ratio: f32) -> f32 {
    max_radius * (1.0 - height_ratio)
}

/// Point inside the tree cone at height fraction `height_ratio`
/// (0 = base, 1 = apex), uniform by area across the disk at that height.
pub fn sample_tree_volume_point<R: Rng + ?Sized>(
    rng: &mut R,
    height: f32,
    max_radius: f32,
    height_ratio: f32,
) -> Vec3 {
    let y = tree_height_at(height, height_ratio);
    let r = tree_radius_at(max_radius, height_ratio);
    let angle = rng.gen::<f32>() * TAU;
    let volume_r = r * rng.gen::<f32>().sqrt();

    Vec3::new(volume_r * angle.cos(), y, volume_r * angle.sin())
}

/// Point on the tree cone surface pushed out by `offset`, used for ornaments
/// so they hang just outside the foliage.
pub fn sample_tree_surface_point<R: Rng + ?Sized>(
    rng: &mut R,
    height: f32,
    max_radius: f32,
    height_ratio: f32,
    offset: f32,
) -> Vec3 {
    let y = tree_height_at(height, height_ratio);
    let r = tree_radius_at(max_radius, height_ratio) + offset;
    let angle = rng.gen::<f32>() * TAU;

    Vec3::new(r * angle.cos(), y, r * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_sphere_points_contained() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..5000 {
            let p = sample_sphere_point(&mut rng, 25.0);
            assert!(p.length() <= 25.0 + 1e-3, "{:?} escaped the sphere", p);
        }
    }

    #[test]
    fn test_sphere_radial_distribution_follows_cube_law() {
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        let samples = 20_000;
        let radius = 10.0;
        let mut bins = [0usize; 10];
        for _ in 0..samples {
            let d = sample_sphere_point(&mut rng, radius).length() / radius;
            let bin = ((d * 10.0) as usize).min(9);
            bins[bin] += 1;
        }

        // Empirical CDF must track r^3, and must be far from the uniform CDF r
        let mut cumulative = 0usize;
        for (i, count) in bins.iter().enumerate() {
            cumulative += count;
            let r = (i + 1) as f32 / 10.0;
            let empirical = cumulative as f32 / samples as f32;
            assert!(
                (empirical - r.powi(3)).abs() < 0.02,
                "CDF at {} was {}, expected {}",
                r,
                empirical,
                r.powi(3)
            );
        }
        let below_half = bins[..5].iter().sum::<usize>() as f32 / samples as f32;
        assert!(below_half < 0.2, "inner half held {} of the points", below_half);
    }

    #[test]
    fn test_sphere_points_not_biased_to_one_side() {
        let mut rng = SmallRng::seed_from_u64(99);
        let mut sum = Vec3::ZERO;
        let samples = 10_000;
        for _ in 0..samples {
            sum += sample_sphere_point(&mut rng, 1.0);
        }
        let mean = sum.scale(1.0 / samples as f32);
        assert!(mean.length() < 0.03, "mean drifted to {:?}", mean);
    }

    #[test]
    fn test_tree_volume_height_and_taper() {
        let mut rng = SmallRng::seed_from_u64(11);
        let (height, radius) = (14.0, 5.0);
        for i in 0..=100 {
            let h = i as f32 / 100.0;
            let p = sample_tree_volume_point(&mut rng, height, radius, h);
            assert_eq!(p.y, h * height - height / 2.0);
            assert!(p.horizontal_length() <= radius * (1.0 - h) + 1e-4);
        }
    }

    #[test]
    fn test_tree_volume_fills_disk_by_area() {
        let mut rng = SmallRng::seed_from_u64(12);
        let samples = 10_000;
        let inner = (0..samples)
            .map(|_| sample_tree_volume_point(&mut rng, 10.0, 4.0, 0.0))
            .filter(|p| p.horizontal_length() <= 2.0)
            .count();
        // Half the radius covers a quarter of the area
        let fraction = inner as f32 / samples as f32;
        assert!((fraction - 0.25).abs() < 0.03, "inner disk held {}", fraction);
    }

    #[test]
    fn test_tree_apex_collapses_to_axis() {
        let mut rng = SmallRng::seed_from_u64(3);
        let p = sample_tree_volume_point(&mut rng, 14.0, 5.0, 1.0);
        assert!(p.horizontal_length() < 1e-5);
        assert_eq!(p.y, 7.0);
    }

    #[test]
    fn test_tree_surface_sits_outside_volume() {
        let mut rng = SmallRng::seed_from_u64(5);
        for i in 0..50 {
            let h = i as f32 / 50.0;
            let p = sample_tree_surface_point(&mut rng, 14.0, 5.0, h, 0.5);
            let expected = 5.0 * (1.0 - h) + 0.5;
            assert!((p.horizontal_length() - expected).abs() < 1e-4);
            assert_eq!(p.y, h * 14.0 - 7.0);
        }
    }

    #[test]
    fn test_generators_are_deterministic_per_seed() {
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(sample_sphere_point(&mut a, 3.0), sample_sphere_point(&mut b, 3.0));
            assert_eq!(
                sample_tree_volume_point(&mut a, 14.0, 5.0, 0.3),
                sample_tree_volume_point(&mut b, 14.0, 5.0, 0.3)
            );
        }
    }
}
