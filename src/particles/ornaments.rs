//! Instanced rigid ornaments
//!
//! Unlike the foliage, every ornament carries its own position and eases
//! toward the active formation independently. A layer's speed factor acts as
//! its weight: light layers settle first, heavy ones trail behind.

use rand::Rng;
use crate::animation::{approach_factor, Mode};
use crate::config::{ConfigError, OrnamentConfig, OrnamentShape, TreeShape};
use crate::math::{sample_sphere_point, sample_tree_surface_point, Mat4, Quat, Vec3};

/// Floats per instance in `transform_data`
pub const TRANSFORM_STRIDE: usize = 16;
/// Floats per instance in `color_data`
pub const COLOR_STRIDE: usize = 3;

/// Rate at which tilt eases back to upright once formed, per second
const UPRIGHT_RATE: f32 = 1.0;

/// A single ornament
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidInstance {
    /// Current position, the only field the frame update moves
    pub current: Vec3,
    pub chaos: Vec3,
    pub target: Vec3,
    pub scale: Vec3,
    pub rotation_axis: Vec3,
    /// Signed tumble speed, radians per second
    pub rotation_speed: f32,
    pub color: Vec3,
    /// Accumulated orientation from tumbling and settling
    pub orientation: Quat,
}

impl RigidInstance {
    fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &OrnamentConfig,
        shape: &TreeShape,
        palette: &[Vec3],
    ) -> Self {
        let chaos = sample_sphere_point(rng, shape.chaos_radius);
        let height_ratio = rng.gen::<f32>();
        let target = sample_tree_surface_point(
            rng,
            shape.height,
            shape.radius,
            height_ratio,
            shape.surface_offset,
        );

        let color = palette[rng.gen_range(0..palette.len())];
        let [min, max] = config.scale_range;
        let scale = Vec3::splat(min + rng.gen::<f32>() * (max - min));

        let axis = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        let rotation_axis = if axis.length_squared() > 1e-8 {
            axis.normalize()
        } else {
            Vec3::UP
        };
        let rotation_speed = (rng.gen::<f32>() - 0.5) * 2.0;

        Self {
            current: chaos,
            chaos,
            target,
            scale,
            rotation_axis,
            rotation_speed,
            color,
            orientation: Quat::IDENTITY,
        }
    }

    /// Where this ornament is heading in the given mode
    pub fn destination(&self, mode: Mode) -> Vec3 {
        if mode.is_formed() {
            self.target
        } else {
            self.chaos
        }
    }

    /// Share of the chaos-to-target distance already covered, in `[0, 1]`
    pub fn formation(&self) -> f32 {
        let span = self.chaos.distance(&self.target);
        if span <= f32::EPSILON {
            return 1.0;
        }
        (1.0 - self.current.distance(&self.target) / span).clamp(0.0, 1.0)
    }

    fn step(&mut self, mode: Mode, dt: f32, speed_factor: f32) {
        let dest = self.destination(mode);
        self.current = self.current.lerp(&dest, approach_factor(dt, speed_factor));

        if mode.is_formed() {
            let mut euler = self.orientation.to_euler_xyz();
            let settle = approach_factor(dt, UPRIGHT_RATE);
            euler.x += (0.0 - euler.x) * settle;
            euler.z += (0.0 - euler.z) * settle;
            self.orientation = Quat::from_euler_xyz(euler);
        } else {
            let spin = Quat::from_axis_angle(self.rotation_axis, self.rotation_speed * dt);
            self.orientation = self.orientation.mul(&spin).normalize();
        }
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_trs(self.current, self.orientation, self.scale)
    }
}

/// One ornament layer: a fixed arena of instances updated in place
pub struct InstanceGroup {
    name: String,
    shape: OrnamentShape,
    speed_factor: f32,
    instances: Vec<RigidInstance>,
}

impl InstanceGroup {
    pub fn new<R: Rng + ?Sized>(
        config: &OrnamentConfig,
        shape: &TreeShape,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let instances = Self::generate(config, shape, rng)?;
        tracing::debug!(layer = %config.name, count = instances.len(), "ornament group built");

        Ok(Self {
            name: config.name.clone(),
            shape: config.shape,
            speed_factor: config.speed_factor,
            instances,
        })
    }

    /// Regenerate the whole set; no instance survives a rebuild
    pub fn rebuild<R: Rng + ?Sized>(
        &mut self,
        config: &OrnamentConfig,
        shape: &TreeShape,
        rng: &mut R,
    ) -> Result<(), ConfigError> {
        self.instances = Self::generate(config, shape, rng)?;
        self.name = config.name.clone();
        self.shape = config.shape;
        self.speed_factor = config.speed_factor;
        tracing::debug!(layer = %self.name, count = self.instances.len(), "ornament group rebuilt");
        Ok(())
    }

    fn generate<R: Rng + ?Sized>(
        config: &OrnamentConfig,
        shape: &TreeShape,
        rng: &mut R,
    ) -> Result<Vec<RigidInstance>, ConfigError> {
        config.validate()?;
        shape.validate()?;
        let palette = config.colors()?;

        Ok((0..config.count)
            .map(|_| RigidInstance::generate(rng, config, shape, &palette))
            .collect())
    }

    /// Advance every instance one frame
    pub fn update(&mut self, mode: Mode, dt: f32) {
        let speed = self.speed_factor;
        for instance in &mut self.instances {
            instance.step(mode, dt, speed);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> OrnamentShape {
        self.shape
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn instances(&self) -> &[RigidInstance] {
        &self.instances
    }

    pub fn count(&self) -> usize {
        self.instances.len()
    }

    /// Mean formation across the group
    pub fn formation(&self) -> f32 {
        if self.instances.is_empty() {
            return 0.0;
        }
        self.instances.iter().map(|i| i.formation()).sum::<f32>() / self.instances.len() as f32
    }

    /// Column-major model matrix per instance, 16 floats each
    pub fn transform_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.instances.len() * TRANSFORM_STRIDE);
        for instance in &self.instances {
            data.extend_from_slice(instance.transform().as_slice());
        }
        data
    }

    /// Static RGB per instance, uploaded once per build
    pub fn color_data(&self) -> Vec<f32> {
        self.instances
            .iter()
            .flat_map(|i| i.color.to_array())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn group(config: &OrnamentConfig, seed: u64) -> InstanceGroup {
        let mut rng = SmallRng::seed_from_u64(seed);
        InstanceGroup::new(config, &TreeShape::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_group_starts_scattered() {
        let g = group(&OrnamentConfig::balls(), 1);
        assert_eq!(g.count(), 150);
        for i in g.instances() {
            assert_eq!(i.current, i.chaos);
            assert_eq!(i.orientation, Quat::IDENTITY);
        }
    }

    #[test]
    fn test_instances_use_configured_ranges() {
        let config = OrnamentConfig::gifts();
        let palette = config.colors().unwrap();
        let g = group(&config, 2);
        for i in g.instances() {
            assert!(i.scale.x >= 0.4 && i.scale.x <= 0.7);
            assert_eq!(i.scale.x, i.scale.y);
            assert!(palette.contains(&i.color));
            assert!((i.rotation_axis.length() - 1.0).abs() < 1e-4);
            assert!(i.rotation_speed >= -1.0 && i.rotation_speed < 1.0);
        }
    }

    #[test]
    fn test_targets_hang_outside_foliage() {
        let shape = TreeShape::default();
        let g = group(&OrnamentConfig::lights(), 3);
        for i in g.instances() {
            let h = (i.target.y + shape.height / 2.0) / shape.height;
            let cone = shape.radius * (1.0 - h);
            assert!((i.target.horizontal_length() - (cone + shape.surface_offset)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_converges_to_target_when_formed() {
        let mut g = group(&OrnamentConfig::balls(), 4);
        for _ in 0..600 {
            g.update(Mode::Formed, 1.0 / 60.0);
        }
        for i in g.instances() {
            assert!(i.current.distance(&i.target) < 1e-3);
        }
        assert!(g.formation() > 0.999);
    }

    #[test]
    fn test_returns_to_chaos() {
        let mut g = group(&OrnamentConfig::gifts(), 5);
        for _ in 0..300 {
            g.update(Mode::Formed, 1.0 / 30.0);
        }
        for _ in 0..600 {
            g.update(Mode::Chaos, 1.0 / 30.0);
        }
        for i in g.instances() {
            assert!(i.current.distance(&i.chaos) < 1e-2);
        }
    }

    #[test]
    fn test_lighter_layers_settle_first() {
        let mut lights = group(&OrnamentConfig::lights(), 6);
        let mut gifts = group(&OrnamentConfig::gifts(), 6);
        for _ in 0..30 {
            lights.update(Mode::Formed, 1.0 / 60.0);
            gifts.update(Mode::Formed, 1.0 / 60.0);
        }
        assert!(lights.formation() > gifts.formation());
    }

    #[test]
    fn test_tumbles_while_scattered() {
        let mut g = group(&OrnamentConfig::balls(), 7);
        g.update(Mode::Chaos, 0.5);
        let moved = g.instances().iter().filter(|i| i.orientation != Quat::IDENTITY).count();
        assert!(moved > 0);
        for i in g.instances() {
            assert!((i.orientation.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_settles_upright_when_formed() {
        let mut g = group(&OrnamentConfig::balls(), 8);
        for _ in 0..120 {
            g.update(Mode::Chaos, 1.0 / 30.0);
        }
        for _ in 0..900 {
            g.update(Mode::Formed, 1.0 / 30.0);
        }
        for i in g.instances() {
            let euler = i.orientation.to_euler_xyz();
            assert!(euler.x.abs() < 1e-2, "tilt x {}", euler.x);
            assert!(euler.z.abs() < 1e-2, "tilt z {}", euler.z);
        }
    }

    #[test]
    fn test_no_nan_under_wild_deltas() {
        let mut g = group(&OrnamentConfig::lights(), 9);
        let deltas = [0.0, 1e-6, 0.016, 5.0, 100.0, 0.3];
        for round in 0..50 {
            let mode = if round % 3 == 0 { Mode::Chaos } else { Mode::Formed };
            for &dt in &deltas {
                g.update(mode, dt);
            }
        }
        for i in g.instances() {
            assert!(i.current.is_finite());
            assert!(i.orientation.is_finite());
        }
        assert!(g.transform_data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_buffer_layouts() {
        let g = group(&OrnamentConfig::gifts(), 10);
        assert_eq!(g.transform_data().len(), 40 * TRANSFORM_STRIDE);
        assert_eq!(g.color_data().len(), 40 * COLOR_STRIDE);

        let first = g.instances()[0];
        let data = g.transform_data();
        assert_eq!(&data[12..15], &first.current.to_array());
    }

    #[test]
    fn test_rebuild_on_count_change() {
        let mut g = group(&OrnamentConfig::balls(), 11);
        g.update(Mode::Formed, 0.2);
        let mut config = OrnamentConfig::balls();
        config.count = 3;
        let mut rng = SmallRng::seed_from_u64(12);
        g.rebuild(&config, &TreeShape::default(), &mut rng).unwrap();
        assert_eq!(g.count(), 3);
        for i in g.instances() {
            assert_eq!(i.current, i.chaos);
        }
    }

    #[test]
    fn test_rejects_empty_palette() {
        let mut config = OrnamentConfig::lights();
        config.palette.clear();
        let mut rng = SmallRng::seed_from_u64(0);
        let result = InstanceGroup::new(&config, &TreeShape::default(), &mut rng);
        assert!(matches!(result, Err(ConfigError::EmptyPalette(_))));
    }
}
