//! Foliage point cloud
//!
//! Thousands of needles share one smoothed progress value. Each particle's
//! rendered position is a pure function of its two fixed anchors, that shared
//! progress, elapsed time and its own random phase, so nothing per particle
//! changes after construction. The GLSL in `render::shaders` evaluates the
//! same law on the GPU.

use rand::Rng;
use crate::animation::{Mode, Transition};
use crate::config::{ConfigError, FoliageConfig, TreeShape};
use crate::math::{sample_sphere_point, sample_tree_volume_point, Vec3};

/// Above this progress the formed tree sways in the wind
pub const WIND_THRESHOLD: f32 = 0.8;
/// Below this progress scattered needles drift like dust
pub const DRIFT_THRESHOLD: f32 = 0.2;

/// Floats per particle in `attribute_data`: chaos(3) + target(3) + color(3) + random(1)
pub const ATTRIBUTE_STRIDE: usize = 10;

/// One foliage needle, immutable once generated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub chaos: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    /// Phase seed in `[0, 1)` for twinkle and drift
    pub random: f32,
}

impl Particle {
    fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        shape: &TreeShape,
        palette: &[Vec3],
        jitter: f32,
    ) -> Self {
        let chaos = sample_sphere_point(rng, shape.chaos_radius);
        let height_ratio = rng.gen::<f32>();
        let target = sample_tree_volume_point(rng, shape.height, shape.radius, height_ratio);

        let base = palette[rng.gen_range(0..palette.len())];
        let mut channel = |c: f32| (c + (rng.gen::<f32>() - 0.5) * 2.0 * jitter).clamp(0.0, 1.0);
        let color = Vec3::new(channel(base.x), channel(base.y), channel(base.z));

        Self {
            chaos,
            target,
            color,
            random: rng.gen::<f32>(),
        }
    }

    /// Linear blend of the two anchors
    pub fn blended(&self, progress: f32) -> Vec3 {
        self.chaos.lerp(&self.target, progress)
    }

    /// Final rendered position including wind sway and drift
    pub fn position_at(&self, progress: f32, time: f32) -> Vec3 {
        displace(self.blended(progress), progress, time, self.random)
    }

    /// Twinkle opacity, independent of progress
    pub fn alpha_at(&self, time: f32) -> f32 {
        0.6 + 0.4 * (time * 3.0 + self.random * 10.0).sin()
    }
}

/// Secondary motion applied on top of the blended position
pub fn displace(base: Vec3, progress: f32, time: f32, random: f32) -> Vec3 {
    let mut pos = base;

    if progress > WIND_THRESHOLD {
        let wind = (time * 2.0 + pos.y * 0.5).sin() * 0.1 * progress;
        pos.x += wind;
        pos.z += wind * 0.5;
    }

    if progress < DRIFT_THRESHOLD {
        pos.y += (time + random * 10.0).sin() * 0.05;
    }

    pos
}

/// The foliage layer: fixed particles plus one shared transition
pub struct ParticleField {
    particles: Vec<Particle>,
    transition: Transition,
    time: f32,
    point_size: f32,
}

impl ParticleField {
    /// Generate `config.count` particles from the given random source
    pub fn new<R: Rng + ?Sized>(
        config: &FoliageConfig,
        shape: &TreeShape,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let particles = Self::generate(config, shape, rng)?;
        tracing::debug!(count = particles.len(), "foliage field built");

        Ok(Self {
            particles,
            transition: Transition::new(config.transition_rate),
            time: 0.0,
            point_size: config.point_size,
        })
    }

    /// Build from known particles
    pub fn from_particles(particles: Vec<Particle>, transition_rate: f32) -> Result<Self, ConfigError> {
        if particles.is_empty() {
            return Err(ConfigError::EmptyLayer("foliage".to_string()));
        }
        if !(transition_rate.is_finite() && transition_rate > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "foliage.transition_rate".to_string(),
                value: transition_rate,
            });
        }

        Ok(Self {
            particles,
            transition: Transition::new(transition_rate),
            time: 0.0,
            point_size: FoliageConfig::default().point_size,
        })
    }

    /// Replace every particle; progress carries over
    pub fn rebuild<R: Rng + ?Sized>(
        &mut self,
        config: &FoliageConfig,
        shape: &TreeShape,
        rng: &mut R,
    ) -> Result<(), ConfigError> {
        self.particles = Self::generate(config, shape, rng)?;
        self.transition.rate = config.transition_rate;
        self.point_size = config.point_size;
        tracing::debug!(count = self.particles.len(), "foliage field rebuilt");
        Ok(())
    }

    fn generate<R: Rng + ?Sized>(
        config: &FoliageConfig,
        shape: &TreeShape,
        rng: &mut R,
    ) -> Result<Vec<Particle>, ConfigError> {
        config.validate()?;
        shape.validate()?;
        let palette = config.colors()?;

        Ok((0..config.count)
            .map(|_| Particle::generate(rng, shape, &palette, config.color_jitter))
            .collect())
    }

    /// Advance the shared progress one frame
    pub fn update(&mut self, mode: Mode, dt: f32, time: f32) {
        self.transition.step(mode, dt);
        self.time = time;
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// Rendered position of every particle at the current progress and time
    pub fn positions(&self) -> Vec<Vec3> {
        let progress = self.progress();
        self.particles
            .iter()
            .map(|p| p.position_at(progress, self.time))
            .collect()
    }

    /// Static per-particle attributes for GPU upload, uploaded once per build
    /// Format: chaos(3) + target(3) + color(3) + random(1) = 10 floats per particle
    pub fn attribute_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.particles.len() * ATTRIBUTE_STRIDE);

        for p in &self.particles {
            data.extend_from_slice(&p.chaos.to_array());
            data.extend_from_slice(&p.target.to_array());
            data.extend_from_slice(&p.color.to_array());
            data.push(p.random);
        }

        data
    }
}
