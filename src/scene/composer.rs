use rand::rngs::SmallRng;
use rand::SeedableRng;
use crate::animation::Mode;
use crate::config::{ConfigError, SceneConfig};
use crate::particles::{InstanceGroup, ParticleField};
use super::camera::CameraRig;
use super::lighting::LightingRig;

/// Assembles the foliage field, the ornament layers, camera and lights, and
/// hands each frame to them. Each layer keeps its own transition state; the
/// composer only forwards the mode and the frame timing.
pub struct SceneComposer {
    config: SceneConfig,
    foliage: ParticleField,
    ornaments: Vec<InstanceGroup>,
    camera: CameraRig,
    lighting: LightingRig,
    time: f32,
    rng: SmallRng,
}

impl SceneComposer {
    /// Validate the config and generate every layer from `seed`
    pub fn new(config: SceneConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);

        let foliage = ParticleField::new(&config.foliage, &config.tree, &mut rng)?;
        let ornaments = config
            .ornament_layers()
            .into_iter()
            .map(|layer| InstanceGroup::new(layer, &config.tree, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            seed,
            foliage = foliage.count(),
            layers = ornaments.len(),
            "scene composed"
        );

        Ok(Self {
            camera: CameraRig::new(config.camera),
            lighting: LightingRig::default(),
            config,
            foliage,
            ornaments,
            time: 0.0,
            rng,
        })
    }

    /// Swap in a new config, regenerating every layer wholesale
    ///
    /// The config is validated up front, so on error the current scene is
    /// left untouched. Foliage progress carries over.
    pub fn reconfigure(&mut self, config: SceneConfig) -> Result<(), ConfigError> {
        config.validate()?;

        self.foliage.rebuild(&config.foliage, &config.tree, &mut self.rng)?;
        for (group, layer) in self.ornaments.iter_mut().zip(config.ornament_layers()) {
            group.rebuild(layer, &config.tree, &mut self.rng)?;
        }
        self.camera = CameraRig::new(config.camera);
        self.config = config;
        Ok(())
    }

    /// Dispatch one frame to every animated layer
    ///
    /// Negative or non-finite deltas are treated as a zero-length frame.
    pub fn advance(&mut self, mode: Mode, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "discarding invalid frame delta");
            0.0
        };
        self.time += dt;

        self.foliage.update(mode, dt, self.time);
        for group in &mut self.ornaments {
            group.update(mode, dt);
        }
        self.camera.update(mode, self.time);
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn foliage(&self) -> &ParticleField {
        &self.foliage
    }

    pub fn ornaments(&self) -> &[InstanceGroup] {
        &self.ornaments
    }

    pub fn ornament(&self, name: &str) -> Option<&InstanceGroup> {
        self.ornaments.iter().find(|g| g.name() == name)
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    /// Seconds since the scene started
    pub fn time(&self) -> f32 {
        self.time
    }
}
