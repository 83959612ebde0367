use std::f32::consts::PI;
use serde::{Deserialize, Serialize};
use crate::math::Vec3;
use super::palette::{colors, parse_palette};
use super::ConfigError;

/// Shape of both formations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeShape {
    /// Height of the assembled cone
    pub height: f32,
    /// Cone radius at the base
    pub radius: f32,
    /// Radius of the scattered cloud
    pub chaos_radius: f32,
    /// How far ornaments hang outside the foliage cone
    pub surface_offset: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: 14.0,
            radius: 5.0,
            chaos_radius: 25.0,
            surface_offset: 0.5,
        }
    }
}

impl TreeShape {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tree.height", self.height)?;
        positive("tree.radius", self.radius)?;
        positive("tree.chaos_radius", self.chaos_radius)?;
        non_negative("tree.surface_offset", self.surface_offset)
    }
}

/// Foliage point cloud settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    pub count: usize,
    pub palette: Vec<String>,
    /// Smoothing rate of the shared progress, per second
    pub transition_rate: f32,
    /// Per-channel color variation, +/- this amount
    pub color_jitter: f32,
    /// Base sprite size in pixels at unit depth
    pub point_size: f32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            count: 12_000,
            palette: vec![
                colors::PINE_GREEN.to_string(),
                colors::VIBRANT_GREEN.to_string(),
                colors::DEEP_NEEDLE.to_string(),
            ],
            transition_rate: 2.5,
            color_jitter: 0.05,
            point_size: 12.0,
        }
    }
}

impl FoliageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::EmptyLayer("foliage".to_string()));
        }
        positive("foliage.transition_rate", self.transition_rate)?;
        positive("foliage.point_size", self.point_size)?;
        non_negative("foliage.color_jitter", self.color_jitter)?;
        parse_palette("foliage", &self.palette).map(|_| ())
    }

    pub fn colors(&self) -> Result<Vec<Vec3>, ConfigError> {
        parse_palette("foliage", &self.palette)
    }
}

/// Geometry used to draw an ornament layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrnamentShape {
    Sphere,
    Box,
    /// Small emissive sphere
    Light,
}

/// One instanced ornament layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrnamentConfig {
    pub name: String,
    pub shape: OrnamentShape,
    pub count: usize,
    pub palette: Vec<String>,
    pub scale_range: [f32; 2],
    /// Interpolation rate per second; lower reads as heavier
    pub speed_factor: f32,
}

impl OrnamentConfig {
    pub fn balls() -> Self {
        Self {
            name: "balls".to_string(),
            shape: OrnamentShape::Sphere,
            count: 150,
            palette: vec![
                colors::SANTA_RED.to_string(),
                colors::CLASSIC_GOLD.to_string(),
                colors::SNOW_WHITE.to_string(),
                colors::BERRY_RED.to_string(),
            ],
            scale_range: [0.3, 0.6],
            speed_factor: 2.0,
        }
    }

    pub fn gifts() -> Self {
        Self {
            name: "gifts".to_string(),
            shape: OrnamentShape::Box,
            count: 40,
            palette: vec![
                colors::BERRY_RED.to_string(),
                colors::CHAMPAGNE_GOLD.to_string(),
                colors::SNOW_WHITE.to_string(),
            ],
            scale_range: [0.4, 0.7],
            speed_factor: 1.5,
        }
    }

    pub fn lights() -> Self {
        Self {
            name: "lights".to_string(),
            shape: OrnamentShape::Light,
            count: 300,
            palette: vec![
                colors::WARM_LIGHT.to_string(),
                colors::CLASSIC_GOLD.to_string(),
            ],
            scale_range: [0.05, 0.1],
            speed_factor: 4.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::EmptyLayer(self.name.clone()));
        }
        positive(&format!("{}.speed_factor", self.name), self.speed_factor)?;
        let [min, max] = self.scale_range;
        positive(&format!("{}.scale_range", self.name), min)?;
        positive(&format!("{}.scale_range", self.name), max)?;
        if min > max {
            return Err(ConfigError::InvertedScaleRange {
                layer: self.name.clone(),
                min,
                max,
            });
        }
        parse_palette(&self.name, &self.palette).map(|_| ())
    }

    pub fn colors(&self) -> Result<Vec<Vec3>, ConfigError> {
        parse_palette(&self.name, &self.palette)
    }
}

/// Camera placement, auto-orbit and manual orbit limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub start: Vec3,
    pub fov_degrees: f32,
    /// Auto-orbit radius while formed
    pub orbit_radius: f32,
    /// Auto-orbit angular speed, radians per second
    pub orbit_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits measured from +Y, radians
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start: Vec3::new(0.0, 5.0, 35.0),
            fov_degrees: 50.0,
            orbit_radius: 30.0,
            orbit_speed: 0.1,
            min_distance: 10.0,
            max_distance: 50.0,
            min_polar: PI / 2.5,
            max_polar: PI / 1.8,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("camera.fov_degrees", self.fov_degrees)?;
        positive("camera.orbit_radius", self.orbit_radius)?;
        positive("camera.min_distance", self.min_distance)?;
        positive("camera.max_distance", self.max_distance)?;
        if !self.start.is_finite() {
            return Err(ConfigError::NonFinite("camera.start".to_string()));
        }
        if !self.orbit_speed.is_finite() {
            return Err(ConfigError::NonFinite("camera.orbit_speed".to_string()));
        }
        ordered("camera.distance", self.min_distance, self.max_distance)?;
        positive("camera.min_polar", self.min_polar)?;
        ordered("camera.polar", self.min_polar, self.max_polar)?;
        if self.max_polar >= PI {
            return Err(ConfigError::InvertedRange {
                field: "camera.polar".to_string(),
                min: self.max_polar,
                max: PI,
            });
        }
        Ok(())
    }
}

/// Bloom and vignette pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub bloom_threshold: f32,
    pub bloom_strength: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
}

impl PostConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("post.bloom_threshold", self.bloom_threshold)?;
        non_negative("post.bloom_strength", self.bloom_strength)?;
        non_negative("post.vignette_offset", self.vignette_offset)?;
        non_negative("post.vignette_darkness", self.vignette_darkness)
    }
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            bloom_threshold: 0.9,
            bloom_strength: 1.5,
            vignette_offset: 0.1,
            vignette_darkness: 1.2,
        }
    }
}

/// Complete static scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub tree: TreeShape,
    pub foliage: FoliageConfig,
    pub balls: OrnamentConfig,
    pub gifts: OrnamentConfig,
    pub lights: OrnamentConfig,
    pub camera: CameraConfig,
    pub post: PostConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tree: TreeShape::default(),
            foliage: FoliageConfig::default(),
            balls: OrnamentConfig::balls(),
            gifts: OrnamentConfig::gifts(),
            lights: OrnamentConfig::lights(),
            camera: CameraConfig::default(),
            post: PostConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse from YAML and validate
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tree.validate()?;
        self.foliage.validate()?;
        for layer in self.ornament_layers() {
            layer.validate()?;
        }
        self.camera.validate()?;
        self.post.validate()
    }

    /// Ornament layers in draw order
    pub fn ornament_layers(&self) -> [&OrnamentConfig; 3] {
        [&self.balls, &self.gifts, &self.lights]
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            field: field.to_string(),
            value,
        })
    }
}

fn ordered(field: &str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange {
            field: field.to_string(),
            min,
            max,
        })
    }
}
