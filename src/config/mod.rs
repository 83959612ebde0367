//! Static scene configuration
//!
//! Loaded once from YAML (or taken from defaults) and validated before any
//! animated component is built.

pub mod palette;
pub mod settings;

use thiserror::Error;

pub use palette::{parse_hex_color, parse_palette};
pub use settings::{
    CameraConfig, FoliageConfig, OrnamentConfig, OrnamentShape, PostConfig, SceneConfig, TreeShape,
};

/// Construction-time configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: String, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f32 },

    #[error("{0} must be finite")]
    NonFinite(String),

    #[error("layer '{0}' needs at least one instance")]
    EmptyLayer(String),

    #[error("layer '{0}' has an empty palette")]
    EmptyPalette(String),

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error("layer '{layer}' scale range [{min}, {max}] is inverted")]
    InvertedScaleRange { layer: String, min: f32, max: f32 },

    #[error("{field} range [{min}, {max}] is empty")]
    InvertedRange { field: String, min: f32, max: f32 },
}
