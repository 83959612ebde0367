//! Scene assembly: camera, lights, and the animated layers

pub mod camera;
pub mod composer;
pub mod lighting;

pub use camera::CameraRig;
pub use composer::SceneComposer;
pub use lighting::{LightingRig, PointLight};
