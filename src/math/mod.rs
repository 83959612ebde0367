pub mod vec3;
pub mod quat;
pub mod matrix;
pub mod sampling;

pub use vec3::Vec3;
pub use quat::Quat;
pub use matrix::Mat4;
pub use sampling::{sample_sphere_point, sample_tree_surface_point, sample_tree_volume_point};
