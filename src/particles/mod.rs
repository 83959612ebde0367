//! Animated layers of the scene
//!
//! `foliage` morphs as one coordinated field driven by a single progress
//! value; `ornaments` settle instance by instance at per-layer speeds.

pub mod foliage;
pub mod ornaments;

pub use foliage::{Particle, ParticleField};
pub use ornaments::{InstanceGroup, RigidInstance};
