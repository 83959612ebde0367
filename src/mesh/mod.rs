pub mod primitives;

pub use primitives::{Mesh, Vertex};
