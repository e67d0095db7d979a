pub mod features;
pub mod mesh_text;

pub use features::*;
pub use mesh_text::{MeshParseError, ParsedMesh};
