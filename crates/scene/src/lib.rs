pub mod components;
pub mod config;
pub mod group;
pub mod mesh;
pub mod resources;
pub mod selection;
pub mod world;

pub use config::*;
pub use group::*;
pub use mesh::*;
pub use world::*;
