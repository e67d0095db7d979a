pub mod bounds;
pub mod primitives;
pub mod transform;

pub use bounds::*;
pub use primitives::*;
pub use transform::*;
