pub mod exchange;
pub mod latest;

pub use exchange::*;
pub use latest::*;
