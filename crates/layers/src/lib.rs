pub mod builder;
pub mod classify;
pub mod height;
pub mod session;
pub mod vector;

pub use builder::*;
pub use classify::*;
pub use height::*;
pub use session::*;
