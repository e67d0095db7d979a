pub mod export;
pub mod preset;
pub mod state;

pub use export::*;
pub use preset::*;
pub use state::*;
