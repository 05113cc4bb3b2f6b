pub mod backend;
pub mod engine;
pub mod indicators;


pub use backend::*;
pub use engine::*;
pub use indicators::*;
