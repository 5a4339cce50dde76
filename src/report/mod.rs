pub mod types;
pub mod operations;

pub use types::*;
