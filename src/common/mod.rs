pub mod constants;
mod types;

pub use types::*;
