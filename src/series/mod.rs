mod merge;
mod series_set;
mod types;

pub use merge::*;
pub use series_set::*;
pub use types::*;
