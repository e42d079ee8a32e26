mod merge_series_iterator;
mod series_iterator;
mod vec_series_iterator;

pub use merge_series_iterator::MergeSeriesIterator;
pub use series_iterator::*;
pub use vec_series_iterator::VecSeriesIterator;
