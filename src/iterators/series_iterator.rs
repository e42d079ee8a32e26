use crate::common::{Sample, Timestamp};
use crate::error::{QueryError, QueryResult};

/// A cursor over the samples of a single series.
///
/// Timestamps produced by successive calls to [`SeriesIterator::next`] are strictly
/// increasing. [`SeriesIterator::at`] is defined only after `next` or `seek` returned true.
pub trait SeriesIterator: Send {
    /// Advances to the next sample. Returns false once the iterator is exhausted.
    fn next(&mut self) -> bool;

    /// Positions the iterator at the first sample with timestamp >= `t`. If the current
    /// sample already satisfies this the iterator does not move. Returns false if no
    /// such sample exists.
    fn seek(&mut self, t: Timestamp) -> bool;

    /// The sample under the cursor.
    fn at(&self) -> Option<Sample>;

    /// Any error encountered while iterating.
    fn err(&self) -> Option<QueryError>;
}

pub type BoxedSeriesIterator = Box<dyn SeriesIterator>;

impl<T: SeriesIterator + ?Sized> SeriesIterator for Box<T> {
    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn seek(&mut self, t: Timestamp) -> bool {
        (**self).seek(t)
    }

    fn at(&self) -> Option<Sample> {
        (**self).at()
    }

    fn err(&self) -> Option<QueryError> {
        (**self).err()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySeriesIterator;

impl SeriesIterator for EmptySeriesIterator {
    fn next(&mut self) -> bool {
        false
    }

    fn seek(&mut self, _t: Timestamp) -> bool {
        false
    }

    fn at(&self) -> Option<Sample> {
        None
    }

    fn err(&self) -> Option<QueryError> {
        None
    }
}

/// Drains the iterator, returning its samples or the first error it reported.
pub fn collect_samples<I: SeriesIterator + ?Sized>(iter: &mut I) -> QueryResult<Vec<Sample>> {
    let mut samples = Vec::new();
    while iter.next() {
        if let Some(sample) = iter.at() {
            samples.push(sample);
        }
    }
    match iter.err() {
        Some(err) => Err(err),
        None => Ok(samples),
    }
}
