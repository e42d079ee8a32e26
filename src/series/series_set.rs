use super::{Series, SeriesRef};
use crate::common::Sample;
use crate::error::{QueryError, QueryResult};
use crate::iterators::collect_samples;
use crate::labels::Labels;

/// A lazy, forward-only sequence of series, ordered by label set.
///
/// Call [`SeriesSet::next`] to advance; [`SeriesSet::at`] then returns the series under the
/// cursor. Once `next` returns false, check [`SeriesSet::err`]: a set may fail part way
/// through, after some series were already produced.
pub trait SeriesSet: Send {
    fn next(&mut self) -> bool;

    fn at(&self) -> Option<SeriesRef>;

    fn err(&self) -> Option<QueryError>;
}

pub type BoxedSeriesSet = Box<dyn SeriesSet>;

/// An always-empty set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSeriesSet;

impl SeriesSet for NoopSeriesSet {
    fn next(&mut self) -> bool {
        false
    }

    fn at(&self) -> Option<SeriesRef> {
        None
    }

    fn err(&self) -> Option<QueryError> {
        None
    }
}

/// An empty set carrying an error.
#[derive(Debug, Clone)]
pub struct ErrSeriesSet {
    err: QueryError,
}

impl ErrSeriesSet {
    pub fn new(err: QueryError) -> Self {
        Self { err }
    }
}

impl SeriesSet for ErrSeriesSet {
    fn next(&mut self) -> bool {
        false
    }

    fn at(&self) -> Option<SeriesRef> {
        None
    }

    fn err(&self) -> Option<QueryError> {
        Some(self.err.clone())
    }
}

/// A set over a materialized list of series.
pub struct VecSeriesSet {
    series: Vec<SeriesRef>,
    index: usize,
    current: Option<SeriesRef>,
    trailing_err: Option<QueryError>,
}

impl VecSeriesSet {
    /// Wraps `series` as given. The caller is responsible for label order.
    pub fn new(series: Vec<SeriesRef>) -> Self {
        Self {
            series,
            index: 0,
            current: None,
            trailing_err: None,
        }
    }

    /// Wraps `series` after sorting it by label set.
    pub fn sorted(mut series: Vec<SeriesRef>) -> Self {
        series.sort_by(|a, b| a.labels().cmp(b.labels()));
        Self::new(series)
    }

    /// Makes the set report `err` once all of its series have been consumed.
    pub fn fail_after(mut self, err: QueryError) -> Self {
        self.trailing_err = Some(err);
        self
    }

    fn exhausted(&self) -> bool {
        self.index >= self.series.len() && self.current.is_none()
    }
}

impl SeriesSet for VecSeriesSet {
    fn next(&mut self) -> bool {
        self.current = self.series.get(self.index).cloned();
        if self.current.is_some() {
            self.index += 1;
            return true;
        }
        false
    }

    fn at(&self) -> Option<SeriesRef> {
        self.current.clone()
    }

    fn err(&self) -> Option<QueryError> {
        if self.exhausted() {
            self.trailing_err.clone()
        } else {
            None
        }
    }
}

/// Drains a set into (labels, samples) pairs, failing on the first error reported by the
/// set or by any of its sample iterators.
pub fn collect_series<S: SeriesSet + ?Sized>(
    set: &mut S,
) -> QueryResult<Vec<(Labels, Vec<Sample>)>> {
    let mut result = Vec::new();
    while set.next() {
        let Some(series) = set.at() else {
            continue;
        };
        let mut iter = series.iterator();
        let samples = collect_samples(&mut iter)?;
        result.push((series.labels().clone(), samples));
    }
    match set.err() {
        Some(err) => Err(err),
        None => Ok(result),
    }
}
