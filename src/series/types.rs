use crate::common::Sample;
use crate::iterators::{BoxedSeriesIterator, EmptySeriesIterator, VecSeriesIterator};
use crate::labels::Labels;
use std::sync::Arc;

/// A labeled stream of samples. The label set never changes; every call to `iterator`
/// returns a fresh, independent cursor.
pub trait Series: Send + Sync {
    fn labels(&self) -> &Labels;

    fn iterator(&self) -> BoxedSeriesIterator;
}

pub type SeriesRef = Arc<dyn Series>;

/// A series backed by an in-memory sample buffer.
#[derive(Debug, Clone)]
pub struct ConcreteSeries {
    labels: Labels,
    samples: Arc<[Sample]>,
}

impl ConcreteSeries {
    /// Creates a series. Samples are sorted by timestamp; for repeated timestamps only the
    /// last sample is kept.
    pub fn new(labels: Labels, mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        let mut deduped: Vec<Sample> = Vec::with_capacity(samples.len());
        for sample in samples {
            match deduped.last_mut() {
                Some(last) if last.timestamp == sample.timestamp => *last = sample,
                _ => deduped.push(sample),
            }
        }
        Self {
            labels,
            samples: deduped.into(),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl Series for ConcreteSeries {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn iterator(&self) -> BoxedSeriesIterator {
        if self.samples.is_empty() {
            return Box::new(EmptySeriesIterator);
        }
        Box::new(VecSeriesIterator::new(self.samples.clone()))
    }
}
