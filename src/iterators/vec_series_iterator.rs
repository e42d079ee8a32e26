use super::SeriesIterator;
use crate::common::{Sample, Timestamp};
use crate::error::QueryError;
use std::sync::Arc;

/// Iterates over an in-memory, timestamp-sorted sample buffer. The buffer is shared, so
/// several iterators may be created over the same series.
pub struct VecSeriesIterator {
    samples: Arc<[Sample]>,
    current: Option<usize>,
    next_index: usize,
}

impl VecSeriesIterator {
    pub fn new(samples: Arc<[Sample]>) -> Self {
        Self {
            samples,
            current: None,
            next_index: 0,
        }
    }
}

impl From<Vec<Sample>> for VecSeriesIterator {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples.into())
    }
}

impl SeriesIterator for VecSeriesIterator {
    fn next(&mut self) -> bool {
        if self.next_index < self.samples.len() {
            self.current = Some(self.next_index);
            self.next_index += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    fn seek(&mut self, t: Timestamp) -> bool {
        if let Some(idx) = self.current {
            if self.samples[idx].timestamp >= t {
                return true;
            }
        }
        let remaining = &self.samples[self.next_index..];
        let idx = self.next_index + remaining.partition_point(|s| s.timestamp < t);
        if idx < self.samples.len() {
            self.current = Some(idx);
            self.next_index = idx + 1;
            true
        } else {
            self.current = None;
            self.next_index = self.samples.len();
            false
        }
    }

    fn at(&self) -> Option<Sample> {
        self.current.map(|idx| self.samples[idx])
    }

    fn err(&self) -> Option<QueryError> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterators::collect_samples;

    fn samples(ts: &[i64]) -> Vec<Sample> {
        ts.iter()
            .map(|&t| Sample::new(t, t as f64 * 10.0))
            .collect()
    }

    #[test]
    fn test_next() {
        let mut iter = VecSeriesIterator::from(samples(&[1, 2, 3]));
        assert_eq!(iter.at(), None);
        let result = collect_samples(&mut iter).unwrap();
        assert_eq!(result, samples(&[1, 2, 3]));
        assert_eq!(iter.at(), None);
        assert!(!iter.next());
    }

    #[test]
    fn test_seek() {
        let mut iter = VecSeriesIterator::from(samples(&[10, 20, 30, 40]));
        assert!(iter.seek(15));
        assert_eq!(iter.at().map(|s| s.timestamp), Some(20));

        // seeking backwards does not move the cursor
        assert!(iter.seek(5));
        assert_eq!(iter.at().map(|s| s.timestamp), Some(20));

        assert!(iter.next());
        assert_eq!(iter.at().map(|s| s.timestamp), Some(30));

        assert!(iter.seek(40));
        assert_eq!(iter.at().map(|s| s.timestamp), Some(40));
        assert!(!iter.seek(41));
        assert_eq!(iter.at(), None);
    }

    #[test]
    fn test_empty() {
        let mut iter = VecSeriesIterator::from(vec![]);
        assert!(!iter.next());
        assert!(!iter.seek(0));
    }
}
