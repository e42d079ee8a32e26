use super::{BoxedSeriesIterator, SeriesIterator};
use crate::common::{Sample, Timestamp};
use crate::error::QueryError;
use min_max_heap::MinMaxHeap;

/// Heap entry pointing at one of the merged iterators. The heap never owns the
/// iterators themselves, only their position in `MergeSeriesIterator::iterators`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cursor {
    timestamp: Timestamp,
    index: usize,
}

/// Merges the sample iterators of series that share a label set (the same series
/// reported by several backends) into one ascending stream with no repeated timestamps.
///
/// When more than one input holds a sample at the same timestamp, the value of the
/// input that appears first in the list is returned and the others are skipped.
pub struct MergeSeriesIterator {
    iterators: Vec<BoxedSeriesIterator>,
    heap: MinMaxHeap<Cursor>,
    initialized: bool,
}

impl MergeSeriesIterator {
    pub fn new(iterators: Vec<BoxedSeriesIterator>) -> Self {
        let len = iterators.len();
        Self {
            iterators,
            heap: MinMaxHeap::with_capacity(len),
            initialized: false,
        }
    }

    fn push_current(&mut self, index: usize) {
        if let Some(sample) = self.iterators[index].at() {
            self.heap.push(Cursor {
                timestamp: sample.timestamp,
                index,
            });
        }
    }

    fn init(&mut self) {
        self.initialized = true;
        for index in 0..self.iterators.len() {
            if self.iterators[index].next() {
                self.push_current(index);
            }
        }
    }
}

impl SeriesIterator for MergeSeriesIterator {
    fn next(&mut self) -> bool {
        if !self.initialized {
            self.init();
            return !self.heap.is_empty();
        }

        let Some(current) = self.heap.peek_min().map(|c| c.timestamp) else {
            return false;
        };

        // advance every input sitting on the timestamp we just exposed
        while let Some(front) = self.heap.peek_min() {
            if front.timestamp != current {
                break;
            }
            let Some(cursor) = self.heap.pop_min() else {
                break;
            };
            if self.iterators[cursor.index].next() {
                self.push_current(cursor.index);
            }
        }

        !self.heap.is_empty()
    }

    fn seek(&mut self, t: Timestamp) -> bool {
        self.initialized = true;
        self.heap.clear();
        for index in 0..self.iterators.len() {
            if self.iterators[index].seek(t) {
                self.push_current(index);
            }
        }
        !self.heap.is_empty()
    }

    fn at(&self) -> Option<Sample> {
        let front = self.heap.peek_min()?;
        self.iterators[front.index].at()
    }

    fn err(&self) -> Option<QueryError> {
        self.iterators.iter().find_map(|iter| iter.err())
    }
}
