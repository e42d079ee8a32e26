use super::{BoxedSeriesSet, NoopSeriesSet, Series, SeriesRef, SeriesSet};
use crate::error::QueryError;
use crate::iterators::{BoxedSeriesIterator, MergeSeriesIterator};
use crate::labels::Labels;
use min_max_heap::MinMaxHeap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::sync::Arc;

/// Heap entry for one input set, keyed by the labels of the series under its cursor.
struct SetCursor {
    series: SeriesRef,
    index: usize,
}

impl SetCursor {
    fn labels(&self) -> &Labels {
        self.series.labels()
    }
}

impl PartialEq for SetCursor {
    fn eq(&self, other: &Self) -> bool {
        self.labels() == other.labels()
    }
}

impl Eq for SetCursor {}

impl PartialOrd for SetCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SetCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels().cmp(other.labels())
    }
}

/// K-way merge of label-sorted series sets. Series with identical label sets in
/// different inputs are combined into a single series whose samples are merged with
/// [`MergeSeriesIterator`].
pub struct MergeSeriesSet {
    sets: Vec<BoxedSeriesSet>,
    heap: MinMaxHeap<SetCursor>,
    /// inputs contributing to the current series, in input order
    group: SmallVec<SetCursor, 4>,
    current: Option<SeriesRef>,
}

impl MergeSeriesSet {
    /// Merges `sets`. No merge machinery is added for a single input, and an empty list
    /// yields an empty set.
    pub fn create(mut sets: Vec<BoxedSeriesSet>) -> BoxedSeriesSet {
        match sets.len() {
            0 => Box::new(NoopSeriesSet),
            1 => sets.remove(0),
            _ => Box::new(Self::new(sets)),
        }
    }

    pub fn new(mut sets: Vec<BoxedSeriesSet>) -> Self {
        // pre-advance every input so its current labels can be compared
        let mut heap = MinMaxHeap::with_capacity(sets.len());
        for (index, set) in sets.iter_mut().enumerate() {
            if set.next() {
                if let Some(series) = set.at() {
                    heap.push(SetCursor { series, index });
                }
            }
        }
        Self {
            sets,
            heap,
            group: SmallVec::new(),
            current: None,
        }
    }

    fn requeue_group(&mut self) {
        let group = std::mem::take(&mut self.group);
        for cursor in group {
            let set = &mut self.sets[cursor.index];
            if set.next() {
                if let Some(series) = set.at() {
                    self.heap.push(SetCursor {
                        series,
                        index: cursor.index,
                    });
                }
            }
        }
    }

    fn build_current(&self) -> Option<SeriesRef> {
        match self.group.len() {
            0 => None,
            1 => Some(self.group[0].series.clone()),
            _ => {
                let labels = self.group[0].labels().clone();
                let series = self.group.iter().map(|c| c.series.clone()).collect();
                Some(Arc::new(MergedSeries { labels, series }))
            }
        }
    }
}

impl SeriesSet for MergeSeriesSet {
    fn next(&mut self) -> bool {
        self.requeue_group();

        let Some(first) = self.heap.pop_min() else {
            self.current = None;
            return false;
        };
        self.group.push(first);

        while let Some(front) = self.heap.peek_min() {
            if front.labels() != self.group[0].labels() {
                break;
            }
            if let Some(cursor) = self.heap.pop_min() {
                self.group.push(cursor);
            }
        }
        self.group.sort_by_key(|c| c.index);

        self.current = self.build_current();
        true
    }

    fn at(&self) -> Option<SeriesRef> {
        self.current.clone()
    }

    fn err(&self) -> Option<QueryError> {
        self.sets.iter().find_map(|set| set.err())
    }
}

/// A series reported by more than one backend.
pub struct MergedSeries {
    labels: Labels,
    series: Vec<SeriesRef>,
}

impl Series for MergedSeries {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn iterator(&self) -> BoxedSeriesIterator {
        let iterators = self.series.iter().map(|s| s.iterator()).collect();
        Box::new(MergeSeriesIterator::new(iterators))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Sample;
    use crate::series::{collect_series, ConcreteSeries, ErrSeriesSet, VecSeriesSet};

    fn series(pairs: &[(&str, &str)], samples: &[(i64, f64)]) -> SeriesRef {
        let samples = samples.iter().map(|&s| Sample::from(s)).collect();
        Arc::new(ConcreteSeries::new(Labels::from_pairs(pairs), samples))
    }

    fn set(series: Vec<SeriesRef>) -> BoxedSeriesSet {
        Box::new(VecSeriesSet::sorted(series))
    }

    fn job(name: &str) -> SeriesRef {
        series(&[("job", name)], &[(1, 1.0)])
    }

    #[test]
    fn test_disjoint_sets_pass_through() {
        let a = job("a");
        let c = job("c");
        let b = job("b");
        let mut merged =
            MergeSeriesSet::new(vec![set(vec![a.clone(), c.clone()]), set(vec![b.clone()])]);

        let mut seen = Vec::new();
        while merged.next() {
            let current = merged.at().unwrap();
            seen.push(current.labels().get("job").unwrap().to_string());
            // unique series are handed out unchanged
            assert!([&a, &b, &c].iter().any(|s| Arc::ptr_eq(*s, &current)));
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert!(merged.err().is_none());
    }

    #[test]
    fn test_identical_labels_are_combined() {
        let left = series(&[("job", "api")], &[(1, 10.0), (2, 20.0)]);
        let right = series(&[("job", "api")], &[(1, 10.0), (3, 30.0)]);
        let other = series(&[("job", "web")], &[(5, 5.0)]);

        let mut merged = MergeSeriesSet::new(vec![set(vec![left]), set(vec![right, other])]);
        let result = collect_series(&mut merged).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].0, Labels::from_pairs(&[("job", "api")]));
        let timestamps: Vec<i64> = result[0].1.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2, 3]);
        assert_eq!(result[1].0, Labels::from_pairs(&[("job", "web")]));
        assert_eq!(result[1].1.len(), 1);
    }

    #[test]
    fn test_output_is_sorted() {
        let inputs = vec![
            set(vec![job("d"), job("a"), job("k")]),
            set(vec![job("b"), job("k"), job("z")]),
            set(vec![job("a"), job("c")]),
            set(vec![]),
        ];
        let mut merged = MergeSeriesSet::new(inputs);
        let result = collect_series(&mut merged).unwrap();
        let names: Vec<&str> = result.iter().map(|(l, _)| l.get("job").unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "k", "z"]);
    }

    #[test]
    fn test_error_reported_from_drained_input() {
        let failing: BoxedSeriesSet = Box::new(
            VecSeriesSet::sorted(vec![job("a")]).fail_after(QueryError::General("boom".into())),
        );
        let mut merged = MergeSeriesSet::new(vec![failing, set(vec![job("b"), job("c")])]);

        assert!(merged.next());
        assert!(merged.err().is_none());
        assert!(merged.next());
        // first input is drained by now and reports its error
        assert_eq!(merged.err(), Some(QueryError::General("boom".into())));
        assert!(merged.next());
        assert!(!merged.next());
    }

    #[test]
    fn test_error_from_empty_input() {
        let failing: BoxedSeriesSet = Box::new(ErrSeriesSet::new(QueryError::Canceled));
        let mut merged = MergeSeriesSet::new(vec![failing, set(vec![job("a")])]);
        assert!(collect_series(&mut merged).is_err());
    }

    #[test]
    fn test_create_degenerate_cases() {
        let mut empty = MergeSeriesSet::create(vec![]);
        assert!(!empty.next());

        let only = job("a");
        let mut single = MergeSeriesSet::create(vec![set(vec![only.clone()])]);
        assert!(single.next());
        assert!(Arc::ptr_eq(&single.at().unwrap(), &only));
        assert!(!single.next());
    }
}
