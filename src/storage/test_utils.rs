use super::{Querier, QuerierRef, Queryable, QueryContext, SelectHints};
use crate::common::{Sample, Timestamp};
use crate::error::{QueryError, QueryResult};
use crate::labels::{Labels, Matcher};
use crate::series::{BoxedSeriesSet, ConcreteSeries, SeriesRef, VecSeriesSet};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory backend for tests. Failures, latency and call counts are configurable.
pub(crate) struct MemoryQuerier {
    pub name: String,
    series: Vec<SeriesRef>,
    select_error: Option<QueryError>,
    label_values_error: Option<QueryError>,
    close_error: Option<QueryError>,
    delay: Option<Duration>,
    selects: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MemoryQuerier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            series: Vec::new(),
            select_error: None,
            label_values_error: None,
            close_error: None,
            delay: None,
            selects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_series(mut self, labels: &[(&str, &str)], samples: &[(Timestamp, f64)]) -> Self {
        let samples = samples.iter().map(|&s| Sample::from(s)).collect();
        self.series
            .push(Arc::new(ConcreteSeries::new(Labels::from_pairs(labels), samples)));
        self
    }

    pub fn failing(mut self, err: QueryError) -> Self {
        self.select_error = Some(err);
        self
    }

    pub fn failing_label_values(mut self, err: QueryError) -> Self {
        self.label_values_error = Some(err);
        self
    }

    pub fn failing_close(mut self, err: QueryError) -> Self {
        self.close_error = Some(err);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shares the close counter with an existing one, so that several queriers can be
    /// tallied together.
    pub fn with_close_counter(mut self, closes: Arc<AtomicUsize>) -> Self {
        self.closes = closes;
        self
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        self.closes.clone()
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Querier for MemoryQuerier {
    async fn select(&self, _: &SelectHints, matchers: &[Matcher]) -> QueryResult<BoxedSeriesSet> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.select_error {
            return Err(err.clone());
        }
        let matched = self
            .series
            .iter()
            .filter(|s| s.labels().matches_all(matchers))
            .cloned()
            .collect();
        Ok(Box::new(VecSeriesSet::sorted(matched)))
    }

    async fn label_values(&self, name: &str) -> QueryResult<Vec<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.label_values_error {
            return Err(err.clone());
        }
        let values: BTreeSet<&str> = self
            .series
            .iter()
            .filter_map(|s| s.labels().get(name))
            .collect();
        Ok(values.into_iter().map(String::from).collect())
    }

    async fn close(&self) -> QueryResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        match &self.close_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Hands out the same [`MemoryQuerier`] for every time range.
pub(crate) struct MemoryQueryable {
    querier: Arc<MemoryQuerier>,
    error: Option<QueryError>,
}

impl MemoryQueryable {
    pub fn new(querier: Arc<MemoryQuerier>) -> Self {
        Self {
            querier,
            error: None,
        }
    }

    pub fn failing(querier: Arc<MemoryQuerier>, err: QueryError) -> Self {
        Self {
            querier,
            error: Some(err),
        }
    }
}

#[async_trait]
impl Queryable for MemoryQueryable {
    async fn querier(
        &self,
        _: &QueryContext,
        _: Timestamp,
        _: Timestamp,
    ) -> QueryResult<QuerierRef> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.querier.clone()),
        }
    }
}
