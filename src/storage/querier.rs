use super::QueryContext;
use crate::common::Timestamp;
use crate::error::QueryResult;
use crate::labels::Matcher;
use crate::series::{BoxedSeriesSet, NoopSeriesSet};
use async_trait::async_trait;
use std::sync::Arc;

/// Optional parameters describing how the selected data will be used. Queriers pass
/// them to their backend as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectHints {
    /// Start of the selection in milliseconds
    pub start: Timestamp,
    /// End of the selection in milliseconds
    pub end: Timestamp,
    /// Query step size in milliseconds
    pub step: i64,
    /// Name of the function the series are fed into, if any
    pub func: Option<String>,
    /// Labels used in the grouping clause of an enclosing aggregation
    pub grouping: Vec<String>,
    /// Whether `grouping` is a `by` (true) or `without` (false) clause
    pub by: bool,
    /// Range vector selector window in milliseconds
    pub range: i64,
}

impl SelectHints {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end,
            ..Default::default()
        }
    }
}

/// Read access to a store over a fixed time range. A querier serves a single logical
/// request and must be closed by the caller whether or not its calls succeeded.
#[async_trait]
pub trait Querier: Send + Sync {
    /// Returns the series matching every one of `matchers`, sorted by label set.
    async fn select(
        &self,
        hints: &SelectHints,
        matchers: &[Matcher],
    ) -> QueryResult<BoxedSeriesSet>;

    /// Returns the sorted, de-duplicated values of the label `name`.
    async fn label_values(&self, name: &str) -> QueryResult<Vec<String>>;

    /// Releases any resources held by the querier. Safe to call more than once.
    async fn close(&self) -> QueryResult<()>;

    /// True for queriers that can never return data.
    fn is_noop(&self) -> bool {
        false
    }
}

pub type QuerierRef = Arc<dyn Querier>;

/// Produces queriers over a time range.
#[async_trait]
pub trait Queryable: Send + Sync {
    async fn querier(
        &self,
        ctx: &QueryContext,
        mint: Timestamp,
        maxt: Timestamp,
    ) -> QueryResult<QuerierRef>;
}

pub type QueryableRef = Arc<dyn Queryable>;

/// A querier for a backend with nothing to contribute. Merging drops it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopQuerier;

impl NoopQuerier {
    pub fn shared() -> QuerierRef {
        Arc::new(NoopQuerier)
    }
}

#[async_trait]
impl Querier for NoopQuerier {
    async fn select(&self, _: &SelectHints, _: &[Matcher]) -> QueryResult<BoxedSeriesSet> {
        Ok(Box::new(NoopSeriesSet))
    }

    async fn label_values(&self, _: &str) -> QueryResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn close(&self) -> QueryResult<()> {
        Ok(())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
