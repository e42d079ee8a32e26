use super::{Querier, QuerierRef, QueryContext, Queryable, SelectHints};
use crate::common::{Sample, Timestamp};
use crate::error::{QueryError, QueryResult};
use crate::labels::{Label, Labels, Matcher};
use crate::series::{BoxedSeriesSet, ConcreteSeries, SeriesRef, VecSeriesSet};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A read request as sent to a remote backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadQuery {
    pub start_ms: Timestamp,
    pub end_ms: Timestamp,
    pub matchers: Vec<Matcher>,
    pub hints: Option<SelectHints>,
}

impl ReadQuery {
    pub fn new(
        mint: Timestamp,
        maxt: Timestamp,
        matchers: &[Matcher],
        hints: Option<&SelectHints>,
    ) -> Self {
        Self {
            start_ms: mint,
            end_ms: maxt,
            matchers: matchers.to_vec(),
            hints: hints.cloned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesData {
    pub labels: Vec<Label>,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadResponse {
    pub timeseries: Vec<TimeSeriesData>,
}

/// Transport to a single remote backend.
#[async_trait]
pub trait ReadClient: Send + Sync {
    fn name(&self) -> &str;

    async fn read(&self, ctx: &QueryContext, query: ReadQuery) -> QueryResult<ReadResponse>;
}

/// Converts a remote response into a series set. Remotes are not trusted to return
/// sorted data, so labels, series and samples are all put in order here.
pub fn series_set_from_response(response: ReadResponse) -> BoxedSeriesSet {
    let series: Vec<SeriesRef> = response
        .timeseries
        .into_iter()
        .map(|ts| Arc::new(ConcreteSeries::new(Labels::new(ts.labels), ts.samples)) as SeriesRef)
        .collect();
    Box::new(VecSeriesSet::sorted(series))
}

/// Exposes a [`ReadClient`] as a [`Queryable`].
pub struct ClientQueryable {
    client: Arc<dyn ReadClient>,
    timeout: Option<Duration>,
}

impl ClientQueryable {
    pub fn new(client: Arc<dyn ReadClient>) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Bounds every read issued through this backend by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        self.client.name()
    }
}

#[async_trait]
impl Queryable for ClientQueryable {
    async fn querier(
        &self,
        ctx: &QueryContext,
        mint: Timestamp,
        maxt: Timestamp,
    ) -> QueryResult<QuerierRef> {
        Ok(Arc::new(ClientQuerier {
            ctx: ctx.clone(),
            timeout: self.timeout,
            client: self.client.clone(),
            mint,
            maxt,
        }))
    }
}

pub struct ClientQuerier {
    ctx: QueryContext,
    timeout: Option<Duration>,
    client: Arc<dyn ReadClient>,
    mint: Timestamp,
    maxt: Timestamp,
}

#[async_trait]
impl Querier for ClientQuerier {
    async fn select(
        &self,
        hints: &SelectHints,
        matchers: &[Matcher],
    ) -> QueryResult<BoxedSeriesSet> {
        let query = ReadQuery::new(self.mint, self.maxt, matchers, Some(hints));
        let ctx = self.ctx.child(self.timeout);
        let response = ctx
            .run(self.client.read(&ctx, query))
            .await
            .map_err(|err| match err {
                QueryError::BackendUnavailable { .. } => err,
                // a per-backend timeout only takes this backend out of the result
                QueryError::DeadlineExceeded if self.ctx.err().is_none() => {
                    QueryError::backend(self.client.name(), err)
                }
                err if err.is_context_error() => err,
                err => QueryError::backend(self.client.name(), err),
            })?;
        Ok(series_set_from_response(response))
    }

    /// Remote read has no label values endpoint.
    async fn label_values(&self, _: &str) -> QueryResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn close(&self) -> QueryResult<()> {
        Ok(())
    }
}
