use super::label_values::merge_string_slices;
use super::{NoopQuerier, Querier, QuerierRef, QueryContext, SelectHints};
use crate::error::{QueryError, QueryResult};
use crate::labels::Matcher;
use crate::series::{BoxedSeriesSet, MergeSeriesSet};
use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Presents several queriers as one. Selects are sent to every querier concurrently and
/// the results are merged into a single label-sorted series set.
pub struct MergeQuerier {
    ctx: QueryContext,
    queriers: Vec<QuerierRef>,
}

impl MergeQuerier {
    /// Combines `queriers`, dropping any [`NoopQuerier`]. If nothing is left the result
    /// is a `NoopQuerier`, and a single remaining querier is returned as is.
    pub fn create(ctx: QueryContext, queriers: Vec<QuerierRef>) -> QuerierRef {
        let mut queriers: Vec<QuerierRef> = queriers.into_iter().filter(|q| !q.is_noop()).collect();
        match queriers.len() {
            0 => NoopQuerier::shared(),
            1 => queriers.remove(0),
            _ => Arc::new(MergeQuerier { ctx, queriers }),
        }
    }
}

#[async_trait]
impl Querier for MergeQuerier {
    async fn select(
        &self,
        hints: &SelectHints,
        matchers: &[Matcher],
    ) -> QueryResult<BoxedSeriesSet> {
        if let Some(err) = self.ctx.err() {
            return Err(err);
        }

        let count = self.queriers.len();
        let hints = Arc::new(hints.clone());
        let matchers: Arc<[Matcher]> = matchers.into();

        // dropping the set aborts whatever is still running
        let mut tasks = JoinSet::new();
        for (index, querier) in self.queriers.iter().enumerate() {
            let querier = querier.clone();
            let hints = hints.clone();
            let matchers = matchers.clone();
            tasks.spawn(async move { (index, querier.select(&hints, &matchers).await) });
        }

        // one slot per backend, written only by the collecting loop
        let mut slots: Vec<Option<QueryResult<BoxedSeriesSet>>> =
            (0..count).map(|_| None).collect();
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, res))) => slots[index] = Some(res),
                    Some(Err(err)) => log::warn!("select task did not complete: {err}"),
                    None => break,
                },
                err = self.ctx.done() => return Err(err),
            }
        }

        let mut sets = Vec::with_capacity(count);
        let mut errors = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            let res = slot.unwrap_or_else(|| {
                Err(QueryError::backend(
                    index.to_string(),
                    "select task did not complete",
                ))
            });
            match res {
                Ok(set) => sets.push(set),
                Err(err) => {
                    log::warn!("select failed on backend {index}: {err}");
                    errors.push(err);
                }
            }
        }

        if sets.is_empty() {
            let failed = errors.len();
            if let Some(first) = errors.into_iter().next() {
                log::error!("select failed on all {failed} backends");
                return Err(QueryError::AllBackendsFailed {
                    failed,
                    first: Box::new(first),
                });
            }
        }

        Ok(MergeSeriesSet::create(sets))
    }

    async fn label_values(&self, name: &str) -> QueryResult<Vec<String>> {
        let calls = self.queriers.iter().map(|q| q.label_values(name));
        let lists = self.ctx.run(try_join_all(calls)).await?;
        Ok(merge_string_slices(lists))
    }

    async fn close(&self) -> QueryResult<()> {
        let results = join_all(self.queriers.iter().map(|q| q.close())).await;
        let mut last_err = None;
        for (index, res) in results.into_iter().enumerate() {
            if let Err(err) = res {
                log::warn!("failed to close querier for backend {index}: {err}");
                last_err = Some(err);
            }
        }
        match last_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
