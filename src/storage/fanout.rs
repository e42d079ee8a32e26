use super::{
    ClientQueryable, MergeQuerier, QuerierRef, QueryContext, Queryable, QueryableRef, ReadClient,
    RequiredMatchersFilter, SelectHints,
};
use crate::common::{Sample, Timestamp};
use crate::config::{FederationConfig, RemoteReadConfig};
use crate::error::QueryResult;
use crate::labels::{Labels, Matcher};
use crate::series::collect_series;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Owns the backends of a federated read path. Queriers it produces fan out to every
/// backend and merge the results.
pub struct FanoutStorage {
    queryables: Vec<QueryableRef>,
    query_timeout: Option<Duration>,
}

impl FanoutStorage {
    pub fn new(queryables: Vec<QueryableRef>) -> Self {
        Self {
            queryables,
            query_timeout: None,
        }
    }

    /// Builds the backends described by `config`, using `factory` to create the client
    /// for each one.
    pub fn from_config<F>(config: &FederationConfig, factory: F) -> QueryResult<Self>
    where
        F: Fn(&RemoteReadConfig) -> QueryResult<Arc<dyn ReadClient>>,
    {
        Ok(Self {
            queryables: build_queryables(config, factory)?,
            query_timeout: config.query_timeout(),
        })
    }

    /// Replaces the backends with those from `config`. On error the current backends are
    /// kept.
    pub fn apply_config<F>(&mut self, config: &FederationConfig, factory: F) -> QueryResult<()>
    where
        F: Fn(&RemoteReadConfig) -> QueryResult<Arc<dyn ReadClient>>,
    {
        self.queryables = build_queryables(config, factory)?;
        self.query_timeout = config.query_timeout();
        Ok(())
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn len(&self) -> usize {
        self.queryables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queryables.is_empty()
    }

    /// Runs a single select over `[mint, maxt]` and collects every matching series. The
    /// querier is closed whatever the outcome.
    pub async fn select_all(
        &self,
        ctx: &QueryContext,
        mint: Timestamp,
        maxt: Timestamp,
        hints: &SelectHints,
        matchers: &[Matcher],
    ) -> QueryResult<Vec<(Labels, Vec<Sample>)>> {
        let ctx = ctx.child(self.query_timeout);
        let querier = self.querier(&ctx, mint, maxt).await?;

        let result = async {
            let mut set = querier.select(hints, matchers).await?;
            collect_series(set.as_mut())
        }
        .await;

        if let Err(err) = querier.close().await {
            log::warn!("error closing querier: {err}");
        }
        result
    }
}

fn build_queryables<F>(config: &FederationConfig, factory: F) -> QueryResult<Vec<QueryableRef>>
where
    F: Fn(&RemoteReadConfig) -> QueryResult<Arc<dyn ReadClient>>,
{
    config.validate()?;
    config
        .backends
        .iter()
        .map(|backend| {
            let client = factory(backend)?;
            let queryable: QueryableRef =
                Arc::new(ClientQueryable::new(client).with_timeout(backend.remote_timeout()));
            if backend.required_matchers.is_empty() {
                return Ok(queryable);
            }
            let filter =
                RequiredMatchersFilter::new(queryable, backend.required_equality_matchers());
            Ok(Arc::new(filter) as QueryableRef)
        })
        .collect()
}

#[async_trait]
impl Queryable for FanoutStorage {
    async fn querier(
        &self,
        ctx: &QueryContext,
        mint: Timestamp,
        maxt: Timestamp,
    ) -> QueryResult<QuerierRef> {
        let mut queriers = Vec::with_capacity(self.queryables.len());
        for queryable in &self.queryables {
            match queryable.querier(ctx, mint, maxt).await {
                Ok(querier) => queriers.push(querier),
                Err(err) => {
                    for querier in &queriers {
                        if let Err(close_err) = querier.close().await {
                            log::warn!("error closing querier: {close_err}");
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(MergeQuerier::create(ctx.clone(), queriers))
    }
}
