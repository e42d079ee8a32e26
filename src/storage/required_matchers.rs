use super::{Querier, QuerierRef, QueryContext, Queryable, QueryableRef, SelectHints};
use crate::common::Timestamp;
use crate::error::QueryResult;
use crate::labels::Matcher;
use crate::series::{BoxedSeriesSet, NoopSeriesSet};
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps a [`Queryable`] so that selects only reach it when the request carries every
/// one of a fixed set of equality matchers.
pub struct RequiredMatchersFilter {
    inner: QueryableRef,
    required: Arc<[Matcher]>,
}

impl RequiredMatchersFilter {
    pub fn new(inner: QueryableRef, required: Vec<Matcher>) -> Self {
        Self {
            inner,
            required: required.into(),
        }
    }

    pub fn required_matchers(&self) -> &[Matcher] {
        &self.required
    }
}

#[async_trait]
impl Queryable for RequiredMatchersFilter {
    async fn querier(
        &self,
        ctx: &QueryContext,
        mint: Timestamp,
        maxt: Timestamp,
    ) -> QueryResult<QuerierRef> {
        let inner = self.inner.querier(ctx, mint, maxt).await?;
        Ok(Arc::new(RequiredMatchersQuerier {
            inner,
            required: self.required.clone(),
        }))
    }
}

pub struct RequiredMatchersQuerier {
    inner: QuerierRef,
    required: Arc<[Matcher]>,
}

impl RequiredMatchersQuerier {
    pub fn new(inner: QuerierRef, required: Vec<Matcher>) -> Self {
        Self {
            inner,
            required: required.into(),
        }
    }
}

/// Returns true if every required matcher is met by a distinct equality matcher in
/// `matchers`.
pub(crate) fn satisfies_required(required: &[Matcher], matchers: &[Matcher]) -> bool {
    let mut remaining: Vec<&Matcher> = required.iter().collect();
    for m in matchers {
        if remaining.is_empty() {
            break;
        }
        if let Some(pos) = remaining
            .iter()
            .position(|r| m.is_equality(&r.label, r.value()))
        {
            remaining.swap_remove(pos);
        }
    }
    remaining.is_empty()
}

#[async_trait]
impl Querier for RequiredMatchersQuerier {
    async fn select(
        &self,
        hints: &SelectHints,
        matchers: &[Matcher],
    ) -> QueryResult<BoxedSeriesSet> {
        if !satisfies_required(&self.required, matchers) {
            log::debug!(
                "selector does not include required matchers {:?}, skipping backend",
                self.required
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
            );
            return Ok(Box::new(NoopSeriesSet));
        }
        self.inner.select(hints, matchers).await
    }

    async fn label_values(&self, name: &str) -> QueryResult<Vec<String>> {
        self.inner.label_values(name).await
    }

    async fn close(&self) -> QueryResult<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::MatchOp;
    use crate::series::collect_series;
    use crate::storage::test_utils::MemoryQuerier;
    use std::sync::atomic::Ordering;

    fn backend() -> Arc<MemoryQuerier> {
        Arc::new(
            MemoryQuerier::new("prod")
                .with_series(&[("env", "prod"), ("host", "a")], &[(1, 1.0)])
                .with_series(&[("env", "prod"), ("host", "b")], &[(1, 2.0)]),
        )
    }

    #[tokio::test]
    async fn test_forwards_when_required_present() {
        let inner = backend();
        let querier =
            RequiredMatchersQuerier::new(inner.clone(), vec![Matcher::equals("env", "prod")]);

        let matchers = [Matcher::equals("env", "prod"), Matcher::equals("host", "a")];
        let mut set = querier
            .select(&SelectHints::default(), &matchers)
            .await
            .unwrap();
        let series = collect_series(set.as_mut()).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(inner.select_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_without_calling_inner() {
        let inner = backend();
        let querier =
            RequiredMatchersQuerier::new(inner.clone(), vec![Matcher::equals("env", "prod")]);

        let matchers = [Matcher::equals("host", "a")];
        let mut set = querier
            .select(&SelectHints::default(), &matchers)
            .await
            .unwrap();

        assert!(!set.next());
        assert!(set.err().is_none());
        assert_eq!(inner.select_count(), 0);
    }

    #[test]
    fn test_requirement_consumed_once() {
        let required = [Matcher::equals("env", "prod"), Matcher::equals("env", "prod")];
        assert!(!satisfies_required(&required, &[Matcher::equals("env", "prod")]));
        assert!(satisfies_required(
            &required,
            &[Matcher::equals("env", "prod"), Matcher::equals("env", "prod")]
        ));
    }

    #[test]
    fn test_only_equality_satisfies() {
        let required = [Matcher::equals("env", "prod")];
        let regex = Matcher::create(MatchOp::RegexEqual, "env", "prod").unwrap();
        assert!(!satisfies_required(&required, &[regex]));
        assert!(!satisfies_required(&required, &[Matcher::not_equals("env", "prod")]));
        assert!(!satisfies_required(&required, &[Matcher::equals("env", "dev")]));
        assert!(satisfies_required(&[], &[]));
    }

    #[tokio::test]
    async fn test_passes_through_label_values_and_close() {
        let inner = backend();
        let closes = inner.close_counter();
        let filter = RequiredMatchersFilter::new(
            Arc::new(crate::storage::test_utils::MemoryQueryable::new(inner.clone())),
            vec![Matcher::equals("env", "prod")],
        );
        let querier = filter.querier(&QueryContext::new(), 0, 100).await.unwrap();

        let values = querier.label_values("host").await.unwrap();
        assert_eq!(values, vec!["a".to_string(), "b".to_string()]);

        querier.close().await.unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
