//! Draining paginated endpoints.

use tracing::{debug, info, instrument};
use trapi_domain::{FieldSet, PageRequest, ProtocolError, QuerySpec, Video};

use super::{DateWindow, RetryPolicy};
use crate::auth::CredentialSource;
use crate::error::ClientResult;
use crate::executor::{PageExecutor, PagedEndpoint, VideoSearch};
use crate::ports::HttpTransport;

/// Loops pages until each query is exhausted, retrying transient failures.
///
/// Video search is partitioned into one query per day, since the server
/// caps daily volume per query. Records are returned in the order the
/// server sent them, day after day, without any client-side cap.
///
/// A credential is drawn from the [`CredentialSource`] before every page.
/// Pass a [`trapi_domain::Credential`] to use one token throughout, or a
/// renewing source for harvests that outlive a token.
#[derive(Debug, Clone)]
pub struct Harvester<T> {
    executor: PageExecutor<T>,
    retry: RetryPolicy,
}

impl<T: HttpTransport> Harvester<T> {
    /// Creates a harvester.
    pub const fn new(executor: PageExecutor<T>, retry: RetryPolicy) -> Self {
        Self { executor, retry }
    }

    /// The retry policy applied to each page request.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// All videos matching `spec`, one day at a time.
    ///
    /// Any cursor on `spec` is ignored; every day starts from its first page.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not retryable, or the last transient
    /// error once the retry budget is spent. Records gathered before the
    /// failure are discarded. A page that repeats the cursor it was asked
    /// for fails with [`ProtocolError::StalledCursor`].
    #[instrument(skip_all, fields(start = %spec.start_date(), end = %spec.end_date()))]
    pub async fn videos<S: CredentialSource + ?Sized>(
        &self,
        credentials: &S,
        spec: &QuerySpec,
        fields: &FieldSet,
    ) -> ClientResult<Vec<Video>> {
        let mut videos = Vec::new();
        for day in DateWindow::new(spec.start_date(), spec.end_date()) {
            let found = self
                .drain::<VideoSearch, S>(credentials, spec.for_day(day), Some(fields))
                .await?;
            info!(%day, count = found.len(), "day harvested");
            videos.extend(found);
        }
        Ok(videos)
    }

    /// All records of a cursor-paginated endpoint, starting from `request`.
    ///
    /// # Errors
    ///
    /// Same as [`Harvester::videos`].
    #[instrument(skip_all, fields(endpoint = %E::ENDPOINT))]
    pub async fn collect<E: PagedEndpoint, S: CredentialSource + ?Sized>(
        &self,
        credentials: &S,
        request: &E::Request,
        fields: Option<&FieldSet>,
    ) -> ClientResult<Vec<E::Record>> {
        self.drain::<E, S>(credentials, request.clone(), fields).await
    }

    async fn drain<E: PagedEndpoint, S: CredentialSource + ?Sized>(
        &self,
        credentials: &S,
        mut request: E::Request,
        fields: Option<&FieldSet>,
    ) -> ClientResult<Vec<E::Record>> {
        let mut records = Vec::new();
        let mut pages = 0_usize;
        let executor = &self.executor;
        loop {
            let current = &request;
            let page = self
                .retry
                .run(move || async move {
                    let credential = credentials.credential().await?;
                    executor.fetch_page::<E>(&credential, current, fields).await
                })
                .await?;
            pages += 1;

            let next = page.continuation();
            records.extend(page.into_records());
            match next {
                Some((cursor, _)) if request.cursor() == Some(&cursor) => {
                    return Err(ProtocolError::StalledCursor { cursor }.into());
                }
                Some((cursor, search_id)) => request = request.next_page(cursor, search_id),
                None => break,
            }
        }
        debug!(pages, records = records.len(), "query exhausted");
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::executor::UserFollowers;
    use crate::test_support::{ScriptedTransport, credential, ok, videos};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use trapi_domain::{Condition, ConditionField, Credential, Cursor, Endpoint, UserPageRequest};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn credential(&self) -> ClientResult<Credential> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(credential())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn spec(start: u32, end: u32) -> QuerySpec {
        QuerySpec::builder()
            .and(Condition::equals(ConditionField::Username, "someone"))
            .start_date(day(start))
            .end_date(day(end))
            .max_count(100)
            .build()
            .unwrap()
    }

    fn fields() -> FieldSet {
        FieldSet::new(Endpoint::VideoQuery, ["id"]).unwrap()
    }

    fn harvester(transport: &ScriptedTransport) -> Harvester<&ScriptedTransport> {
        Harvester::new(
            PageExecutor::new(transport),
            RetryPolicy::new(3, Duration::ZERO, Duration::ZERO),
        )
    }

    fn more(range: std::ops::Range<i64>, cursor: &str, search_id: &str) -> serde_json::Value {
        ok(json!({ "videos": videos(range), "has_more": true, "cursor": cursor, "search_id": search_id }))
    }

    fn last(range: std::ops::Range<i64>) -> serde_json::Value {
        ok(json!({ "videos": videos(range), "has_more": false }))
    }

    #[tokio::test]
    async fn test_single_day_single_page() {
        let transport = ScriptedTransport::new().reply(200, last(0..3));

        let found = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_single_day_two_pages() {
        let transport = ScriptedTransport::new()
            .reply(200, more(0..100, "c1", "s1"))
            .reply(200, last(100..105));

        let found = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap();

        assert_eq!(found.len(), 105);
        assert_eq!(found[104].id, Some(104));
        assert_eq!(transport.calls(), 2);

        let second = transport.json_body(1);
        assert_eq!(second["start_date"], json!("20240101"));
        assert_eq!(second["end_date"], json!("20240101"));
        assert_eq!(second["cursor"], json!("c1"));
        assert_eq!(second["search_id"], json!("s1"));
    }

    #[tokio::test]
    async fn test_n_pages_means_n_calls() {
        let transport = ScriptedTransport::new()
            .reply(200, more(0..1, "c1", "s1"))
            .reply(200, more(1..2, "c2", "s1"))
            .reply(200, more(2..3, "c3", "s1"))
            .reply(200, last(3..4));

        let found = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap();

        assert_eq!(found.len(), 4);
        assert_eq!(transport.calls(), 4);
        assert_eq!(transport.json_body(3)["cursor"], json!("c3"));
    }

    #[tokio::test]
    async fn test_missing_cursor_stops_without_retry() {
        let transport = ScriptedTransport::new()
            .reply(
                200,
                ok(json!({ "videos": videos(0..5), "has_more": true, "search_id": "s1" })),
            )
            .reply(200, last(0..1));

        let err = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClientError::Protocol(ProtocolError::MissingContinuation { token: "cursor" })
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_range_is_partitioned_by_day() {
        let transport = ScriptedTransport::new()
            .reply(200, last(0..2))
            .reply(200, last(2..3))
            .reply(200, last(3..6));

        let found = harvester(&transport)
            .videos(&credential(), &spec(1, 3), &fields())
            .await
            .unwrap();

        assert_eq!(
            found.iter().map(|v| v.id.unwrap()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5]
        );
        for (index, expected) in ["20240101", "20240102", "20240103"].iter().enumerate() {
            let body = transport.json_body(index);
            assert_eq!(body["start_date"], json!(expected));
            assert_eq!(body["end_date"], json!(expected));
            assert!(body.get("cursor").is_none());
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let transport = ScriptedTransport::new()
            .reply(503, json!({ "error": { "code": "internal_error" } }))
            .reply(429, json!({ "error": { "code": "rate_limit_exceeded" } }))
            .reply(200, last(0..2));

        let found = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let transport = ScriptedTransport::new()
            .reply(500, json!({}))
            .reply(500, json!({}))
            .reply(500, json!({}))
            .reply(200, last(0..1));

        let err = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_request_error_not_retried() {
        let transport = ScriptedTransport::new()
            .reply(400, json!({ "error": { "code": "invalid_params" } }))
            .reply(200, last(0..1));

        let err = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Request(_)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_collect_cursor_endpoint() {
        let transport = ScriptedTransport::new()
            .reply(
                200,
                ok(json!({ "user_followers": [{ "username": "a" }], "has_more": true, "cursor": 1 })),
            )
            .reply(
                200,
                ok(json!({ "user_followers": [{ "username": "b" }], "has_more": false })),
            );

        let followers = harvester(&transport)
            .collect::<UserFollowers, _>(
                &credential(),
                &UserPageRequest::new("someone").with_max_count(1),
                None,
            )
            .await
            .unwrap();

        assert_eq!(followers.len(), 2);
        assert_eq!(
            transport.json_body(1),
            json!({ "username": "someone", "max_count": 1, "cursor": 1 })
        );
    }

    #[tokio::test]
    async fn test_credential_drawn_for_every_page() {
        let transport = ScriptedTransport::new()
            .reply(200, more(0..1, "c1", "s1"))
            .reply(503, json!({}))
            .reply(200, last(1..2))
            .reply(200, last(2..3));
        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };

        let found = harvester(&transport)
            .videos(&source, &spec(1, 2), &fields())
            .await
            .unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(transport.calls(), 4);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_repeated_cursor_is_rejected() {
        let transport = ScriptedTransport::new()
            .reply(200, more(0..1, "c1", "s1"))
            .reply(200, more(1..2, "c1", "s1"))
            .reply(200, last(2..3));

        let err = harvester(&transport)
            .videos(&credential(), &spec(1, 1), &fields())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClientError::Protocol(ProtocolError::StalledCursor {
                cursor: Cursor::from("c1")
            })
        );
        assert_eq!(transport.calls(), 2);
    }
}
