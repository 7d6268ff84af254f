//! Single-retry wrapper for transient store failures.
//!
//! A pooling proxy in front of Postgres can hand a session a backend whose
//! prepared statements disagree with the driver's cache. Those failures clear
//! once the pool is cycled, so each store call gets exactly one more attempt:
//!
//! ```text
//! call ──► Ok ─────────────────────────────────────────► return
//!   │
//!   └──► Err(transient) ─► disconnect ─► sleep ─► connect ─► call again ─► return
//!   │
//!   └──► Err(other) ─────────────────────────────────────► return unchanged
//! ```

use crate::error::InstrumentResult;
use crate::store::{InstrumentStore, Reconnect};
use crate::types::{Instrument, InstrumentId, ListOrder};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{error, warn};

/// Default pause between releasing the pool and reconnecting.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// How long to wait before the second attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::with_delay(Duration::from_millis(ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// `InstrumentStore` decorator that retries each operation once after a
/// transient failure, cycling the inner store's connections in between.
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingStore<S>
where
    S: InstrumentStore + Reconnect + 'static,
{
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn attempt<T, F>(&self, operation: &'static str, call: F) -> InstrumentResult<T>
    where
        T: Send,
        F: for<'a> Fn(&'a S) -> BoxFuture<'a, InstrumentResult<T>> + Send + Sync,
    {
        let err = match call(&self.inner).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => err,
            Err(err) => {
                metrics::counter!("instrument_store_errors_total", "operation" => operation)
                    .increment(1);
                return Err(err);
            }
        };

        warn!(
            operation,
            code = err.code().unwrap_or_default(),
            delay_ms = self.policy.delay.as_millis() as u64,
            "Transient store error, reconnecting before retry: {}",
            err
        );
        metrics::counter!("instrument_store_retries_total", "operation" => operation).increment(1);

        self.inner.disconnect().await;
        tokio::time::sleep(self.policy.delay).await;
        self.inner.connect().await?;

        match call(&self.inner).await {
            Ok(value) => Ok(value),
            Err(err) => {
                error!(
                    operation,
                    code = err.code().unwrap_or_default(),
                    "Store operation failed after retry: {}",
                    err
                );
                metrics::counter!("instrument_store_errors_total", "operation" => operation)
                    .increment(1);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<S> InstrumentStore for RetryingStore<S>
where
    S: InstrumentStore + Reconnect + 'static,
{
    async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>> {
        self.attempt("list", move |store| store.list(order)).await
    }

    async fn create(&self, name: String) -> InstrumentResult<Instrument> {
        self.attempt("create", move |store| store.create(name.clone()))
            .await
    }

    async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument> {
        self.attempt("update", move |store| store.update(id, name.clone()))
            .await
    }

    async fn delete(&self, id: InstrumentId) -> InstrumentResult<()> {
        self.attempt("delete", move |store| store.delete(id)).await
    }

    async fn ping(&self) -> InstrumentResult<()> {
        self.inner.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstrumentError;
    use crate::store::InMemoryInstrumentStore;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Store double that fails with queued errors before delegating.
    #[derive(Default)]
    struct FlakyStore {
        backing: InMemoryInstrumentStore,
        failures: Mutex<VecDeque<InstrumentError>>,
        calls: AtomicUsize,
        disconnects: AtomicUsize,
        connects: AtomicUsize,
        refuse_connect: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FlakyStore {
        fn failing_with(errors: Vec<InstrumentError>) -> Self {
            Self {
                failures: Mutex::new(errors.into()),
                ..Default::default()
            }
        }

        fn next_failure(&self) -> Option<InstrumentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().push("call");
            self.failures.lock().pop_front()
        }
    }

    #[async_trait]
    impl InstrumentStore for FlakyStore {
        async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>> {
            match self.next_failure() {
                Some(err) => Err(err),
                None => self.backing.list(order).await,
            }
        }

        async fn create(&self, name: String) -> InstrumentResult<Instrument> {
            match self.next_failure() {
                Some(err) => Err(err),
                None => self.backing.create(name).await,
            }
        }

        async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument> {
            match self.next_failure() {
                Some(err) => Err(err),
                None => self.backing.update(id, name).await,
            }
        }

        async fn delete(&self, id: InstrumentId) -> InstrumentResult<()> {
            match self.next_failure() {
                Some(err) => Err(err),
                None => self.backing.delete(id).await,
            }
        }
    }

    #[async_trait]
    impl Reconnect for FlakyStore {
        async fn disconnect(&self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            self.log.lock().push("disconnect");
        }

        async fn connect(&self) -> InstrumentResult<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.log.lock().push("connect");
            if self.refuse_connect {
                return Err(InstrumentError::store("connection refused"));
            }
            Ok(())
        }
    }

    fn transient() -> InstrumentError {
        InstrumentError::store_with_code("prepared statement \"s1\" already exists", "42P05")
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let store = RetryingStore::new(FlakyStore::default(), RetryPolicy::default());

        let created = store.create("Grand Piano".to_string()).await.unwrap();

        assert_eq!(created.name, "Grand Piano");
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner().disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_retries_once_after_delay() {
        let store = RetryingStore::new(
            FlakyStore::failing_with(vec![transient()]),
            RetryPolicy::default(),
        );

        let started = tokio::time::Instant::now();
        let created = store.create("Cello".to_string()).await.unwrap();

        assert_eq!(created.name, "Cello");
        assert!(started.elapsed() >= DEFAULT_RETRY_DELAY);
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *store.inner().log.lock(),
            vec!["call", "disconnect", "connect", "call"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_failure_is_returned() {
        let second =
            InstrumentError::store_with_code("prepared statement \"s2\" does not exist", "26000");
        let store = RetryingStore::new(
            FlakyStore::failing_with(vec![transient(), second.clone(), transient()]),
            RetryPolicy::from_millis(10),
        );

        let result = store.list(ListOrder::Id).await;

        assert_eq!(result, Err(second));
        // Exactly one retry, never a third call.
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.inner().disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let unique = InstrumentError::store_with_code("duplicate key value", "23505");
        let store = RetryingStore::new(
            FlakyStore::failing_with(vec![unique.clone()]),
            RetryPolicy::default(),
        );

        let result = store.create("Harp".to_string()).await;

        assert_eq!(result, Err(unique));
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner().connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_passes_through() {
        let store = RetryingStore::new(FlakyStore::default(), RetryPolicy::default());
        let missing = InstrumentId::new(404);

        assert_eq!(
            store.delete(missing).await,
            Err(InstrumentError::NotFound(missing))
        );
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reconnect_is_surfaced() {
        let flaky = FlakyStore {
            refuse_connect: true,
            ..FlakyStore::failing_with(vec![transient()])
        };
        let store = RetryingStore::new(flaky, RetryPolicy::from_millis(5));

        let result = store.update(InstrumentId::new(1), "Lute".to_string()).await;

        assert!(matches!(result, Err(InstrumentError::Store { .. })));
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_applies_to_every_operation() {
        let store = RetryingStore::new(FlakyStore::default(), RetryPolicy::from_millis(1));
        let piano = store.create("Grand Piano".to_string()).await.unwrap();

        store.inner().failures.lock().push_back(transient());
        let renamed = store
            .update(piano.id, "Upright Piano".to_string())
            .await
            .unwrap();
        assert_eq!(renamed.name, "Upright Piano");

        store.inner().failures.lock().push_back(transient());
        store.delete(piano.id).await.unwrap();

        store.inner().failures.lock().push_back(transient());
        assert!(store.list(ListOrder::Id).await.unwrap().is_empty());

        assert_eq!(store.inner().disconnects.load(Ordering::SeqCst), 3);
    }
}
