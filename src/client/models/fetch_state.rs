use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::warn;
use tokio::sync::watch;

use crate::common::error::GENERIC_FAILURE_MESSAGE;

/// Observable `{data, loading, error}` triple for one async operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Last successful result.
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

struct Inner<T> {
    state: watch::Sender<FetchState<T>>,
    latest: AtomicU64,
}

impl<T> Inner<T> {
    fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

/// Releases `loading` when an `execute` call ends, including when its
/// future is dropped half-way. Only the latest call may touch the state.
struct CallGuard<'a, T> {
    inner: &'a Inner<T>,
    token: u64,
    armed: bool,
}

impl<T> CallGuard<'_, T> {
    fn finish(mut self, apply: impl FnOnce(&mut FetchState<T>)) {
        self.armed = false;
        if self.inner.is_latest(self.token) {
            self.inner.state.send_modify(|s| {
                apply(s);
                s.loading = false;
            });
        }
    }
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed && self.inner.is_latest(self.token) {
            self.inner.state.send_modify(|s| s.loading = false);
        }
    }
}

/// Wraps an async function and tracks its state.
///
/// Overlapping calls are sequenced: each `execute` takes a new token and
/// a completion whose token is no longer the latest is discarded, so the
/// most recent call always decides `data`/`error`/`loading`.
pub struct FetchData<T, F> {
    inner: Arc<Inner<T>>,
    fetch: Arc<F>,
}

impl<T, F> Clone for FetchData<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<T, F> FetchData<T, F> {
    pub fn new(fetch: F) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                latest: AtomicU64::new(0),
            }),
            fetch: Arc::new(fetch),
        }
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.inner.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    pub fn data(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.state.borrow().data.clone()
    }

    /// Runs the wrapped function. On success the result is stored and
    /// returned; on failure the best available message is stored in
    /// `error`, previous `data` is kept, and the error is returned.
    pub async fn execute<A, Fut, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Clone,
        E: std::error::Error,
    {
        let token = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        let guard = CallGuard {
            inner: &*self.inner,
            token,
            armed: true,
        };

        let result = (self.fetch)(args).await;
        match &result {
            Ok(value) => {
                let value = value.clone();
                guard.finish(|s| s.data = Some(value));
            }
            Err(err) => {
                let message = best_message(err);
                warn!("Data fetch failed: {}", message);
                guard.finish(|s| s.error = Some(message));
            }
        }
        result
    }
}

impl<T, F> FetchData<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    /// Like [`FetchData::new`], and when `initial` is given runs one
    /// `execute` in the background right away. That call is not awaited;
    /// its outcome only shows up in the state. Must be called from within
    /// a tokio runtime.
    pub fn with_initial<A, Fut, E>(fetch: F, initial: Option<A>) -> Self
    where
        A: Send + 'static,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::error::Error + Send + 'static,
    {
        let this = Self::new(fetch);
        if let Some(args) = initial {
            let runner = this.clone();
            tokio::spawn(async move {
                let _ = runner.execute(args).await;
            });
        }
        this
    }
}

/// Error text, then the underlying cause, then a generic fallback.
pub fn best_message<E: std::error::Error + ?Sized>(err: &E) -> String {
    let own = err.to_string();
    if !own.trim().is_empty() {
        return own;
    }
    if let Some(cause) = err.source() {
        let text = cause.to_string();
        if !text.trim().is_empty() {
            return text;
        }
    }
    GENERIC_FAILURE_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ApiError;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    struct Silent(Option<std::io::Error>);

    impl std::fmt::Display for Silent {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    impl std::error::Error for Silent {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.0.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[tokio::test]
    async fn success_stores_data_and_clears_error() {
        let fetch = FetchData::new(|n: u32| async move { Ok::<_, ApiError>(n * 2) });
        assert_eq!(fetch.state(), FetchState::default());

        let value = fetch.execute(21).await.unwrap();
        assert_eq!(value, 42);
        let state = fetch.state();
        assert_eq!(state.data, Some(42));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_previous_data_and_reraises() {
        let fetch = FetchData::new(|ok: bool| async move {
            if ok {
                Ok(json!({"rows": 3}))
            } else {
                Err(ApiError::server(404, "Not Found", Some(json!({"message": "接口不存在"}))))
            }
        });

        fetch.execute(true).await.unwrap();
        let err = fetch.execute(false).await.unwrap_err();
        assert_eq!(err.status, Some(404));

        let state = fetch.state();
        assert_eq!(state.data, Some(json!({"rows": 3})));
        assert_eq!(state.error.as_deref(), Some("接口不存在"));
        assert!(!state.loading);

        fetch.execute(true).await.unwrap();
        assert!(fetch.error().is_none());
    }

    #[tokio::test]
    async fn loading_goes_true_then_false_once_even_on_error() {
        let fetch = FetchData::new(|fail: bool| async move {
            tokio::task::yield_now().await;
            if fail {
                Err(ApiError::configuration("bad"))
            } else {
                Ok(1u32)
            }
        });

        for fail in [false, true] {
            let mut rx = fetch.subscribe();
            let observer = tokio::spawn(async move {
                let mut seen = vec![rx.borrow_and_update().loading];
                while rx.changed().await.is_ok() {
                    let loading = rx.borrow_and_update().loading;
                    if seen.last() != Some(&loading) {
                        seen.push(loading);
                    }
                    if seen.len() == 3 {
                        break;
                    }
                }
                seen
            });
            tokio::task::yield_now().await;

            let _ = fetch.execute(fail).await;
            let seen = tokio::time::timeout(Duration::from_secs(1), observer)
                .await
                .expect("observer saw every transition")
                .unwrap();
            assert_eq!(seen, vec![false, true, false], "fail={}", fail);
        }
    }

    #[tokio::test]
    async fn message_falls_back_to_cause_then_generic() {
        let with_cause = Silent(Some(std::io::Error::new(std::io::ErrorKind::Other, "socket closed")));
        assert_eq!(best_message(&with_cause), "socket closed");
        assert_eq!(best_message(&Silent(None)), GENERIC_FAILURE_MESSAGE);

        let fetch = FetchData::new(|_: ()| async { Err::<u32, _>(Silent(None)) });
        assert!(fetch.execute(()).await.is_err());
        assert_eq!(fetch.error().as_deref(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let (slow_tx, slow_rx) = oneshot::channel::<u32>();
        let slow_rx = Arc::new(tokio::sync::Mutex::new(Some(slow_rx)));
        let fetch = FetchData::new(move |fast: bool| {
            let slow_rx = Arc::clone(&slow_rx);
            async move {
                if fast {
                    Ok::<u32, ApiError>(2)
                } else {
                    let rx = slow_rx.lock().await.take().unwrap();
                    Ok(rx.await.unwrap())
                }
            }
        });

        let first = tokio::spawn({
            let fetch = fetch.clone();
            async move { fetch.execute(false).await }
        });
        tokio::task::yield_now().await;
        assert!(fetch.is_loading());

        assert_eq!(fetch.execute(true).await.unwrap(), 2);
        slow_tx.send(1).unwrap();
        // The older call still returns its own value to its caller.
        assert_eq!(first.await.unwrap().unwrap(), 1);

        let state = fetch.state();
        assert_eq!(state.data, Some(2));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn dropped_call_releases_loading() {
        let fetch = FetchData::new(|_: ()| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<u32, ApiError>(0)
        });
        let res = tokio::time::timeout(Duration::from_millis(10), fetch.execute(())).await;
        assert!(res.is_err());
        assert!(!fetch.is_loading());
    }

    #[tokio::test]
    async fn initial_args_run_in_background() {
        let fetch = FetchData::with_initial(
            |city: String| async move {
                Err::<String, _>(ApiError::server(400, "Bad Request", Some(json!({"message": format!("no data for {}", city)}))))
            },
            Some("杭州".to_string()),
        );
        let mut rx = fetch.subscribe();
        rx.wait_for(|s| s.error.is_some() && !s.loading).await.unwrap();
        assert_eq!(fetch.error().as_deref(), Some("no data for 杭州"));

        let idle = FetchData::with_initial(|n: u32| async move { Ok::<_, ApiError>(n) }, None);
        tokio::task::yield_now().await;
        assert_eq!(idle.state(), FetchState::default());
    }
}
