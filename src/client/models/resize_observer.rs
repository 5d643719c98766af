use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Invoked by the host whenever the observed size may have changed.
pub type ResizeCallback = Arc<dyn Fn() + Send + Sync>;

/// A listener registration that must be released exactly once.
pub trait Subscription: Send {
    fn release(&mut self);
}

/// The rendering environment the observer is attached to.
pub trait ResizeHost: Send + Sync + 'static {
    type Element: Send + Sync + 'static;

    /// The target element, or `None` while it is not realized yet.
    fn resolve(&self) -> Option<Self::Element>;

    fn client_size(&self, element: &Self::Element) -> Size;

    /// Whether per-element resize observation is available.
    fn supports_resize_observer(&self) -> bool;

    fn observe(&self, element: &Self::Element, on_resize: ResizeCallback) -> Box<dyn Subscription>;

    /// Viewport-level resize listener used when per-element observation is missing.
    fn listen_window_resize(&self, on_resize: ResizeCallback) -> Box<dyn Subscription>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Uninitialized,
    Retrying(u32),
    Observing,
    FallbackObserving,
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationMode {
    Element,
    Window,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResizeError {
    #[error("element was not realized after {attempts} attempts")]
    NotRealized { attempts: u32 },
    #[error("observer was unmounted before it became ready")]
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Lookups made before giving up, the first one included.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(100),
        }
    }
}

/// Resolves once the observer is attached, or with the reason it never was.
pub struct Readiness(oneshot::Receiver<Result<ObservationMode, ResizeError>>);

impl Readiness {
    pub async fn wait(self) -> Result<ObservationMode, ResizeError> {
        self.0.await.unwrap_or(Err(ResizeError::Unmounted))
    }

    /// Runs `callback` with the outcome without blocking the caller.
    pub fn on_ready<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<ObservationMode, ResizeError>) + Send + 'static,
    {
        tokio::spawn(async move { callback(self.wait().await) })
    }
}

type SubscriptionSlot = Arc<Mutex<Option<Box<dyn Subscription>>>>;

/// Tracks the client width/height of one element.
///
/// `mount` starts initialization on the next scheduler tick and retries
/// while the element is missing. `unmount` (also run on drop) releases
/// whatever listener was attached.
pub struct ResizeObserver<H: ResizeHost> {
    host: Arc<H>,
    retry: RetryPolicy,
    size: watch::Sender<Size>,
    state: watch::Sender<ObserverState>,
    mounted: Arc<AtomicBool>,
    subscription: SubscriptionSlot,
    init_task: Option<JoinHandle<()>>,
}

impl<H: ResizeHost> ResizeObserver<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self::with_retry(host, RetryPolicy::default())
    }

    pub fn with_retry(host: Arc<H>, retry: RetryPolicy) -> Self {
        let (size, _) = watch::channel(Size::default());
        let (state, _) = watch::channel(ObserverState::Uninitialized);
        Self {
            host,
            retry,
            size,
            state,
            mounted: Arc::new(AtomicBool::new(false)),
            subscription: Arc::new(Mutex::new(None)),
            init_task: None,
        }
    }

    pub fn size(&self) -> Size {
        *self.size.borrow()
    }

    pub fn width(&self) -> f64 {
        self.size.borrow().width
    }

    pub fn height(&self) -> f64 {
        self.size.borrow().height
    }

    pub fn state(&self) -> ObserverState {
        *self.state.borrow()
    }

    /// Read-only view of the size, notified on every update.
    pub fn subscribe(&self) -> watch::Receiver<Size> {
        self.size.subscribe()
    }

    /// Must be called from within a tokio runtime. Mounting again first
    /// unmounts the previous attachment.
    pub fn mount(&mut self) -> Readiness {
        if self.mounted.load(Ordering::SeqCst) {
            self.unmount();
        }
        self.mounted.store(true, Ordering::SeqCst);
        self.state.send_replace(ObserverState::Uninitialized);

        let (ready_tx, ready_rx) = oneshot::channel();
        let init = Initializer {
            host: Arc::clone(&self.host),
            retry: self.retry,
            size: self.size.clone(),
            state: self.state.clone(),
            mounted: Arc::clone(&self.mounted),
            subscription: Arc::clone(&self.subscription),
        };
        self.init_task = Some(tokio::spawn(async move {
            let outcome = init.run().await;
            let _ = ready_tx.send(outcome);
        }));
        Readiness(ready_rx)
    }

    pub fn unmount(&mut self) {
        self.mounted.store(false, Ordering::SeqCst);
        if let Some(task) = self.init_task.take() {
            task.abort();
        }
        if let Ok(mut slot) = self.subscription.lock() {
            if let Some(mut sub) = slot.take() {
                sub.release();
            }
        }
        self.state.send_replace(ObserverState::Unmounted);
    }
}

impl<H: ResizeHost> Drop for ResizeObserver<H> {
    fn drop(&mut self) {
        if self.mounted.load(Ordering::SeqCst) {
            self.unmount();
        }
    }
}

struct Initializer<H: ResizeHost> {
    host: Arc<H>,
    retry: RetryPolicy,
    size: watch::Sender<Size>,
    state: watch::Sender<ObserverState>,
    mounted: Arc<AtomicBool>,
    subscription: SubscriptionSlot,
}

impl<H: ResizeHost> Initializer<H> {
    async fn run(self) -> Result<ObservationMode, ResizeError> {
        // Let the element attach before the first lookup.
        tokio::task::yield_now().await;

        let mut attempts = 0;
        let element = loop {
            attempts += 1;
            if let Some(element) = self.host.resolve() {
                break element;
            }
            if attempts >= self.retry.max_attempts {
                debug!("Resize target not realized after {} attempts, giving up", attempts);
                self.state.send_replace(ObserverState::Uninitialized);
                return Err(ResizeError::NotRealized { attempts });
            }
            self.state.send_replace(ObserverState::Retrying(attempts));
            tokio::time::sleep(self.retry.delay).await;
        };

        if !self.mounted.load(Ordering::SeqCst) {
            return Err(ResizeError::Unmounted);
        }

        self.size.send_replace(self.host.client_size(&element));

        let on_resize = self.callback();
        let (sub, mode) = if self.host.supports_resize_observer() {
            (self.host.observe(&element, on_resize), ObservationMode::Element)
        } else {
            (self.host.listen_window_resize(on_resize), ObservationMode::Window)
        };
        self.store(sub)?;

        self.state.send_replace(match mode {
            ObservationMode::Element => ObserverState::Observing,
            ObservationMode::Window => ObserverState::FallbackObserving,
        });
        Ok(mode)
    }

    fn callback(&self) -> ResizeCallback {
        let host = Arc::clone(&self.host);
        let size = self.size.clone();
        let mounted = Arc::clone(&self.mounted);
        Arc::new(move || {
            if !mounted.load(Ordering::SeqCst) {
                return;
            }
            if let Some(element) = host.resolve() {
                size.send_replace(host.client_size(&element));
            }
        })
    }

    /// Keeps the subscription for `unmount`, or releases it right away if
    /// the observer was unmounted while attaching.
    fn store(&self, mut sub: Box<dyn Subscription>) -> Result<(), ResizeError> {
        let mut slot = match self.subscription.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !self.mounted.load(Ordering::SeqCst) {
            sub.release();
            return Err(ResizeError::Unmounted);
        }
        *slot = Some(sub);
        Ok(())
    }
}
