//! Viewport bridge - throttled resize/scroll notifications
//!
//! Bursts of window signals collapse into at most one event per window,
//! fired on the trailing edge so the event reflects the settled state.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

use crate::events::{ViewportChannel, ViewportEvent, ViewportTrigger};
use crate::SharedDocument;

/// Trailing-edge throttle
///
/// The first trigger in a quiet period arms a timer; later triggers inside
/// the window are absorbed. When the window closes the action runs once.
pub struct Throttle {
    window: Duration,
    pending: Arc<AtomicBool>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Arm the timer on `runtime`; returns `false` when one is already running
    ///
    /// Safe to call from any thread, the timer task runs on `runtime`.
    pub fn trigger<F>(&self, runtime: &Handle, fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }

        let pending = Arc::clone(&self.pending);
        let window = self.window;
        runtime.spawn(async move {
            tokio::time::sleep(window).await;
            pending.store(false, Ordering::Release);
            fire();
        });
        true
    }
}

/// Republishes window resize/scroll signals on the viewport channel
pub struct ViewportBridge {
    document: SharedDocument,
    channel: Arc<ViewportChannel>,
    throttle: Throttle,
    last_trigger: Arc<Mutex<ViewportTrigger>>,

    // Set while listening; timers are spawned here
    runtime: Mutex<Option<Handle>>,
}

impl ViewportBridge {
    pub fn new(document: SharedDocument, channel: Arc<ViewportChannel>, window: Duration) -> Self {
        Self {
            document,
            channel,
            throttle: Throttle::new(window),
            last_trigger: Arc::new(Mutex::new(ViewportTrigger::Resize)),
            runtime: Mutex::new(None),
        }
    }

    /// Start forwarding signals, spawning throttle timers on `runtime`
    pub fn listen(&self, runtime: Handle) {
        *self.runtime.lock() = Some(runtime);
    }

    /// Stop forwarding; a window already armed still fires
    pub fn stop(&self) {
        self.runtime.lock().take();
    }

    pub fn is_listening(&self) -> bool {
        self.runtime.lock().is_some()
    }

    /// Feed one platform signal; returns whether it armed a new window
    ///
    /// Callable from any thread.
    pub fn signal(&self, trigger: ViewportTrigger) -> bool {
        let Some(runtime) = self.runtime.lock().clone() else {
            return false;
        };

        *self.last_trigger.lock() = trigger;

        let document = Arc::clone(&self.document);
        let channel = Arc::clone(&self.channel);
        let last_trigger = Arc::clone(&self.last_trigger);
        self.throttle.trigger(&runtime, move || {
            let event = ViewportEvent {
                trigger: *last_trigger.lock(),
                viewport: document.read().viewport(),
            };
            tracing::trace!(trigger = ?event.trigger, "viewport changed");
            channel.publish(event);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomArena, Viewport};
    use parking_lot::RwLock;

    fn bridge(window: Duration) -> (ViewportBridge, Arc<ViewportChannel>, SharedDocument) {
        let document: SharedDocument =
            Arc::new(RwLock::new(DomArena::with_document(Viewport::new(800.0, 600.0))));
        let channel = Arc::new(ViewportChannel::new("viewport"));
        let bridge = ViewportBridge::new(document.clone(), channel.clone(), window);
        (bridge, channel, document)
    }

    #[tokio::test]
    async fn test_throttle_fires_once_per_window() {
        let throttle = Throttle::new(Duration::from_millis(40));
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let runtime = Handle::current();

        for _ in 0..10 {
            let count = count.clone();
            throttle.trigger(&runtime, move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(throttle.is_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!throttle.is_pending());
    }

    #[tokio::test]
    async fn test_burst_publishes_trailing_state() {
        let (bridge, channel, document) = bridge(Duration::from_millis(40));
        let mut rx = channel.stream();
        bridge.listen(Handle::current());

        assert!(bridge.signal(ViewportTrigger::Resize));
        document.write().set_viewport(Viewport::new(1024.0, 700.0));
        assert!(!bridge.signal(ViewportTrigger::Scroll));

        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("viewport event within timeout")
            .unwrap();
        assert_eq!(event.trigger, ViewportTrigger::Scroll);
        assert_eq!(event.viewport.width, 1024.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_signals_from_thread_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (bridge, channel, _) = bridge(Duration::from_millis(20));
        let mut rx = channel.stream();
        bridge.listen(runtime.handle().clone());

        let bridge = Arc::new(bridge);
        let host = {
            let bridge = bridge.clone();
            std::thread::spawn(move || bridge.signal(ViewportTrigger::Resize))
        };
        assert!(host.join().unwrap());

        let event = runtime
            .block_on(async { tokio::time::timeout(Duration::from_millis(500), rx.recv()).await })
            .expect("viewport event within timeout")
            .unwrap();
        assert_eq!(event.trigger, ViewportTrigger::Resize);
    }

    #[tokio::test]
    async fn test_stop_ignores_later_signals() {
        let (bridge, _channel, _) = bridge(Duration::from_millis(10));
        bridge.listen(Handle::current());
        assert!(bridge.is_listening());

        bridge.stop();
        assert!(!bridge.is_listening());
        assert!(!bridge.signal(ViewportTrigger::Scroll));
    }

    #[tokio::test]
    async fn test_ignores_signals_until_listening() {
        let (bridge, channel, _) = bridge(Duration::from_millis(10));
        let mut rx = channel.stream();

        assert!(!bridge.signal(ViewportTrigger::Resize));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(rx.try_recv().is_err());
    }
}
