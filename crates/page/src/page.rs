//! Page - the host-facing entry point
//!
//! Owns the shared document, the two notification channels, the
//! structural observer picked for this platform, and the viewport bridge.
//! The bridge starts only after the host says the document is ready.
//!
//! All writes go through [`Page::write`] or [`Page::mutate`], so every
//! child-list change reaches the observer. Host signals may come from any
//! thread; timers and animations run on the runtime captured by
//! [`Page::start`].

use dom::{ClassArg, DomArena, NodeId, Toggle, Viewport};
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{PageError, Result};
use crate::events::{MutationChannel, ViewportChannel, ViewportTrigger};
use crate::observer::{select_observer, PlatformCapabilities, StructuralObserver};
use crate::scroller::{self, ScrollOptions};
use crate::viewport::ViewportBridge;
use crate::watcher;
use crate::SharedDocument;

/// Page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub id: String,
    /// Polling fallback period
    pub poll_interval_ms: u64,
    /// Viewport throttle window
    pub viewport_throttle_ms: u64,
    /// Default smooth-scroll duration
    pub scroll_duration_ms: u64,
    pub frame_interval_ms: u64,
    pub capabilities: PlatformCapabilities,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            poll_interval_ms: 2000,
            viewport_throttle_ms: 150,
            scroll_duration_ms: 200,
            frame_interval_ms: 16,
            capabilities: PlatformCapabilities::default(),
        }
    }
}

impl PageConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn viewport_throttle(&self) -> Duration {
        Duration::from_millis(self.viewport_throttle_ms)
    }

    pub fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            duration: Duration::from_millis(self.scroll_duration_ms),
            frame_interval: Duration::from_millis(self.frame_interval_ms.max(1)),
            ..ScrollOptions::default()
        }
    }
}

/// Page - shared document plus its notification bridge
pub struct Page {
    pub config: PageConfig,

    document: SharedDocument,

    mutations: Arc<MutationChannel>,
    viewport_changes: Arc<ViewportChannel>,

    // Chosen once, at construction, from the platform capabilities
    observer: Arc<dyn StructuralObserver>,
    viewport_bridge: ViewportBridge,

    ready: watch::Sender<bool>,
    started: AtomicBool,
    runtime: Mutex<Option<Handle>>,
}

/// Write access to a page's document
///
/// Records produced while the guard is held are delivered to the observer
/// when it drops, with the lock released during delivery.
pub struct DocumentWriteGuard<'a> {
    guard: RwLockWriteGuard<'a, DomArena>,
    observer: &'a dyn StructuralObserver,
}

impl Deref for DocumentWriteGuard<'_> {
    type Target = DomArena;

    fn deref(&self) -> &DomArena {
        &self.guard
    }
}

impl DerefMut for DocumentWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut DomArena {
        &mut self.guard
    }
}

impl Drop for DocumentWriteGuard<'_> {
    fn drop(&mut self) {
        let records = self.guard.take_records();
        if records.is_empty() {
            return;
        }

        let observer = self.observer;
        RwLockWriteGuard::unlocked(&mut self.guard, || observer.deliver(records));
    }
}

impl Page {
    pub fn new(config: PageConfig, document: DomArena) -> Self {
        let document: SharedDocument = Arc::new(RwLock::new(document));
        let mutations = Arc::new(MutationChannel::new("mutations"));
        let viewport_changes = Arc::new(ViewportChannel::new("viewport"));

        let observer = select_observer(config.capabilities, config.poll_interval());
        let viewport_bridge = ViewportBridge::new(
            Arc::clone(&document),
            Arc::clone(&viewport_changes),
            config.viewport_throttle(),
        );
        let (ready, _) = watch::channel(false);

        Self {
            config,
            document,
            mutations,
            viewport_changes,
            observer,
            viewport_bridge,
            ready,
            started: AtomicBool::new(false),
            runtime: Mutex::new(None),
        }
    }

    pub fn mutations(&self) -> Arc<MutationChannel> {
        Arc::clone(&self.mutations)
    }

    pub fn viewport_changes(&self) -> Arc<ViewportChannel> {
        Arc::clone(&self.viewport_changes)
    }

    pub fn observer_name(&self) -> &str {
        self.observer.name()
    }

    /// Host signal: the document is interactive
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    // Runtime captured at start, else the caller's own
    fn runtime(&self) -> Option<Handle> {
        self.runtime
            .lock()
            .clone()
            .or_else(|| Handle::try_current().ok())
    }

    /// Wait for the ready signal, then start observing the document
    pub async fn start(&self) -> Result<()> {
        let mut ready = self.ready.subscribe();
        ready
            .wait_for(|ready| *ready)
            .await
            .map_err(|_| PageError::ReadySignalClosed)?;

        let root = self
            .document
            .read()
            .root_id()
            .ok_or(PageError::NoDocumentRoot)?;

        if self.started.swap(true, Ordering::AcqRel) {
            return Err(PageError::AlreadyStarted);
        }

        if let Err(e) = self
            .observer
            .observe(Arc::clone(&self.document), root, Arc::clone(&self.mutations))
            .await
        {
            self.started.store(false, Ordering::Release);
            return Err(e);
        }

        let runtime = Handle::current();
        *self.runtime.lock() = Some(runtime.clone());
        self.viewport_bridge.listen(runtime);

        tracing::info!(
            page_id = %self.config.id,
            observer = self.observer.name(),
            "page bridge started"
        );
        Ok(())
    }

    /// Tear the bridge down
    pub async fn stop(&self) -> Result<()> {
        if !self.started.swap(false, Ordering::AcqRel) {
            return Err(PageError::NotStarted);
        }

        self.viewport_bridge.stop();
        self.runtime.lock().take();
        self.observer.disconnect().await?;

        tracing::info!(page_id = %self.config.id, "page bridge stopped");
        Ok(())
    }

    /// Lock the document for writing
    ///
    /// Child-list changes are delivered when the guard drops.
    pub fn write(&self) -> DocumentWriteGuard<'_> {
        DocumentWriteGuard {
            guard: self.document.write(),
            observer: self.observer.as_ref(),
        }
    }

    /// Run a mutation against the document, then deliver its records
    pub fn mutate<R>(&self, f: impl FnOnce(&mut DomArena) -> R) -> R {
        f(&mut self.write())
    }

    /// Read-only access to the document
    pub fn read<R>(&self, f: impl FnOnce(&DomArena) -> R) -> R {
        f(&self.document.read())
    }

    /// Host signal: the window was resized
    pub fn resize(&self, width: f64, height: f64) {
        self.mutate(|doc| {
            let mut viewport = doc.viewport();
            viewport.width = width;
            viewport.height = height;
            doc.set_viewport(viewport);
        });
        self.notify_resize();
    }

    /// Host signal: the window scrolled to `(x, y)`
    ///
    /// Returns the vertical offset actually applied, clamped to the
    /// document's scroll range.
    pub fn scroll_window(&self, x: f64, y: f64) -> f64 {
        let applied = self.mutate(|doc| {
            if let Some(html) = doc.document_element() {
                match doc.set_scroll_top(html, y) {
                    Ok(applied) if applied != y => {
                        tracing::trace!(requested = y, applied, "window scroll clamped");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("window scroll not applied: {}", e),
                }
            }
            let viewport = doc.viewport();
            doc.set_viewport(Viewport {
                scroll_x: x,
                ..viewport
            });
            viewport.scroll_y
        });
        self.notify_scroll();
        applied
    }

    pub fn notify_resize(&self) {
        self.viewport_bridge.signal(ViewportTrigger::Resize);
    }

    pub fn notify_scroll(&self) {
        self.viewport_bridge.signal(ViewportTrigger::Scroll);
    }

    /// Call `callback` once when `node` leaves the document
    pub fn on_remove_from_dom<F>(&self, node: NodeId, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        watcher::on_remove_from_dom(&self.document, &self.mutations, node, callback)
    }

    /// Smooth-scroll with the configured duration
    pub fn scroll_by_element_to(&self, node: NodeId, desired_top: f64) -> bool {
        self.scroll_with_options(node, desired_top, self.config.scroll_options())
    }

    pub fn scroll_by_element_to_with(
        &self,
        node: NodeId,
        desired_top: f64,
        duration: Duration,
    ) -> bool {
        let options = ScrollOptions {
            duration,
            ..self.config.scroll_options()
        };
        self.scroll_with_options(node, desired_top, options)
    }

    fn scroll_with_options(&self, node: NodeId, desired_top: f64, options: ScrollOptions) -> bool {
        let Some(runtime) = self.runtime() else {
            tracing::debug!(node, "page not started and no runtime, skipping scroll");
            return false;
        };
        scroller::scroll_by_element_to_on(&runtime, &self.document, node, desired_top, options)
    }

    pub fn find_by_id(&self, id: &str, parent: Option<NodeId>) -> Option<NodeId> {
        self.document.read().find_by_id(id, parent)
    }

    pub fn set_class(&self, node: Option<NodeId>, classes: impl Into<ClassArg>) {
        self.mutate(|doc| dom::set_class(doc, node, classes));
    }

    pub fn add_class(&self, node: Option<NodeId>, classes: impl Into<ClassArg>) {
        self.mutate(|doc| dom::add_class(doc, node, classes));
    }

    pub fn remove_class(&self, node: Option<NodeId>, classes: impl Into<ClassArg>) {
        self.mutate(|doc| dom::remove_class(doc, node, classes));
    }

    pub fn toggle_class(&self, node: Option<NodeId>, toggle: Toggle) {
        self.mutate(|doc| dom::toggle_class(doc, node, toggle));
    }

    pub fn has_class(&self, node: Option<NodeId>, token: &str) -> bool {
        dom::has_class(&self.document.read(), node, token)
    }

    pub fn is_in_viewport(&self, node: Option<NodeId>, fully: bool) -> bool {
        dom::is_in_viewport(&self.document.read(), node, fully)
    }

    pub fn scroll_position(&self) -> (f64, f64) {
        dom::scroll_position(&self.document.read())
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        dom::viewport_size(&self.document.read())
    }
}
