//! Page bridge - DOM convenience helpers over a shared document
//!
//! The `dom` crate holds the document model and the pure helpers (class
//! manipulation, scroll planning, lookups). This crate adds everything
//! that depends on time or on change notification:
//!
//! - removal watching on top of a structural observer, native or polling
//! - throttled viewport resize/scroll events
//! - frame-driven smooth scrolling
//!
//! [`Page`] ties them together behind a ready gate.

pub mod error;
pub mod events;
pub mod observer;
pub mod observers;
pub mod page;
pub mod scroller;
pub mod viewport;
pub mod watcher;

use parking_lot::RwLock;
use std::sync::Arc;

/// Document handle shared between the page, observers and animations
pub type SharedDocument = Arc<RwLock<dom::DomArena>>;

pub use error::{PageError, Result};
pub use events::{
    Channel, MutationChannel, MutationEvent, MutationSource, SubscriptionId, ViewportChannel,
    ViewportEvent, ViewportTrigger,
};
pub use observer::{select_observer, PlatformCapabilities, StructuralObserver};
pub use observers::{NativeObserver, PollingObserver};
pub use page::{DocumentWriteGuard, Page, PageConfig};
pub use scroller::{scroll_by_element_to, scroll_by_element_to_on, ScrollOptions};
pub use viewport::{Throttle, ViewportBridge};
pub use watcher::on_remove_from_dom;
