//! Removal watcher - run a callback once when a node leaves the document
//!
//! The watch is a one-shot mutation subscription. On every mutation event
//! it walks from the node up to the root; the first time the walk does not
//! reach the root, the subscription is cancelled and the callback runs.

use dom::NodeId;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

use crate::events::{MutationChannel, MutationEvent, SubscriptionId};
use crate::SharedDocument;

/// Watch `node` for removal from the document
///
/// Returns `false`, and never calls `callback`, when the node is already
/// detached (or unknown): only the present → absent transition is watched.
/// The callback runs at most once, synchronously on the publishing thread,
/// after the subscription has been removed.
pub fn on_remove_from_dom<F>(
    document: &SharedDocument,
    mutations: &Arc<MutationChannel>,
    node: NodeId,
    callback: F,
) -> bool
where
    F: FnOnce() + Send + 'static,
{
    if !document.read().is_attached(node) {
        tracing::trace!(node, "node not attached, removal watch skipped");
        return false;
    }

    let slot = Arc::new(Mutex::new(Some(callback)));
    let subscription: Arc<OnceLock<SubscriptionId>> = Arc::new(OnceLock::new());

    let doc = Arc::clone(document);
    // Weak: the channel owns this closure
    let channel = Arc::downgrade(mutations);
    let own_id = Arc::clone(&subscription);
    let callback = Arc::clone(&slot);

    let id = mutations.subscribe(move |_event: &MutationEvent| {
        if doc.read().is_attached(node) {
            return;
        }

        let Some(callback) = callback.lock().take() else {
            return;
        };

        if let (Some(channel), Some(id)) = (channel.upgrade(), own_id.get()) {
            channel.unsubscribe(*id);
        }

        tracing::debug!(node, "watched node removed from document");
        callback();
    });

    let _ = subscription.set(id);
    // Fired on another thread before its id was known: it could not
    // remove itself
    if slot.lock().is_none() {
        mutations.unsubscribe(id);
    }
    true
}
