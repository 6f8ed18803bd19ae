//! Native observer - forwards the document's own mutation records
//!
//! The document records child-list changes inside the observed subtree.
//! The page drains them after each mutation and hands them here; every
//! non-empty batch becomes one event on the mutation channel.

use async_trait::async_trait;
use dom::{MutationRecord, NodeId};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::Result;
use crate::events::{MutationChannel, MutationEvent};
use crate::observer::StructuralObserver;
use crate::SharedDocument;

struct Attached {
    document: SharedDocument,
    channel: Arc<MutationChannel>,
}

pub struct NativeObserver {
    attached: RwLock<Option<Attached>>,
}

impl NativeObserver {
    pub fn new() -> Self {
        Self {
            attached: RwLock::new(None),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.read().is_some()
    }
}

impl Default for NativeObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StructuralObserver for NativeObserver {
    fn name(&self) -> &str {
        "NativeObserver"
    }

    async fn observe(
        &self,
        document: SharedDocument,
        root: NodeId,
        channel: Arc<MutationChannel>,
    ) -> Result<()> {
        document.write().observe(root)?;
        *self.attached.write() = Some(Attached { document, channel });
        tracing::debug!(root, "[NativeObserver] observing subtree");
        Ok(())
    }

    fn deliver(&self, records: Vec<MutationRecord>) {
        if records.is_empty() {
            return;
        }

        // Release our lock before subscribers run
        let channel = match self.attached.read().as_ref() {
            Some(attached) => Arc::clone(&attached.channel),
            None => return,
        };

        tracing::trace!(records = records.len(), "[NativeObserver] delivering batch");
        channel.publish(MutationEvent::observed(records));
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(attached) = self.attached.write().take() {
            attached.document.write().disconnect_observer();
            tracing::debug!("[NativeObserver] disconnected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MutationSource;
    use dom::{DomArena, Viewport};

    #[tokio::test]
    async fn test_native_observer_publishes_batches() {
        let document: SharedDocument = Arc::new(RwLock::new(DomArena::with_document(
            Viewport::default(),
        )));
        let channel = Arc::new(MutationChannel::new("mutations"));
        let mut rx = channel.stream();
        let observer = NativeObserver::new();

        let root = document.read().root_id().unwrap();
        observer
            .observe(document.clone(), root, channel.clone())
            .await
            .unwrap();
        assert!(document.read().is_observed());

        let records = {
            let mut doc = document.write();
            let body = doc.body().unwrap();
            let div = doc.create_element("div");
            doc.append_child(body, div).unwrap();
            doc.take_records()
        };
        observer.deliver(records);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.source, MutationSource::Observer);
        assert_eq!(event.records.len(), 1);

        // Empty batches are not published
        observer.deliver(Vec::new());
        assert!(rx.try_recv().is_err());

        observer.disconnect().await.unwrap();
        assert!(!observer.is_attached());
        assert!(!document.read().is_observed());
    }
}
