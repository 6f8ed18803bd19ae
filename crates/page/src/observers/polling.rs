//! Polling observer - fallback when the platform cannot report mutations
//!
//! Publishes an empty event every interval, unconditionally. Listeners
//! re-check whatever they care about, so detection is eventual with
//! latency bounded by the interval.

use async_trait::async_trait;
use dom::NodeId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::events::{MutationChannel, MutationEvent};
use crate::observer::StructuralObserver;
use crate::SharedDocument;

pub struct PollingObserver {
    /// Time between ticks
    interval: Duration,

    /// Polling task handle
    poll_task: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl PollingObserver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            poll_task: Arc::new(RwLock::new(None)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn is_polling(&self) -> bool {
        self.poll_task
            .read()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl StructuralObserver for PollingObserver {
    fn name(&self) -> &str {
        "PollingObserver"
    }

    async fn observe(
        &self,
        _document: SharedDocument,
        root: NodeId,
        channel: Arc<MutationChannel>,
    ) -> Result<()> {
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately; nothing has changed yet
            interval.tick().await;
            loop {
                interval.tick().await;
                channel.publish(MutationEvent::poll());
            }
        });

        if let Some(previous) = self.poll_task.write().await.replace(task) {
            previous.abort();
        }

        tracing::debug!(root, ?period, "[PollingObserver] polling started");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(task) = self.poll_task.write().await.take() {
            task.abort();
            tracing::debug!("[PollingObserver] polling stopped");
        }
        Ok(())
    }
}
