//! Structural observer - watch a subtree and republish child-list changes
//!
//! Two implementations of one interface, picked once by capability:
//! - [`NativeObserver`] forwards the document's own mutation records
//! - [`PollingObserver`] ticks on a fixed interval when there is no such
//!   primitive, trading latency for eventual detection

use async_trait::async_trait;
use dom::{MutationRecord, NodeId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::events::MutationChannel;
use crate::observers::{NativeObserver, PollingObserver};
use crate::SharedDocument;

/// What the host platform can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformCapabilities {
    /// Native structural-change observation is available
    pub mutation_observer: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            mutation_observer: true,
        }
    }
}

/// Observer trait - turns platform change notifications into channel events
#[async_trait]
pub trait StructuralObserver: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Begin watching `root` and its whole subtree
    async fn observe(
        &self,
        document: SharedDocument,
        root: NodeId,
        channel: Arc<MutationChannel>,
    ) -> Result<()>;

    /// Hand over a batch of records drained from the document
    ///
    /// Called after every mutation, outside the document lock. Observers
    /// that don't use records ignore it.
    fn deliver(&self, records: Vec<MutationRecord>) {
        let _ = records;
    }

    /// Stop watching; idempotent
    async fn disconnect(&self) -> Result<()>;
}

/// Pick the observer variant the platform supports
pub fn select_observer(
    capabilities: PlatformCapabilities,
    poll_interval: Duration,
) -> Arc<dyn StructuralObserver> {
    if capabilities.mutation_observer {
        Arc::new(NativeObserver::new())
    } else {
        tracing::debug!(
            ?poll_interval,
            "no native mutation observer, falling back to polling"
        );
        Arc::new(PollingObserver::new(poll_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_capability() {
        let native = select_observer(PlatformCapabilities::default(), Duration::from_secs(2));
        assert_eq!(native.name(), "NativeObserver");

        let polling = select_observer(
            PlatformCapabilities {
                mutation_observer: false,
            },
            Duration::from_secs(2),
        );
        assert_eq!(polling.name(), "PollingObserver");
    }

    #[test]
    fn test_capabilities_from_json() {
        let caps: PlatformCapabilities = serde_json::from_str("{}").unwrap();
        assert!(caps.mutation_observer);

        let caps: PlatformCapabilities =
            serde_json::from_str(r#"{ "mutation_observer": false }"#).unwrap();
        assert!(!caps.mutation_observer);
    }
}
