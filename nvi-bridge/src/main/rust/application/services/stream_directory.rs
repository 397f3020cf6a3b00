use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::domain::entities::DirectorySnapshot;
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::Transport;
use crate::domain::value_objects::{StreamDescriptor, StreamKey};

pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_millis(1500);
pub const DEFAULT_DISCOVERY_CAPACITY: usize = 10;

/// Latest discovery snapshot, shared by the UI thread and every receive loop.
///
/// Readers take an `Arc` to the current snapshot and never see a partially
/// updated list; a refresh replaces the whole snapshot at once.
#[derive(Debug, Default)]
pub struct StreamDirectory {
    snapshot: RwLock<Arc<DirectorySnapshot>>,
}

impl StreamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the transport and publish the result.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn refresh(
        &self,
        transport: &dyn Transport,
        timeout: Duration,
        capacity: usize,
    ) -> Result<usize> {
        let streams = transport
            .enumerate_streams(timeout, capacity)
            .map_err(DomainError::DiscoveryFailed)?;

        let count = streams.len();
        self.publish(DirectorySnapshot::new(streams));
        tracing::debug!(streams = count, "Stream directory refreshed");
        Ok(count)
    }

    pub fn publish(&self, snapshot: DirectorySnapshot) {
        *self.snapshot.write() = Arc::new(snapshot);
    }

    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        self.snapshot.read().clone()
    }

    pub fn resolve(&self, key: &StreamKey) -> Option<StreamDescriptor> {
        self.snapshot.read().lookup(key).cloned()
    }

    pub fn selection_list(&self) -> Vec<String> {
        self.snapshot().selection_list()
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
