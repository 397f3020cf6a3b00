use std::sync::Arc;
use std::time::Duration;

use super::StreamDirectory;
use crate::domain::errors::Result;
use crate::domain::ports::{MetricsReporter, NoopReporter, Transport};

/// Process-wide collaborators, built once at startup and handed to every bridge
#[derive(Clone)]
pub struct BridgeContext {
    pub transport: Arc<dyn Transport>,
    pub directory: Arc<StreamDirectory>,
    pub metrics: Arc<dyn MetricsReporter>,
}

impl BridgeContext {
    pub fn new(transport: Arc<dyn Transport>, metrics: Arc<dyn MetricsReporter>) -> Self {
        Self {
            transport,
            directory: Arc::new(StreamDirectory::new()),
            metrics,
        }
    }

    /// Context that reports nowhere
    pub fn without_metrics(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, Arc::new(NoopReporter))
    }

    pub fn with_directory(mut self, directory: Arc<StreamDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Refresh the shared directory and report its size
    pub fn refresh_directory(
        &self,
        timeout: Duration,
        capacity: usize,
    ) -> Result<usize> {
        let count = self
            .directory
            .refresh(self.transport.as_ref(), timeout, capacity)?;
        self.metrics.report_directory_size(count);
        Ok(count)
    }
}
