use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::bounded;

use super::receive_loop::ReceiveLoop;
use super::{command_queue, BridgeContext, Command, CommandSender};
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::FrameSink;
use crate::domain::value_objects::{ConnectionState, ReceiveConfig, StreamKey};

/// Handle to one running receive thread.
///
/// Every method only enqueues a command or reads the published state, so the
/// handle can be used from the host's UI thread without blocking on the loop.
/// Dropping the handle shuts the thread down and joins it.
pub struct ReceiveBridge {
    name: String,
    commands: CommandSender,
    state: Arc<AtomicU8>,
    thread: Option<JoinHandle<()>>,
}

impl ReceiveBridge {
    /// Spawn the receive thread and wait until its loop is running
    pub fn start(
        context: &BridgeContext,
        sink: Box<dyn FrameSink>,
        config: ReceiveConfig,
    ) -> Result<Self> {
        let name = config.name().to_string();
        let (commands, queue) = command_queue();
        let state = Arc::new(AtomicU8::new(ConnectionState::Idle.as_u8()));
        let (ready_tx, ready_rx) = bounded::<()>(1);

        let receive_loop = ReceiveLoop::new(
            name.clone(),
            config.timing().clone(),
            context,
            queue,
            sink,
            Arc::clone(&state),
        );

        let thread = thread::Builder::new()
            .name(format!("nvi-recv-{}", name))
            .spawn(move || {
                // the loop runs even if start() already gave up waiting
                let _ = ready_tx.send(());
                receive_loop.run();
            })
            .map_err(|e| DomainError::ThreadSpawnFailed(e.to_string()))?;

        if ready_rx.recv().is_err() {
            let _ = thread.join();
            return Err(DomainError::ThreadSpawnFailed(format!(
                "receive thread {} exited before signalling readiness",
                name
            )));
        }

        tracing::info!(bridge = %name, "Receive bridge started");

        Ok(Self {
            name,
            commands,
            state,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply a `site:alias` target string from configuration.
    ///
    /// An empty string is ignored.
    pub fn set_target(&self, target: &str) -> Result<()> {
        if target.trim().is_empty() {
            return Ok(());
        }
        let key: StreamKey = target.parse()?;
        self.reconnect(key)
    }

    pub fn reconnect(&self, key: StreamKey) -> Result<()> {
        tracing::debug!(bridge = %self.name, target = %key, "Queueing reconnect");
        self.commands.enqueue(Command::Reconnect(key))
    }

    /// Last state published by the loop thread
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }

    /// Producer handle for other threads that want to issue commands
    pub fn command_sender(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Enqueue Shutdown and wait for the thread to exit. Later calls do nothing.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        if self.commands.enqueue(Command::Shutdown).is_err() {
            tracing::debug!(bridge = %self.name, "Receive loop already gone");
        }
        if thread.join().is_err() {
            tracing::error!(bridge = %self.name, "Receive thread panicked");
        }
        tracing::info!(bridge = %self.name, "Receive bridge stopped");
    }
}

impl Drop for ReceiveBridge {
    fn drop(&mut self) {
        self.stop();
    }
}
