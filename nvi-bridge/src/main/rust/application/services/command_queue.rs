use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::domain::errors::{DomainError, Result};
use crate::domain::value_objects::StreamKey;

/// Deferred operation for the receive loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Release the current receiver (if any) and connect to this stream
    Reconnect(StreamKey),
    Shutdown,
}

/// Create the unbounded FIFO between any number of producers and the receive loop
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Producer side, cheap to clone and usable from any thread
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Never blocks; fails only once the receive loop has exited
    pub fn enqueue(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| DomainError::BridgeNotRunning)
    }
}

/// Consumer side, owned by the receive loop
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

impl CommandReceiver {
    /// At most one command, without blocking
    pub fn try_dequeue(&self) -> Option<Command> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            // every producer is gone; nobody can ask for anything else
            Err(TryRecvError::Disconnected) => Some(Command::Shutdown),
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
