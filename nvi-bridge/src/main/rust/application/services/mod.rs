mod bridge_context;
mod command_queue;
mod receive_bridge;
mod receive_loop;
mod send_bridge;
mod stream_directory;

pub use bridge_context::BridgeContext;
pub use command_queue::{command_queue, Command, CommandReceiver, CommandSender};
pub use receive_bridge::ReceiveBridge;
pub use send_bridge::{AudioOutput, SendBridge, VideoOutput};
pub use stream_directory::{StreamDirectory, DEFAULT_DISCOVERY_CAPACITY, DEFAULT_DISCOVERY_TIMEOUT};
