use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::TransportError;
use crate::domain::media::{TransportAudioFrame, TransportVideoFrame};
use crate::domain::value_objects::{SenderConfig, StreamDescriptor};

/// Payloads produced by one poll. Any combination may be absent.
///
/// Borrows from the receiver, so it cannot outlive the next poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolledFrames<'a> {
    pub video: Option<TransportVideoFrame<'a>>,
    pub audio: Option<TransportAudioFrame<'a>>,
    pub metadata: Option<&'a [u8]>,
}

impl PolledFrames<'_> {
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none() && self.metadata.is_none()
    }
}

/// Port for the transport SDK's receive and discovery primitives.
///
/// Handles are released by dropping them.
pub trait Transport: Send + Sync {
    fn allocate_receiver(&self, uri: &str) -> Result<Box<dyn FrameReceiver>, TransportError>;

    fn allocate_sender(&self, config: &SenderConfig)
        -> Result<Arc<dyn FrameSender>, TransportError>;

    /// Discover streams, waiting at most `timeout` and returning at most `capacity` entries
    fn enumerate_streams(
        &self,
        timeout: Duration,
        capacity: usize,
    ) -> Result<Vec<StreamDescriptor>, TransportError>;
}

/// One connected receiver handle, owned by a single receive loop
pub trait FrameReceiver: Send {
    /// Wait at most `timeout` for the next frames
    fn poll(&mut self, timeout: Duration) -> Result<PolledFrames<'_>, TransportError>;
}

/// One sender handle, shared by the video and audio halves of an output
pub trait FrameSender: Send + Sync {
    fn send_video(&self, frame: &TransportVideoFrame<'_>) -> Result<(), TransportError>;

    fn send_audio(&self, frame: &TransportAudioFrame<'_>) -> Result<(), TransportError>;
}
