use crate::domain::media::{SourceAudioFrame, SourceVideoFrame};

/// Port for the host's frame-delivery entry points
pub trait FrameSink: Send {
    fn deliver_video(&mut self, frame: &SourceVideoFrame<'_>);

    fn deliver_audio(&mut self, frame: &SourceAudioFrame<'_>);

    /// Ancillary metadata; ignored unless the host cares
    fn deliver_metadata(&mut self, metadata: &[u8]) {
        let _ = metadata;
    }
}
