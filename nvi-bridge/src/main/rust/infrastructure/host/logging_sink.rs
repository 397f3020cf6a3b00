use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::media::{SourceAudioFrame, SourceVideoFrame};
use crate::domain::ports::FrameSink;

/// Frame counters shared between a [`LoggingSink`] and whoever inspects it
#[derive(Debug, Default)]
pub struct SinkStats {
    video: AtomicU64,
    audio: AtomicU64,
    metadata: AtomicU64,
}

impl SinkStats {
    pub fn video_frames(&self) -> u64 {
        self.video.load(Ordering::Relaxed)
    }

    pub fn audio_frames(&self) -> u64 {
        self.audio.load(Ordering::Relaxed)
    }

    pub fn metadata_frames(&self) -> u64 {
        self.metadata.load(Ordering::Relaxed)
    }
}

/// Host source that only counts and logs what it is given
pub struct LoggingSink {
    name: String,
    stats: Arc<SinkStats>,
    log_every: u64,
}

impl LoggingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Arc::new(SinkStats::default()),
            log_every: 300,
        }
    }

    /// Log one line per `frames` deliveries of each kind
    pub fn with_log_interval(mut self, frames: u64) -> Self {
        self.log_every = frames.max(1);
        self
    }

    pub fn stats(&self) -> Arc<SinkStats> {
        Arc::clone(&self.stats)
    }

    fn should_log(&self, count: u64) -> bool {
        count == 1 || count % self.log_every == 0
    }
}

impl FrameSink for LoggingSink {
    fn deliver_video(&mut self, frame: &SourceVideoFrame<'_>) {
        let count = self.stats.video.fetch_add(1, Ordering::Relaxed) + 1;
        if self.should_log(count) {
            tracing::info!(
                source = %self.name,
                frames = count,
                format = %frame.format,
                width = frame.width,
                height = frame.height,
                "Video received"
            );
        }
    }

    fn deliver_audio(&mut self, frame: &SourceAudioFrame<'_>) {
        let count = self.stats.audio.fetch_add(1, Ordering::Relaxed) + 1;
        if self.should_log(count) {
            tracing::info!(
                source = %self.name,
                frames = count,
                format = %frame.format,
                channels = frame.speakers.channel_count(),
                sample_rate = frame.sample_rate,
                "Audio received"
            );
        }
    }

    fn deliver_metadata(&mut self, metadata: &[u8]) {
        let count = self.stats.metadata.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            source = %self.name,
            frames = count,
            bytes = metadata.len(),
            "Metadata received"
        );
    }
}
