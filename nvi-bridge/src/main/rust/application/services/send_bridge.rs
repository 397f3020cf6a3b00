use std::sync::Arc;

use crate::domain::errors::{DomainError, Result};
use crate::domain::media::{
    codec, depth, HostAudioFrame, HostVideoFrame, TimeTick, TransportAudioFrame,
};
use crate::domain::ports::{FrameSender, MediaKind, MetricsReporter, Transport};
use crate::domain::services::{PixelFormatTranslator, SampleFormatConverter};
use crate::domain::value_objects::{
    AudioOutputFormat, OutputFormat, SenderConfig, VideoOutputFormat,
};

/// Host output publishing finished frames on the transport.
///
/// The video and audio halves are independent so the host can drive them
/// from its own video and audio threads through [`SendBridge::outputs`].
pub struct SendBridge {
    config: SenderConfig,
    video: VideoOutput,
    audio: AudioOutput,
}

impl SendBridge {
    pub fn new(config: SenderConfig, metrics: Arc<dyn MetricsReporter>) -> Self {
        Self {
            config,
            video: VideoOutput {
                sender: None,
                format: None,
                metrics: Arc::clone(&metrics),
            },
            audio: AudioOutput {
                sender: None,
                format: None,
                scratch: Vec::new(),
                sample_tick: 0,
                metrics,
            },
        }
    }

    /// Allocate the sender and size the audio scratch for the negotiated format
    pub fn start(&mut self, transport: &dyn Transport, format: OutputFormat) -> Result<()> {
        if self.is_active() {
            self.stop();
        }

        let sender = transport
            .allocate_sender(&self.config)
            .map_err(DomainError::SenderAllocationFailed)?;

        if let Some(video) = format.video() {
            self.video.sender = Some(Arc::clone(&sender));
            self.video.format = Some(*video);
        }
        if let Some(audio) = format.audio() {
            self.audio.sender = Some(Arc::clone(&sender));
            self.audio.format = Some(*audio);
            self.audio.scratch = vec![0.0; audio.scratch_len()];
            self.audio.sample_tick = 0;
        }

        tracing::info!(
            alias = %self.config.alias(),
            video = format.video().is_some(),
            audio = format.audio().is_some(),
            "Output started"
        );
        Ok(())
    }

    /// Release the sender. Frames delivered afterwards are skipped.
    pub fn stop(&mut self) {
        let was_active = self.is_active();
        self.video.sender = None;
        self.video.format = None;
        self.audio.sender = None;
        self.audio.format = None;
        self.audio.scratch = Vec::new();

        if was_active {
            tracing::info!(alias = %self.config.alias(), "Output stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.video.sender.is_some() || self.audio.sender.is_some()
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    pub fn video(&mut self) -> &mut VideoOutput {
        &mut self.video
    }

    pub fn audio(&mut self) -> &mut AudioOutput {
        &mut self.audio
    }

    /// Both halves at once, for handing to separate delivery threads
    pub fn outputs(&mut self) -> (&mut VideoOutput, &mut AudioOutput) {
        (&mut self.video, &mut self.audio)
    }
}

pub struct VideoOutput {
    sender: Option<Arc<dyn FrameSender>>,
    format: Option<VideoOutputFormat>,
    metrics: Arc<dyn MetricsReporter>,
}

impl VideoOutput {
    pub fn is_active(&self) -> bool {
        self.sender.is_some() && self.format.is_some()
    }

    /// Publish one host frame. Failures are logged and the frame is lost.
    pub fn send(&mut self, frame: &HostVideoFrame<'_>) {
        let (Some(sender), Some(format)) = (&self.sender, &self.format) else {
            return;
        };

        let translated = format
            .check_frame(frame)
            .and_then(|()| PixelFormatTranslator::to_transport_frame(frame, format.frame_rate));
        let outgoing = match translated {
            Ok(outgoing) => outgoing,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping host video frame");
                self.metrics.report_frame_dropped(MediaKind::Video);
                return;
            }
        };

        match sender.send_video(&outgoing) {
            Ok(()) => self.metrics.report_frame_sent(MediaKind::Video),
            Err(e) => {
                tracing::warn!(error = %e, "Video send failed");
                self.metrics.report_send_failure(MediaKind::Video);
            }
        }
    }
}

pub struct AudioOutput {
    sender: Option<Arc<dyn FrameSender>>,
    format: Option<AudioOutputFormat>,
    scratch: Vec<f32>,
    sample_tick: u64,
    metrics: Arc<dyn MetricsReporter>,
}

impl AudioOutput {
    pub fn is_active(&self) -> bool {
        self.sender.is_some() && self.format.is_some()
    }

    /// Frames sent since the output started, in samples per channel
    pub fn sample_tick(&self) -> u64 {
        self.sample_tick
    }

    /// Interleave one planar host buffer into float PCM and publish it.
    ///
    /// The sample tick advances by the frame count of every converted buffer,
    /// whether or not the transport accepted it.
    pub fn send(&mut self, frame: &HostAudioFrame<'_>) {
        let (Some(sender), Some(format)) = (&self.sender, &self.format) else {
            return;
        };

        let converted = format.check_frame(frame).and_then(|()| {
            SampleFormatConverter::planar_to_interleaved(
                frame.format,
                frame.planes,
                frame.frames,
                format.channels,
                &mut self.scratch,
            )
        });
        let written = match converted {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping host audio frame");
                self.metrics.report_frame_dropped(MediaKind::Audio);
                return;
            }
        };

        let (Ok(samples), Ok(channels)) =
            (u32::try_from(frame.frames), u16::try_from(format.channels))
        else {
            self.metrics.report_frame_dropped(MediaKind::Audio);
            return;
        };

        let outgoing = TransportAudioFrame {
            codec: codec::LPCM,
            sample_rate: format.sample_rate,
            depth: depth::FLOAT_32,
            channels,
            tick: TimeTick::new(self.sample_tick, 1, format.sample_rate),
            time_us: i64::try_from(frame.timestamp_ns / 1_000).unwrap_or(i64::MAX),
            samples,
            data: bytemuck::cast_slice(&self.scratch[..written]),
        };

        match sender.send_audio(&outgoing) {
            Ok(()) => self.metrics.report_frame_sent(MediaKind::Audio),
            Err(e) => {
                tracing::warn!(error = %e, "Audio send failed");
                self.metrics.report_send_failure(MediaKind::Audio);
            }
        }

        self.sample_tick += frame.frames as u64;
    }
}
