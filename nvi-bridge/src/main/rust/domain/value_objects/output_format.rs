use crate::domain::errors::{DomainError, FormatError, Result};
use crate::domain::media::{
    FrameRate, HostAudioFrame, HostPixelFormat, HostSampleFormat, HostVideoFrame,
};

pub const MAX_AUDIO_CHANNELS: usize = 8;

/// Sender identity announced on the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    alias: String,
}

impl SenderConfig {
    pub fn new(alias: impl Into<String>) -> Result<Self> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(DomainError::InvalidOutputFormat(
                "sender alias cannot be empty".to_string(),
            ));
        }
        Ok(Self { alias })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            alias: "OBS".to_string(),
        }
    }
}

/// Video format negotiated with the host when the output starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoOutputFormat {
    pub format: HostPixelFormat,
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
}

impl VideoOutputFormat {
    /// Reject host frames whose layout or size differ from what the output started with
    pub fn check_frame(
        &self,
        frame: &HostVideoFrame<'_>,
    ) -> std::result::Result<(), FormatError> {
        let matches = (frame.format, frame.width, frame.height)
            == (self.format, self.width, self.height);
        if !matches {
            return Err(FormatError::NotNegotiated {
                negotiated: format!("{} {}x{}", self.format, self.width, self.height),
                actual: format!("{} {}x{}", frame.format, frame.width, frame.height),
            });
        }
        Ok(())
    }
}

/// Audio format negotiated with the host when the output starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioOutputFormat {
    pub format: HostSampleFormat,
    pub channels: usize,
    pub sample_rate: u32,
    /// Largest frame count the host delivers in one callback
    pub max_frames: usize,
}

impl AudioOutputFormat {
    /// Interleaved float capacity needed for the largest callback
    pub fn scratch_len(&self) -> usize {
        self.max_frames * self.channels
    }

    /// Reject host buffers whose sample format, channel count or rate differ from the output
    pub fn check_frame(
        &self,
        frame: &HostAudioFrame<'_>,
    ) -> std::result::Result<(), FormatError> {
        if frame.format != self.format
            || frame.channels != self.channels
            || frame.sample_rate != self.sample_rate
        {
            return Err(FormatError::NotNegotiated {
                negotiated: format!("{} {}ch {}Hz", self.format, self.channels, self.sample_rate),
                actual: format!("{} {}ch {}Hz", frame.format, frame.channels, frame.sample_rate),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputFormat {
    video: Option<VideoOutputFormat>,
    audio: Option<AudioOutputFormat>,
}

impl OutputFormat {
    pub fn new(video: Option<VideoOutputFormat>, audio: Option<AudioOutputFormat>) -> Result<Self> {
        if video.is_none() && audio.is_none() {
            return Err(DomainError::NothingToSend);
        }

        if let Some(video) = &video {
            Self::validate_video(video)?;
        }
        if let Some(audio) = &audio {
            Self::validate_audio(audio)?;
        }

        Ok(Self { video, audio })
    }

    pub fn video(&self) -> Option<&VideoOutputFormat> {
        self.video.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioOutputFormat> {
        self.audio.as_ref()
    }

    fn validate_video(video: &VideoOutputFormat) -> Result<()> {
        if video.width == 0 || video.height == 0 {
            return Err(DomainError::InvalidOutputFormat(format!(
                "video size {}x{} must be non-zero",
                video.width, video.height
            )));
        }
        if video.frame_rate.num == 0 || video.frame_rate.den == 0 {
            return Err(DomainError::InvalidOutputFormat(
                "video frame rate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_audio(audio: &AudioOutputFormat) -> Result<()> {
        if audio.channels == 0 || audio.channels > MAX_AUDIO_CHANNELS {
            return Err(DomainError::InvalidOutputFormat(format!(
                "audio channels must be 1..={}, got {}",
                MAX_AUDIO_CHANNELS, audio.channels
            )));
        }
        if audio.sample_rate == 0 {
            return Err(DomainError::InvalidOutputFormat(
                "audio sample rate must be non-zero".to_string(),
            ));
        }
        if audio.max_frames == 0 {
            return Err(DomainError::InvalidOutputFormat(
                "audio max frames must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
