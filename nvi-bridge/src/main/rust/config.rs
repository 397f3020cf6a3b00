use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::domain::media::{FrameRate, HostPixelFormat, HostSampleFormat};
use crate::domain::value_objects::{
    AudioOutputFormat, BackoffPolicy, LoopTiming, OutputFormat, ReceiveConfig, SenderConfig,
    StreamKey, VideoOutputFormat, MAX_AUDIO_CHANNELS,
};

/// Planar sample formats the demo output can produce
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSampleFormat {
    #[value(name = "f32-planar")]
    FloatPlanar,
    #[value(name = "s16-planar")]
    S16Planar,
    #[value(name = "u8-planar")]
    U8Planar,
}

impl From<DemoSampleFormat> for HostSampleFormat {
    fn from(format: DemoSampleFormat) -> Self {
        match format {
            DemoSampleFormat::FloatPlanar => HostSampleFormat::FloatPlanar,
            DemoSampleFormat::S16Planar => HostSampleFormat::S16Planar,
            DemoSampleFormat::U8Planar => HostSampleFormat::U8Planar,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nvi-bridge",
    version = "0.1.0",
    about = "Receive and send bridge between a media host and an NVI transport"
)]
pub struct Config {
    /// Stream to receive, as site:alias (empty to stay idle)
    #[arg(long, env = "NVI_TARGET", default_value = "local:OBS")]
    pub target: String,

    /// Alias the output announces on the network
    #[arg(long, env = "NVI_SENDER_ALIAS", default_value = "OBS")]
    pub alias: String,

    /// Name of the receive bridge in logs and its thread name (defaults to the target)
    #[arg(long, env = "NVI_RECEIVER_NAME")]
    pub receiver_name: Option<String>,

    /// Metrics server port
    #[arg(long, env = "METRICS_PORT", default_value = "9003")]
    pub metrics_port: u16,

    /// Upper bound of one receive poll in milliseconds
    #[arg(long, default_value = "16")]
    pub poll_timeout_ms: u64,

    /// Receive loop sleep while not streaming, in milliseconds
    #[arg(long, default_value = "100")]
    pub idle_sleep_ms: u64,

    /// Delay before the first reconnection attempt in milliseconds
    #[arg(long, default_value = "1000")]
    pub backoff_initial_ms: u64,

    /// Maximum reconnection delay in milliseconds
    #[arg(long, default_value = "1000")]
    pub backoff_max_ms: u64,

    /// Reconnection backoff multiplier (1.0 keeps the delay fixed)
    #[arg(long, default_value = "1.0")]
    pub backoff_multiplier: f64,

    /// Discovery wait in milliseconds
    #[arg(long, default_value = "1500")]
    pub discovery_timeout_ms: u64,

    /// Maximum number of streams returned by discovery
    #[arg(long, default_value = "10")]
    pub discovery_capacity: usize,

    /// Demo output width
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Demo output height
    #[arg(long, default_value = "360")]
    pub height: u32,

    /// Demo output frame rate
    #[arg(long, default_value = "30")]
    pub fps: u32,

    /// Demo output sample rate
    #[arg(long, default_value = "48000")]
    pub sample_rate: u32,

    /// Demo output channel count
    #[arg(long, default_value = "2")]
    pub channels: usize,

    /// Demo output sample format
    #[arg(long, value_enum, default_value = "f32-planar")]
    pub audio_format: DemoSampleFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Minimum allowed port (ports below 1024 are privileged)
const MIN_USER_PORT: u16 = 1024;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.target.trim().is_empty() {
            self.target.parse::<StreamKey>()?;
        }

        Self::validate_port(self.metrics_port, "metrics")?;

        if self.poll_timeout_ms == 0 {
            anyhow::bail!("Poll timeout cannot be 0");
        }

        if self.idle_sleep_ms == 0 {
            anyhow::bail!("Idle sleep cannot be 0");
        }

        if self.backoff_multiplier < 1.0 {
            anyhow::bail!("Backoff multiplier must be >= 1.0");
        }

        if self.backoff_max_ms < self.backoff_initial_ms {
            anyhow::bail!(
                "Maximum backoff ({}ms) cannot be less than initial backoff ({}ms)",
                self.backoff_max_ms,
                self.backoff_initial_ms
            );
        }

        if self.discovery_capacity == 0 {
            anyhow::bail!("Discovery capacity cannot be 0");
        }

        if self.fps == 0 {
            anyhow::bail!("Frame rate cannot be 0");
        }

        if self.channels == 0 || self.channels > MAX_AUDIO_CHANNELS {
            anyhow::bail!(
                "Channel count must be between 1 and {}, got {}",
                MAX_AUDIO_CHANNELS,
                self.channels
            );
        }

        Ok(())
    }

    fn validate_port(port: u16, name: &str) -> anyhow::Result<()> {
        if port == 0 {
            anyhow::bail!("Invalid {} port: port cannot be 0", name);
        }
        if port < MIN_USER_PORT {
            anyhow::bail!(
                "Invalid {} port: {} is a privileged port (< {}). Use a port >= {}",
                name,
                port,
                MIN_USER_PORT,
                MIN_USER_PORT
            );
        }
        Ok(())
    }

    pub fn to_backoff_policy(&self) -> crate::domain::errors::Result<BackoffPolicy> {
        BackoffPolicy::new(
            Duration::from_millis(self.backoff_initial_ms),
            Duration::from_millis(self.backoff_max_ms),
            self.backoff_multiplier,
        )
    }

    pub fn to_receive_config(&self) -> crate::domain::errors::Result<ReceiveConfig> {
        let timing = LoopTiming::new(
            Duration::from_millis(self.poll_timeout_ms),
            Duration::from_millis(self.idle_sleep_ms),
            self.to_backoff_policy()?,
        )?;
        Ok(ReceiveConfig::new(self.receiver_name(), timing))
    }

    pub fn receiver_name(&self) -> String {
        match &self.receiver_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ if !self.target.trim().is_empty() => self.target.trim().to_string(),
            _ => "idle".to_string(),
        }
    }

    pub fn to_sender_config(&self) -> crate::domain::errors::Result<SenderConfig> {
        SenderConfig::new(self.alias.clone())
    }

    pub fn to_output_format(&self) -> crate::domain::errors::Result<OutputFormat> {
        let video = VideoOutputFormat {
            format: HostPixelFormat::I420,
            width: self.width,
            height: self.height,
            frame_rate: FrameRate {
                num: self.fps,
                den: 1,
            },
        };
        let audio = AudioOutputFormat {
            format: self.audio_format.into(),
            channels: self.channels,
            sample_rate: self.sample_rate,
            max_frames: self.audio_frames_per_video_frame(),
        };
        OutputFormat::new(Some(video), Some(audio))
    }

    /// Audio frames delivered alongside each demo video frame
    pub fn audio_frames_per_video_frame(&self) -> usize {
        (self.sample_rate / self.fps.max(1)) as usize
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}
