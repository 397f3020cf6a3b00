mod backoff_policy;
mod connection_state;
mod output_format;
mod receive_config;
mod stream_descriptor;
mod stream_key;

pub use backoff_policy::BackoffPolicy;
pub use connection_state::ConnectionState;
pub use output_format::{
    AudioOutputFormat, OutputFormat, SenderConfig, VideoOutputFormat, MAX_AUDIO_CHANNELS,
};
pub use receive_config::{LoopTiming, ReceiveConfig, DEFAULT_IDLE_SLEEP, DEFAULT_POLL_TIMEOUT};
pub use stream_descriptor::StreamDescriptor;
pub use stream_key::StreamKey;
