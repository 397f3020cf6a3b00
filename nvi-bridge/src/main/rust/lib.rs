pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-exports for convenience
pub use application::services::{
    AudioOutput, BridgeContext, Command, ReceiveBridge, SendBridge, StreamDirectory, VideoOutput,
};
pub use config::Config;
pub use domain::entities::{ConnectionLifecycle, DirectorySnapshot, StateTransition};
pub use domain::errors::{DomainError, FormatError, Result, TransportError};
pub use domain::ports::{
    FrameReceiver, FrameSender, FrameSink, MediaKind, MetricsReporter, NoopReporter, PolledFrames,
    Transport,
};
pub use domain::services::{AudioFormatTranslator, PixelFormatTranslator, SampleFormatConverter};
pub use domain::value_objects::{
    BackoffPolicy, ConnectionState, LoopTiming, OutputFormat, ReceiveConfig, SenderConfig,
    StreamDescriptor, StreamKey,
};
pub use infrastructure::host::{LoggingSink, TestPattern, ToneGenerator};
pub use infrastructure::loopback::LoopbackTransport;
pub use infrastructure::metrics::{serve_metrics, PrometheusReporter};
