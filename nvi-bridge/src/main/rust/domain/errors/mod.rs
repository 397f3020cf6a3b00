use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid stream key: {0} (expected site:alias)")]
    InvalidStreamKey(String),

    #[error("Invalid backoff multiplier: must be >= 1.0")]
    InvalidBackoffMultiplier,

    #[error("Invalid backoff delays: max {max_ms}ms is below initial {initial_ms}ms")]
    InvalidBackoffDelays { initial_ms: u128, max_ms: u128 },

    #[error("Invalid loop timing: {0}")]
    InvalidTiming(String),

    #[error("Invalid output format: {0}")]
    InvalidOutputFormat(String),

    #[error("Output has neither video nor audio to send")]
    NothingToSend,

    #[error("Sender allocation failed: {0}")]
    SenderAllocationFailed(#[source] TransportError),

    #[error("Stream discovery failed: {0}")]
    DiscoveryFailed(#[source] TransportError),

    #[error("Failed to spawn receive thread: {0}")]
    ThreadSpawnFailed(String),

    #[error("Receive loop is not running")]
    BridgeNotRunning,
}

/// Failures reported by the transport SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("receiver allocation failed for {uri}: {reason}")]
    ReceiverAllocation { uri: String, reason: String },

    #[error("sender allocation failed: {0}")]
    SenderAllocation(String),

    #[error("poll failed with status {code}")]
    Poll { code: i32 },

    #[error("send failed with status {code}")]
    Send { code: i32 },

    #[error("stream enumeration failed with status {code}")]
    Enumerate { code: i32 },
}

/// Per-frame translation failures. The frame is dropped, the connection is not affected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unsupported transport pixel format {0:#010x}")]
    UnsupportedTransportPixelFormat(u32),

    #[error("unsupported host pixel format {0}")]
    UnsupportedHostPixelFormat(String),

    #[error("unsupported transport sample depth {0:#06x}")]
    UnsupportedSampleDepth(u16),

    #[error("unsupported host sample format {0}")]
    UnsupportedSampleFormat(String),

    #[error("unsupported channel count {0}")]
    UnsupportedChannelCount(u16),

    #[error("plane {index} missing for {layout}")]
    MissingPlane { layout: &'static str, index: usize },

    #[error("channel {channel} holds {available} bytes, {needed} required")]
    ShortPlane {
        channel: usize,
        needed: usize,
        available: usize,
    },

    #[error("audio buffer holds {available} bytes, {needed} required")]
    ShortBuffer { needed: usize, available: usize },

    #[error("{needed} samples exceed scratch capacity of {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("frame is {actual}, output was started as {negotiated}")]
    NotNegotiated { negotiated: String, actual: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
