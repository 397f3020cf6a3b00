mod frame_sink;
mod metrics_reporter;
mod transport;

pub use frame_sink::FrameSink;
pub use metrics_reporter::{MediaKind, MetricsReporter, NoopReporter};
pub use transport::{FrameReceiver, FrameSender, PolledFrames, Transport};
