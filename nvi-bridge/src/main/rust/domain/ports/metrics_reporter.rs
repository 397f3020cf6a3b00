use crate::domain::value_objects::ConnectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Metadata,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Metadata => "metadata",
        }
    }
}

/// Port for metrics reporting
pub trait MetricsReporter: Send + Sync {
    fn report_state_change(&self, state: ConnectionState);
    fn report_reconnect_attempt(&self);
    fn report_backoff(&self, delay_secs: f64);
    fn report_frame_delivered(&self, kind: MediaKind);
    fn report_frame_dropped(&self, kind: MediaKind);
    fn report_frame_sent(&self, kind: MediaKind);
    fn report_send_failure(&self, kind: MediaKind);
    fn report_directory_size(&self, streams: usize);
    fn report_uptime(&self, uptime_secs: f64);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl MetricsReporter for NoopReporter {
    fn report_state_change(&self, _state: ConnectionState) {}
    fn report_reconnect_attempt(&self) {}
    fn report_backoff(&self, _delay_secs: f64) {}
    fn report_frame_delivered(&self, _kind: MediaKind) {}
    fn report_frame_dropped(&self, _kind: MediaKind) {}
    fn report_frame_sent(&self, _kind: MediaKind) {}
    fn report_send_failure(&self, _kind: MediaKind) {}
    fn report_directory_size(&self, _streams: usize) {}
    fn report_uptime(&self, _uptime_secs: f64) {}
}
