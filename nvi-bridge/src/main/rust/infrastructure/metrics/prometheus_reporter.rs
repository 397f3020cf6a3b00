use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::domain::ports::{MediaKind, MetricsReporter};
use crate::domain::value_objects::ConnectionState;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Receive state (0=Idle, 1=Connecting, 2=Streaming, 3=Reconnecting, 4=Stopped)
    pub static ref CONNECTION_STATE: Gauge = Gauge::new(
        "nvi_receive_connection_state",
        "Current receive connection state"
    ).expect("metric can be created");

    pub static ref RECONNECT_ATTEMPTS: IntCounter = IntCounter::new(
        "nvi_reconnect_attempts_total",
        "Total number of receiver reconnection attempts"
    ).expect("metric can be created");

    pub static ref BACKOFF_SECONDS: Gauge = Gauge::new(
        "nvi_reconnect_backoff_seconds",
        "Current reconnection backoff delay"
    ).expect("metric can be created");

    pub static ref UPTIME_SECONDS: Gauge = Gauge::new(
        "nvi_receive_uptime_seconds",
        "Time since the receiver started streaming"
    ).expect("metric can be created");

    pub static ref FRAMES_DELIVERED: IntCounterVec = IntCounterVec::new(
        Opts::new("nvi_frames_delivered_total", "Received frames handed to the host"),
        &["kind"]
    ).expect("metric can be created");

    pub static ref FRAMES_DROPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("nvi_frames_dropped_total", "Frames dropped for an unsupported format"),
        &["kind"]
    ).expect("metric can be created");

    pub static ref FRAMES_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new("nvi_frames_sent_total", "Host frames published on the transport"),
        &["kind"]
    ).expect("metric can be created");

    pub static ref SEND_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("nvi_send_failures_total", "Transport send calls that reported failure"),
        &["kind"]
    ).expect("metric can be created");

    pub static ref DIRECTORY_STREAMS: IntGauge = IntGauge::new(
        "nvi_directory_streams",
        "Streams in the latest discovery snapshot"
    ).expect("metric can be created");
}

pub struct PrometheusReporter;

impl PrometheusReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn init_metrics() -> Result<(), prometheus::Error> {
        REGISTRY.register(Box::new(CONNECTION_STATE.clone()))?;
        REGISTRY.register(Box::new(RECONNECT_ATTEMPTS.clone()))?;
        REGISTRY.register(Box::new(BACKOFF_SECONDS.clone()))?;
        REGISTRY.register(Box::new(UPTIME_SECONDS.clone()))?;
        REGISTRY.register(Box::new(FRAMES_DELIVERED.clone()))?;
        REGISTRY.register(Box::new(FRAMES_DROPPED.clone()))?;
        REGISTRY.register(Box::new(FRAMES_SENT.clone()))?;
        REGISTRY.register(Box::new(SEND_FAILURES.clone()))?;
        REGISTRY.register(Box::new(DIRECTORY_STREAMS.clone()))?;
        Ok(())
    }

    pub fn gather_metrics() -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = REGISTRY.gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return b"# Error encoding metrics\n".to_vec();
        }
        buffer
    }
}

impl Default for PrometheusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsReporter for PrometheusReporter {
    fn report_state_change(&self, state: ConnectionState) {
        CONNECTION_STATE.set(state.as_metric());
        if !state.is_streaming() {
            UPTIME_SECONDS.set(0.0);
        }
    }

    fn report_reconnect_attempt(&self) {
        RECONNECT_ATTEMPTS.inc();
    }

    fn report_backoff(&self, delay_secs: f64) {
        BACKOFF_SECONDS.set(delay_secs);
    }

    fn report_frame_delivered(&self, kind: MediaKind) {
        FRAMES_DELIVERED.with_label_values(&[kind.as_str()]).inc();
    }

    fn report_frame_dropped(&self, kind: MediaKind) {
        FRAMES_DROPPED.with_label_values(&[kind.as_str()]).inc();
    }

    fn report_frame_sent(&self, kind: MediaKind) {
        FRAMES_SENT.with_label_values(&[kind.as_str()]).inc();
    }

    fn report_send_failure(&self, kind: MediaKind) {
        SEND_FAILURES.with_label_values(&[kind.as_str()]).inc();
    }

    fn report_directory_size(&self, streams: usize) {
        DIRECTORY_STREAMS.set(i64::try_from(streams).unwrap_or(i64::MAX));
    }

    fn report_uptime(&self, uptime_secs: f64) {
        UPTIME_SECONDS.set(uptime_secs);
    }
}
