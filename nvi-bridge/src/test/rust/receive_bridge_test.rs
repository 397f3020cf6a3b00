use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use nvi_bridge::domain::media::{
    codec, depth, ColorSpec, FrameRate, PlaneSet, SourceAudioFrame, SourceVideoFrame, TimeTick,
    TransportAudioFrame, TransportPixelFormat, TransportVideoFrame,
};
use nvi_bridge::{
    BackoffPolicy, BridgeContext, ConnectionState, DirectorySnapshot, FrameReceiver, FrameSender,
    FrameSink, LoopTiming, MediaKind, MetricsReporter, PolledFrames, ReceiveBridge, ReceiveConfig,
    SenderConfig, StreamDescriptor, StreamKey, Transport, TransportError,
};
use parking_lot::Mutex;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Step {
    Video(u32),
    Audio,
    Metadata,
    Error(i32),
}

#[derive(Default)]
struct Ledger {
    live: usize,
    max_live: usize,
    allocations: Vec<String>,
    releases: usize,
    failing: HashSet<String>,
    scripts: HashMap<String, VecDeque<Step>>,
}

#[derive(Clone, Default)]
struct ScriptedTransport {
    ledger: Arc<Mutex<Ledger>>,
}

impl ScriptedTransport {
    fn script(&self, uri: &str, steps: &[Step]) {
        self.ledger
            .lock()
            .scripts
            .entry(uri.to_string())
            .or_default()
            .extend(steps.iter().copied());
    }

    fn fail_allocations(&self, uri: &str, failing: bool) {
        let mut ledger = self.ledger.lock();
        if failing {
            ledger.failing.insert(uri.to_string());
        } else {
            ledger.failing.remove(uri);
        }
    }

    fn allocations(&self) -> Vec<String> {
        self.ledger.lock().allocations.clone()
    }

    fn live(&self) -> usize {
        self.ledger.lock().live
    }

    fn max_live(&self) -> usize {
        self.ledger.lock().max_live
    }

    fn releases(&self) -> usize {
        self.ledger.lock().releases
    }
}

impl Transport for ScriptedTransport {
    fn allocate_receiver(&self, uri: &str) -> Result<Box<dyn FrameReceiver>, TransportError> {
        let mut ledger = self.ledger.lock();
        if ledger.failing.contains(uri) {
            return Err(TransportError::ReceiverAllocation {
                uri: uri.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        ledger.live += 1;
        ledger.max_live = ledger.max_live.max(ledger.live);
        ledger.allocations.push(uri.to_string());

        Ok(Box::new(ScriptedReceiver {
            uri: uri.to_string(),
            ledger: Arc::clone(&self.ledger),
            pixels: vec![0; 16],
            samples: vec![0; 64],
            metadata: b"<ptz/>".to_vec(),
        }))
    }

    fn allocate_sender(
        &self,
        _config: &SenderConfig,
    ) -> Result<Arc<dyn FrameSender>, TransportError> {
        Err(TransportError::SenderAllocation("receive only".to_string()))
    }

    fn enumerate_streams(
        &self,
        _timeout: Duration,
        _capacity: usize,
    ) -> Result<Vec<StreamDescriptor>, TransportError> {
        Ok(Vec::new())
    }
}

struct ScriptedReceiver {
    uri: String,
    ledger: Arc<Mutex<Ledger>>,
    pixels: Vec<u8>,
    samples: Vec<u8>,
    metadata: Vec<u8>,
}

impl FrameReceiver for ScriptedReceiver {
    fn poll(&mut self, timeout: Duration) -> Result<PolledFrames<'_>, TransportError> {
        let step = self
            .ledger
            .lock()
            .scripts
            .get_mut(&self.uri)
            .and_then(VecDeque::pop_front);

        match step {
            None => {
                thread::sleep(timeout);
                Ok(PolledFrames::default())
            }
            Some(Step::Error(code)) => Err(TransportError::Poll { code }),
            Some(Step::Video(pixel_format)) => Ok(PolledFrames {
                video: Some(TransportVideoFrame {
                    pixel_format,
                    codec: codec::AVC,
                    width: 4,
                    height: 2,
                    frame_rate: FrameRate::default(),
                    color: ColorSpec::default(),
                    tick: TimeTick::default(),
                    time_us: 1_000,
                    planes: PlaneSet::new()
                        .with_plane(0, &self.pixels, 4)
                        .with_plane(1, &self.pixels[..4], 2)
                        .with_plane(2, &self.pixels[..4], 2),
                }),
                ..PolledFrames::default()
            }),
            Some(Step::Audio) => Ok(PolledFrames {
                audio: Some(TransportAudioFrame {
                    codec: codec::LPCM,
                    sample_rate: 48_000,
                    depth: depth::FLOAT_32,
                    channels: 2,
                    tick: TimeTick::default(),
                    time_us: 1_000,
                    samples: 8,
                    data: &self.samples,
                }),
                ..PolledFrames::default()
            }),
            Some(Step::Metadata) => Ok(PolledFrames {
                metadata: Some(&self.metadata),
                ..PolledFrames::default()
            }),
        }
    }
}

impl Drop for ScriptedReceiver {
    fn drop(&mut self) {
        let mut ledger = self.ledger.lock();
        ledger.live -= 1;
        ledger.releases += 1;
    }
}

// ---------------------------------------------------------------------------
// Recording host and metrics
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl FrameSink for RecordingSink {
    fn deliver_video(&mut self, frame: &SourceVideoFrame<'_>) {
        self.events.lock().push(format!("video {}", frame.format));
    }

    fn deliver_audio(&mut self, frame: &SourceAudioFrame<'_>) {
        self.events
            .lock()
            .push(format!("audio {}x{}", frame.frames, frame.speakers.channel_count()));
    }

    fn deliver_metadata(&mut self, metadata: &[u8]) {
        self.events
            .lock()
            .push(format!("metadata {}", String::from_utf8_lossy(metadata)));
    }
}

#[derive(Default)]
struct RecordingMetrics {
    states: Mutex<Vec<ConnectionState>>,
    reconnects: Mutex<u32>,
    backoffs_ms: Mutex<Vec<u64>>,
    dropped: Mutex<Vec<MediaKind>>,
}

impl RecordingMetrics {
    fn states(&self) -> Vec<ConnectionState> {
        self.states.lock().clone()
    }

    fn backoffs_ms(&self) -> Vec<u64> {
        self.backoffs_ms.lock().clone()
    }
}

impl MetricsReporter for RecordingMetrics {
    fn report_state_change(&self, state: ConnectionState) {
        self.states.lock().push(state);
    }

    fn report_reconnect_attempt(&self) {
        *self.reconnects.lock() += 1;
    }

    fn report_backoff(&self, delay_secs: f64) {
        self.backoffs_ms
            .lock()
            .push((delay_secs * 1000.0).round() as u64);
    }

    fn report_frame_delivered(&self, _kind: MediaKind) {}

    fn report_frame_dropped(&self, kind: MediaKind) {
        self.dropped.lock().push(kind);
    }

    fn report_frame_sent(&self, _kind: MediaKind) {}

    fn report_send_failure(&self, _kind: MediaKind) {}

    fn report_directory_size(&self, _streams: usize) {}

    fn report_uptime(&self, _uptime_secs: f64) {}
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    transport: ScriptedTransport,
    metrics: Arc<RecordingMetrics>,
    sink: RecordingSink,
    context: BridgeContext,
}

impl Harness {
    fn new() -> Self {
        let transport = ScriptedTransport::default();
        let metrics = Arc::new(RecordingMetrics::default());
        let context = BridgeContext::new(Arc::new(transport.clone()), metrics.clone());
        context.directory.publish(DirectorySnapshot::new(vec![
            StreamDescriptor::new("studioA", "cam1", "u1"),
            StreamDescriptor::new("studioA", "cam2", "u2"),
        ]));

        Self {
            transport,
            metrics,
            sink: RecordingSink::default(),
            context,
        }
    }

    fn start(&self, backoff: Duration) -> ReceiveBridge {
        self.start_with(BackoffPolicy::fixed(backoff))
    }

    fn start_with(&self, backoff: BackoffPolicy) -> ReceiveBridge {
        let timing =
            LoopTiming::new(Duration::from_millis(5), Duration::from_millis(10), backoff).unwrap();
        ReceiveBridge::start(
            &self.context,
            Box::new(self.sink.clone()),
            ReceiveConfig::new("test", timing),
        )
        .unwrap()
    }
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

const SHORT_BACKOFF: Duration = Duration::from_millis(40);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_reconnect_while_idle_streams_resolved_uri() {
    let harness = Harness::new();
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();

    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));
    assert_eq!(harness.transport.allocations(), vec!["u1"]);
    assert_eq!(
        harness.metrics.states(),
        vec![ConnectionState::Connecting, ConnectionState::Streaming]
    );

    bridge.stop();
}

#[test]
fn test_unresolvable_target_leaves_stream_alone() {
    let harness = Harness::new();
    let mut bridge = harness.start(SHORT_BACKOFF);
    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));

    bridge.reconnect(StreamKey::new("studioB", "cam9")).unwrap();
    thread::sleep(Duration::from_millis(100));

    assert_eq!(bridge.state(), ConnectionState::Streaming);
    assert_eq!(harness.transport.allocations(), vec!["u1"]);
    assert_eq!(harness.transport.releases(), 0);
    assert_eq!(harness.transport.live(), 1);

    bridge.stop();
}

#[test]
fn test_unresolvable_target_while_idle_stays_idle() {
    let harness = Harness::new();
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioB:cam9").unwrap();
    thread::sleep(Duration::from_millis(100));

    assert_eq!(bridge.state(), ConnectionState::Idle);
    assert!(harness.transport.allocations().is_empty());
    assert!(harness.metrics.states().is_empty());

    bridge.stop();
}

#[test]
fn test_poll_error_reconnects_with_new_handle() {
    let harness = Harness::new();
    harness.transport.script("u1", &[Step::Error(-1)]);
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();

    assert!(wait_until(|| harness.transport.allocations().len() == 2));
    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));
    assert_eq!(harness.transport.allocations(), vec!["u1", "u1"]);
    assert_eq!(harness.transport.releases(), 1);
    assert_eq!(harness.transport.live(), 1);
    assert_eq!(*harness.metrics.reconnects.lock(), 1);
    assert_eq!(
        harness.metrics.states(),
        vec![
            ConnectionState::Connecting,
            ConnectionState::Streaming,
            ConnectionState::Reconnecting,
            ConnectionState::Connecting,
            ConnectionState::Streaming,
        ]
    );

    bridge.stop();
}

#[test]
fn test_backoff_is_waited_before_reallocating() {
    let harness = Harness::new();
    harness.transport.script("u1", &[Step::Error(-1)]);
    let mut bridge = harness.start(Duration::from_millis(300));

    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Reconnecting));
    let failed_at = Instant::now();

    assert!(wait_until(|| harness.transport.allocations().len() == 2));
    assert!(failed_at.elapsed() >= Duration::from_millis(250));

    bridge.stop();
}

#[test]
fn test_unknown_pixel_format_is_dropped_without_state_change() {
    let harness = Harness::new();
    harness.transport.script(
        "u1",
        &[
            Step::Video(TransportPixelFormat::V210.fourcc()),
            Step::Video(TransportPixelFormat::I420.fourcc()),
        ],
    );
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();

    assert!(wait_until(|| !harness.sink.events().is_empty()));
    assert_eq!(harness.sink.events(), vec!["video I420"]);
    assert_eq!(*harness.metrics.dropped.lock(), vec![MediaKind::Video]);
    assert_eq!(bridge.state(), ConnectionState::Streaming);
    assert!(!harness
        .metrics
        .states()
        .contains(&ConnectionState::Reconnecting));

    bridge.stop();
}

#[test]
fn test_audio_and_metadata_are_forwarded_in_order() {
    let harness = Harness::new();
    harness
        .transport
        .script("u1", &[Step::Audio, Step::Metadata, Step::Audio]);
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();

    assert!(wait_until(|| harness.sink.events().len() == 3));
    assert_eq!(
        harness.sink.events(),
        vec!["audio 8x2", "metadata <ptz/>", "audio 8x2"]
    );

    bridge.stop();
}

#[test]
fn test_allocation_failure_from_command_returns_to_idle() {
    let harness = Harness::new();
    harness.transport.fail_allocations("u1", true);
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();

    assert!(wait_until(|| harness.metrics.states().len() == 2));
    assert_eq!(
        harness.metrics.states(),
        vec![ConnectionState::Connecting, ConnectionState::Idle]
    );
    thread::sleep(Duration::from_millis(100));
    assert_eq!(bridge.state(), ConnectionState::Idle);
    assert_eq!(harness.transport.live(), 0);

    bridge.stop();
}

#[test]
fn test_allocation_failure_on_retry_keeps_reconnecting() {
    let harness = Harness::new();
    harness.transport.script("u1", &[Step::Error(-1)]);
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Reconnecting));
    harness.transport.fail_allocations("u1", true);

    assert!(wait_until(|| *harness.metrics.reconnects.lock() >= 3));
    assert_eq!(harness.transport.live(), 0);
    assert!(!harness.metrics.states().contains(&ConnectionState::Idle));

    harness.transport.fail_allocations("u1", false);
    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));
    assert_eq!(harness.transport.live(), 1);

    bridge.stop();
}

#[test]
fn test_target_gone_after_poll_error_goes_idle() {
    let harness = Harness::new();
    harness.transport.script("u1", &[Step::Error(-1)]);
    let mut bridge = harness.start(Duration::from_millis(300));

    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Reconnecting));
    harness.context.directory.publish(DirectorySnapshot::empty());

    assert!(wait_until(|| bridge.state() == ConnectionState::Idle));
    assert_eq!(harness.transport.allocations(), vec!["u1"]);
    assert_eq!(harness.transport.live(), 0);

    bridge.stop();
}

#[test]
fn test_switching_streams_never_overlaps_handles() {
    let harness = Harness::new();
    let mut bridge = harness.start(SHORT_BACKOFF);

    bridge.set_target("studioA:cam1").unwrap();
    bridge.set_target("studioA:cam2").unwrap();
    bridge.set_target("studioA:cam1").unwrap();

    assert!(wait_until(|| harness.transport.allocations().len() == 3));
    assert_eq!(harness.transport.allocations(), vec!["u1", "u2", "u1"]);
    assert_eq!(harness.transport.max_live(), 1);
    assert_eq!(harness.transport.releases(), 2);

    bridge.stop();
}

#[test]
fn test_shutdown_is_bounded_and_releases_handle() {
    let harness = Harness::new();
    let mut bridge = ReceiveBridge::start(
        &harness.context,
        Box::new(harness.sink.clone()),
        ReceiveConfig::default(),
    )
    .unwrap();
    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));

    let bound = ReceiveConfig::default().timing().shutdown_bound();
    let started = Instant::now();
    bridge.stop();
    let elapsed = started.elapsed();

    assert!(
        elapsed < bound + Duration::from_millis(250),
        "shutdown took {:?}",
        elapsed
    );
    assert_eq!(bridge.state(), ConnectionState::Stopped);
    assert!(!bridge.is_running());
    assert_eq!(harness.transport.live(), 0);
    assert_eq!(harness.transport.releases(), 1);
    assert_eq!(
        harness.metrics.states().last(),
        Some(&ConnectionState::Stopped)
    );
}

#[test]
fn test_shutdown_during_backoff_is_bounded() {
    let harness = Harness::new();
    harness.transport.script("u1", &[Step::Error(-1)]);
    let mut bridge = harness.start(Duration::from_secs(10));

    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Reconnecting));

    let started = Instant::now();
    bridge.stop();

    assert!(started.elapsed() < Duration::from_millis(250));
    assert_eq!(bridge.state(), ConnectionState::Stopped);
}

#[test]
fn test_dropping_bridge_stops_thread() {
    let harness = Harness::new();
    let bridge = harness.start(SHORT_BACKOFF);
    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| harness.transport.live() == 1));

    drop(bridge);

    assert_eq!(harness.transport.live(), 0);
    assert_eq!(
        harness.metrics.states().last(),
        Some(&ConnectionState::Stopped)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_never_holds_two_receivers(targets in prop::collection::vec(0usize..3, 1..8)) {
        let harness = Harness::new();
        let mut bridge = harness.start(SHORT_BACKOFF);

        for target in &targets {
            let alias = ["cam1", "cam2", "missing"][*target];
            bridge.reconnect(StreamKey::new("studioA", alias)).unwrap();
        }
        bridge.stop();

        prop_assert!(harness.transport.max_live() <= 1);
        prop_assert_eq!(harness.transport.live(), 0);
        prop_assert_eq!(
            harness.transport.releases(),
            harness.transport.allocations().len()
        );
    }
}

#[test]
fn test_exponential_backoff_grows_and_resets() {
    let harness = Harness::new();
    let policy = BackoffPolicy::new(SHORT_BACKOFF, Duration::from_secs(1), 2.0).unwrap();
    let mut bridge = harness.start_with(policy);
    let backoffs = || harness.metrics.backoffs_ms();

    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));

    // consecutive retry failures double the delay
    harness.transport.fail_allocations("u1", true);
    harness.transport.script("u1", &[Step::Error(-1)]);
    assert!(wait_until(|| backoffs().len() == 3));
    harness.transport.fail_allocations("u1", false);
    assert!(wait_until(|| {
        harness.transport.allocations().len() == 2 && bridge.state() == ConnectionState::Streaming
    }));

    // a successful connect starts over from the initial delay
    harness.transport.fail_allocations("u1", true);
    harness.transport.script("u1", &[Step::Error(-1)]);
    assert!(wait_until(|| backoffs().len() == 5));

    // so does a new Reconnect command
    bridge.set_target("studioA:cam2").unwrap();
    assert!(wait_until(|| {
        harness.transport.allocations().last().map(String::as_str) == Some("u2")
            && bridge.state() == ConnectionState::Streaming
    }));
    harness.transport.script("u2", &[Step::Error(-1)]);
    assert!(wait_until(|| backoffs().len() == 6));

    assert_eq!(backoffs(), vec![40, 80, 160, 40, 80, 40]);
    bridge.stop();
    assert_eq!(harness.transport.live(), 0);
}

#[test]
fn test_huge_backoff_multiplier_saturates_without_killing_loop() {
    let harness = Harness::new();
    let policy = BackoffPolicy::new(SHORT_BACKOFF, Duration::from_millis(60), 1e20).unwrap();
    let mut bridge = harness.start_with(policy);

    bridge.set_target("studioA:cam1").unwrap();
    assert!(wait_until(|| bridge.state() == ConnectionState::Streaming));

    harness.transport.fail_allocations("u1", true);
    harness.transport.script("u1", &[Step::Error(-1)]);
    assert!(wait_until(|| harness.metrics.backoffs_ms().len() >= 3));
    assert_eq!(harness.metrics.backoffs_ms()[..3], [40, 60, 60]);
    assert!(bridge.is_running());

    bridge.stop();
    assert_eq!(bridge.state(), ConnectionState::Stopped);
}
