use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{BridgeContext, Command, CommandReceiver, StreamDirectory};
use crate::domain::entities::ConnectionLifecycle;
use crate::domain::errors::TransportError;
use crate::domain::ports::{
    FrameReceiver, FrameSink, MediaKind, MetricsReporter, PolledFrames, Transport,
};
use crate::domain::services::{AudioFormatTranslator, PixelFormatTranslator};
use crate::domain::value_objects::{ConnectionState, LoopTiming, StreamDescriptor, StreamKey};

/// Where an allocation attempt came from, which decides where a failure lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// A Reconnect command: failure goes back to Idle
    Requested,
    /// The backoff expired: failure schedules another backoff
    Retry,
}

/// Body of one receive thread.
///
/// Owns the receiver handle, the connection state machine and the host sink.
/// Nothing here is shared with other threads except the published state byte.
pub(crate) struct ReceiveLoop {
    name: String,
    timing: LoopTiming,
    transport: Arc<dyn Transport>,
    directory: Arc<StreamDirectory>,
    metrics: Arc<dyn MetricsReporter>,
    commands: CommandReceiver,
    sink: Box<dyn FrameSink>,
    receiver: Option<Box<dyn FrameReceiver>>,
    target: Option<StreamKey>,
    lifecycle: ConnectionLifecycle,
    published: Arc<AtomicU8>,
    current_backoff: Duration,
    retry_at: Option<Instant>,
}

impl ReceiveLoop {
    pub(crate) fn new(
        name: String,
        timing: LoopTiming,
        context: &BridgeContext,
        commands: CommandReceiver,
        sink: Box<dyn FrameSink>,
        published: Arc<AtomicU8>,
    ) -> Self {
        let current_backoff = timing.backoff().initial_delay();
        Self {
            name,
            timing,
            transport: Arc::clone(&context.transport),
            directory: Arc::clone(&context.directory),
            metrics: Arc::clone(&context.metrics),
            commands,
            sink,
            receiver: None,
            target: None,
            lifecycle: ConnectionLifecycle::new(),
            published,
            current_backoff,
            retry_at: None,
        }
    }

    pub(crate) fn run(mut self) {
        tracing::info!(bridge = %self.name, "Receive loop started");

        loop {
            match self.commands.try_dequeue() {
                Some(Command::Reconnect(key)) => self.handle_reconnect(key),
                Some(Command::Shutdown) => break,
                None => {}
            }

            match self.lifecycle.current_state() {
                ConnectionState::Streaming => self.poll_once(),
                ConnectionState::Reconnecting => self.wait_for_retry(),
                _ => thread::sleep(self.timing.idle_sleep()),
            }
        }

        self.transition(ConnectionState::Stopped, Some("shutdown requested".to_string()));
        // last thing the thread does
        self.release_receiver();
        tracing::info!(bridge = %self.name, "Receive loop stopped");
    }

    fn handle_reconnect(&mut self, key: StreamKey) {
        let Some(descriptor) = self.directory.resolve(&key) else {
            tracing::debug!(
                bridge = %self.name,
                target = %key,
                "Reconnect target not in stream directory, ignoring"
            );
            return;
        };

        tracing::debug!(
            bridge = %self.name,
            target = %key,
            uri = %descriptor.uri,
            "Reconnect requested"
        );
        self.target = Some(key);
        self.retry_at = None;
        self.current_backoff = self.timing.backoff().initial_delay();

        // never hold two handles at once
        self.release_receiver();
        self.connect(&descriptor, Attempt::Requested);
    }

    fn connect(&mut self, descriptor: &StreamDescriptor, attempt: Attempt) {
        if !self.transition(ConnectionState::Connecting, Some(descriptor.key().to_string())) {
            return;
        }

        match self.transport.allocate_receiver(&descriptor.uri) {
            Ok(receiver) => {
                self.receiver = Some(receiver);
                self.current_backoff = self.timing.backoff().initial_delay();
                self.transition(ConnectionState::Streaming, None);
            }
            Err(e) => {
                tracing::warn!(
                    bridge = %self.name,
                    target = %descriptor.key(),
                    error = %e,
                    "Receiver allocation failed"
                );
                match attempt {
                    Attempt::Requested => {
                        self.transition(ConnectionState::Idle, Some(e.to_string()));
                    }
                    Attempt::Retry => self.enter_backoff(e.to_string()),
                }
            }
        }
    }

    fn poll_once(&mut self) {
        if self.receiver.is_none() {
            self.enter_backoff("streaming without a receiver".to_string());
            return;
        }

        let timeout = self.timing.poll_timeout();
        let failure: Option<TransportError> = match self.receiver.as_mut() {
            Some(receiver) => match receiver.poll(timeout) {
                Ok(frames) => {
                    forward_frames(&frames, &mut *self.sink, &*self.metrics);
                    None
                }
                Err(e) => Some(e),
            },
            None => None,
        };

        match failure {
            Some(e) => {
                tracing::warn!(bridge = %self.name, error = %e, "Poll failed, releasing receiver");
                self.release_receiver();
                self.enter_backoff(e.to_string());
            }
            None => {
                if let Some(uptime) = self.lifecycle.uptime() {
                    self.metrics.report_uptime(uptime.as_secs_f64());
                }
            }
        }
    }

    fn enter_backoff(&mut self, reason: String) {
        if !self.transition(ConnectionState::Reconnecting, Some(reason)) {
            return;
        }

        let delay = self.current_backoff;
        self.retry_at = Some(Instant::now() + delay);
        self.current_backoff = self.timing.backoff().next_delay(delay);

        self.metrics.report_reconnect_attempt();
        self.metrics.report_backoff(delay.as_secs_f64());
        tracing::info!(
            bridge = %self.name,
            delay_ms = delay.as_millis() as u64,
            attempt = self.lifecycle.consecutive_failures(),
            "Reconnecting after backoff"
        );
    }

    /// Sleep at most one idle slice so commands keep being observed during backoff
    fn wait_for_retry(&mut self) {
        let now = Instant::now();
        if let Some(retry_at) = self.retry_at {
            if now < retry_at {
                thread::sleep(self.timing.idle_sleep().min(retry_at - now));
                return;
            }
        }
        self.retry_at = None;

        let descriptor = self
            .target
            .as_ref()
            .and_then(|key| self.directory.resolve(key));

        match descriptor {
            Some(descriptor) => self.connect(&descriptor, Attempt::Retry),
            None => {
                self.current_backoff = self.timing.backoff().initial_delay();
                self.transition(
                    ConnectionState::Idle,
                    Some("target no longer in stream directory".to_string()),
                );
            }
        }
    }

    fn release_receiver(&mut self) {
        if self.receiver.take().is_some() {
            tracing::debug!(bridge = %self.name, "Receiver released");
        }
    }

    fn transition(&mut self, to: ConnectionState, reason: Option<String>) -> bool {
        let from = self.lifecycle.current_state();
        let moved = match to {
            ConnectionState::Idle => self.lifecycle.transition_to_idle(reason),
            ConnectionState::Connecting => self.lifecycle.transition_to_connecting(reason),
            ConnectionState::Streaming => self.lifecycle.transition_to_streaming(),
            ConnectionState::Reconnecting => self.lifecycle.transition_to_reconnecting(reason),
            ConnectionState::Stopped => self.lifecycle.transition_to_stopped(reason),
        };

        if moved {
            self.published.store(to.as_u8(), Ordering::Release);
            self.metrics.report_state_change(to);
            tracing::info!(bridge = %self.name, from = %from, state = %to, "Receive state changed");
        }
        moved
    }
}

/// Translate and hand one poll's payloads to the host, video then audio then metadata
fn forward_frames(
    frames: &PolledFrames<'_>,
    sink: &mut dyn FrameSink,
    metrics: &dyn MetricsReporter,
) {
    if let Some(video) = &frames.video {
        match PixelFormatTranslator::to_source_frame(video) {
            Ok(frame) => {
                sink.deliver_video(&frame);
                metrics.report_frame_delivered(MediaKind::Video);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping received video frame");
                metrics.report_frame_dropped(MediaKind::Video);
            }
        }
    }

    if let Some(audio) = &frames.audio {
        match AudioFormatTranslator::to_source_frame(audio) {
            Ok(frame) => {
                sink.deliver_audio(&frame);
                metrics.report_frame_delivered(MediaKind::Audio);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping received audio frame");
                metrics.report_frame_dropped(MediaKind::Audio);
            }
        }
    }

    if let Some(metadata) = frames.metadata {
        sink.deliver_metadata(metadata);
        metrics.report_frame_delivered(MediaKind::Metadata);
    }
}
