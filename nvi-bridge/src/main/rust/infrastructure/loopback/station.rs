use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::domain::errors::TransportError;
use crate::domain::media::{
    ColorSpec, FrameRate, PlaneSet, TimeTick, TransportAudioFrame, TransportVideoFrame, MAX_PLANES,
};
use crate::domain::ports::PolledFrames;

/// Frames kept per station for receivers that fall behind
const BACKLOG: usize = 8;

/// Status reported to receivers and senders once a station is torn down
pub const STATION_CLOSED: i32 = -1;

/// Video frame copied out of the sender's buffers
#[derive(Debug, Clone)]
pub(crate) struct OwnedVideo {
    pixel_format: u32,
    codec: u32,
    width: u32,
    height: u32,
    frame_rate: FrameRate,
    color: ColorSpec,
    tick: TimeTick,
    time_us: i64,
    planes: Vec<Vec<u8>>,
    strides: [u32; MAX_PLANES],
}

impl OwnedVideo {
    pub(crate) fn copy_of(frame: &TransportVideoFrame<'_>) -> Self {
        let mut strides = [0; MAX_PLANES];
        let planes = (0..MAX_PLANES)
            .map(|index| {
                strides[index] = frame.planes.stride(index);
                frame.planes.plane(index).to_vec()
            })
            .collect();

        Self {
            pixel_format: frame.pixel_format,
            codec: frame.codec,
            width: frame.width,
            height: frame.height,
            frame_rate: frame.frame_rate,
            color: frame.color,
            tick: frame.tick,
            time_us: frame.time_us,
            planes,
            strides,
        }
    }

    pub(crate) fn view(&self) -> TransportVideoFrame<'_> {
        let planes = self
            .planes
            .iter()
            .enumerate()
            .fold(PlaneSet::new(), |set, (index, plane)| {
                set.with_plane(index, plane, self.strides[index])
            });

        TransportVideoFrame {
            pixel_format: self.pixel_format,
            codec: self.codec,
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
            color: self.color,
            tick: self.tick,
            time_us: self.time_us,
            planes,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OwnedAudio {
    codec: u32,
    sample_rate: u32,
    depth: u16,
    channels: u16,
    tick: TimeTick,
    time_us: i64,
    samples: u32,
    data: Vec<u8>,
}

impl OwnedAudio {
    pub(crate) fn copy_of(frame: &TransportAudioFrame<'_>) -> Self {
        Self {
            codec: frame.codec,
            sample_rate: frame.sample_rate,
            depth: frame.depth,
            channels: frame.channels,
            tick: frame.tick,
            time_us: frame.time_us,
            samples: frame.samples,
            data: frame.data.to_vec(),
        }
    }

    pub(crate) fn view(&self) -> TransportAudioFrame<'_> {
        TransportAudioFrame {
            codec: self.codec,
            sample_rate: self.sample_rate,
            depth: self.depth,
            channels: self.channels,
            tick: self.tick,
            time_us: self.time_us,
            samples: self.samples,
            data: &self.data,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Payload {
    Video(OwnedVideo),
    Audio(OwnedAudio),
}

impl Payload {
    pub(crate) fn frames(&self) -> PolledFrames<'_> {
        match self {
            Self::Video(video) => PolledFrames {
                video: Some(video.view()),
                ..PolledFrames::default()
            },
            Self::Audio(audio) => PolledFrames {
                audio: Some(audio.view()),
                ..PolledFrames::default()
            },
        }
    }
}

#[derive(Debug, Default)]
struct StationState {
    next_seq: u64,
    backlog: VecDeque<(u64, Arc<Payload>)>,
    closed: bool,
}

/// Broadcast point between one sender and any number of receivers
#[derive(Debug)]
pub(crate) struct Station {
    alias: String,
    state: Mutex<StationState>,
    ready: Condvar,
}

impl Station {
    pub(crate) fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            state: Mutex::new(StationState {
                next_seq: 1,
                ..StationState::default()
            }),
            ready: Condvar::new(),
        }
    }

    pub(crate) fn alias(&self) -> &str {
        &self.alias
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn publish(&self, payload: Payload) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Send {
                code: STATION_CLOSED,
            });
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.backlog.push_back((seq, Arc::new(payload)));
        while state.backlog.len() > BACKLOG {
            state.backlog.pop_front();
        }
        drop(state);

        self.ready.notify_all();
        Ok(())
    }

    /// Oldest payload newer than `after`, waiting until `deadline` for one to arrive
    pub(crate) fn next_after(
        &self,
        after: u64,
        deadline: Instant,
    ) -> Result<Option<(u64, Arc<Payload>)>, TransportError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(TransportError::Poll {
                    code: STATION_CLOSED,
                });
            }

            if let Some((seq, payload)) = state.backlog.iter().find(|(seq, _)| *seq > after) {
                return Ok(Some((*seq, Arc::clone(payload))));
            }

            if self.ready.wait_until(&mut state, deadline).timed_out() {
                return Ok(None);
            }
        }
    }

    pub(crate) fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }
}
