//! Borrowed frame views exchanged with the transport and the host.
//!
//! None of these own pixel or sample memory. Receive-side views borrow from the
//! receiver that produced them and end with the next poll; send-side views
//! borrow from the host callback arguments.

use super::{HostPixelFormat, HostSampleFormat, SpeakerLayout};

pub const MAX_PLANES: usize = 4;

/// Plane slices and their strides, passed through translation untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneSet<'a> {
    planes: [&'a [u8]; MAX_PLANES],
    strides: [u32; MAX_PLANES],
}

impl<'a> PlaneSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set plane `index`; indices at or beyond `MAX_PLANES` are ignored
    pub fn with_plane(mut self, index: usize, data: &'a [u8], stride: u32) -> Self {
        if index < MAX_PLANES {
            self.planes[index] = data;
            self.strides[index] = stride;
        }
        self
    }

    pub fn plane(&self, index: usize) -> &'a [u8] {
        self.planes.get(index).copied().unwrap_or_default()
    }

    pub fn stride(&self, index: usize) -> u32 {
        self.strides.get(index).copied().unwrap_or_default()
    }

    pub fn has_plane(&self, index: usize) -> bool {
        !self.plane(index).is_empty()
    }

    /// Keep only the first `count` planes
    pub fn truncated(&self, count: usize) -> Self {
        let mut kept = Self::default();
        for index in 0..count.min(MAX_PLANES) {
            kept.planes[index] = self.planes[index];
            kept.strides[index] = self.strides[index];
        }
        kept
    }
}

/// Start tick of a frame in units of `freq_num / freq_den` seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeTick {
    pub value: u64,
    pub freq_num: u32,
    pub freq_den: u32,
}

impl TimeTick {
    pub const VIDEO_CLOCK: u32 = 90_000;

    pub fn new(value: u64, freq_num: u32, freq_den: u32) -> Self {
        Self {
            value,
            freq_num,
            freq_den,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl Default for FrameRate {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMatrix {
    Bt601,
    #[default]
    Bt709,
    Bt2020,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorRange {
    #[default]
    Limited,
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorSpec {
    pub matrix: ColorMatrix,
    pub range: ColorRange,
}

impl ColorSpec {
    pub const BT709_FULL: Self = Self {
        matrix: ColorMatrix::Bt709,
        range: ColorRange::Full,
    };

    pub const BT709_LIMITED: Self = Self {
        matrix: ColorMatrix::Bt709,
        range: ColorRange::Limited,
    };
}

/// Decoded video image as seen by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportVideoFrame<'a> {
    /// Pixel layout FourCC, possibly one this crate does not know
    pub pixel_format: u32,
    pub codec: u32,
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    pub color: ColorSpec,
    pub tick: TimeTick,
    /// Capture time in microseconds
    pub time_us: i64,
    pub planes: PlaneSet<'a>,
}

/// Interleaved PCM audio as seen by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportAudioFrame<'a> {
    pub codec: u32,
    pub sample_rate: u32,
    /// Raw depth code, see [`super::sample_format::depth`]
    pub depth: u16,
    pub channels: u16,
    pub tick: TimeTick,
    pub time_us: i64,
    /// Samples per channel
    pub samples: u32,
    pub data: &'a [u8],
}

/// Video handed to the send bridge by the host's video thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostVideoFrame<'a> {
    pub format: HostPixelFormat,
    pub width: u32,
    pub height: u32,
    pub planes: PlaneSet<'a>,
    pub timestamp_ns: u64,
}

/// Planar audio handed to the send bridge by the host's audio thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostAudioFrame<'a> {
    pub format: HostSampleFormat,
    pub channels: usize,
    pub sample_rate: u32,
    /// One slice per channel
    pub planes: &'a [&'a [u8]],
    /// Samples per channel
    pub frames: usize,
    pub timestamp_ns: u64,
}

/// Video delivered to the host by the receive loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceVideoFrame<'a> {
    pub format: HostPixelFormat,
    pub width: u32,
    pub height: u32,
    pub planes: PlaneSet<'a>,
    pub color: ColorSpec,
    pub timestamp_ns: u64,
}

/// Interleaved audio delivered to the host by the receive loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceAudioFrame<'a> {
    pub speakers: SpeakerLayout,
    pub sample_rate: u32,
    pub format: HostSampleFormat,
    pub data: &'a [u8],
    pub frames: u32,
    pub timestamp_ns: u64,
}
