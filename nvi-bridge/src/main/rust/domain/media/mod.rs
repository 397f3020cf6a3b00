pub mod frames;
mod pixel_format;
mod sample_format;

pub use frames::{
    ColorMatrix, ColorRange, ColorSpec, FrameRate, HostAudioFrame, HostVideoFrame, PlaneSet,
    SourceAudioFrame, SourceVideoFrame, TimeTick, TransportAudioFrame, TransportVideoFrame,
    MAX_PLANES,
};
pub use pixel_format::{fourcc, HostPixelFormat, TransportPixelFormat};
pub use sample_format::{codec, depth, HostSampleFormat, SpeakerLayout};
