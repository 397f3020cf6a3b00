use crate::domain::errors::FormatError;
use crate::domain::media::HostSampleFormat;

/// A PCM sample type the converter can read from a byte plane
trait PlanarSample: Copy {
    const WIDTH: usize;

    fn read(bytes: &[u8]) -> Self;

    fn normalize(self) -> f32;
}

impl PlanarSample for u8 {
    const WIDTH: usize = 1;

    fn read(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn normalize(self) -> f32 {
        f32::from(self) / f32::from(u8::MAX)
    }
}

impl PlanarSample for i16 {
    const WIDTH: usize = 2;

    fn read(bytes: &[u8]) -> Self {
        i16::from_ne_bytes([bytes[0], bytes[1]])
    }

    fn normalize(self) -> f32 {
        // i16::MIN / i16::MAX is just below -1.0
        (f32::from(self) / f32::from(i16::MAX)).clamp(-1.0, 1.0)
    }
}

impl PlanarSample for f32 {
    const WIDTH: usize = 4;

    fn read(bytes: &[u8]) -> Self {
        f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn normalize(self) -> f32 {
        self
    }
}

/// Converts host planar PCM into the interleaved f32 layout the transport sends.
pub struct SampleFormatConverter;

impl SampleFormatConverter {
    /// Interleave `channels` planes of `frames` samples each into `out`.
    ///
    /// Returns the number of floats written (`frames * channels`). Only
    /// u8, i16 and f32 planar input is accepted.
    pub fn planar_to_interleaved(
        format: HostSampleFormat,
        planes: &[&[u8]],
        frames: usize,
        channels: usize,
        out: &mut [f32],
    ) -> Result<usize, FormatError> {
        match format {
            HostSampleFormat::U8Planar => interleave::<u8>(planes, frames, channels, out),
            HostSampleFormat::S16Planar => interleave::<i16>(planes, frames, channels, out),
            HostSampleFormat::FloatPlanar => interleave::<f32>(planes, frames, channels, out),
            other => Err(FormatError::UnsupportedSampleFormat(other.to_string())),
        }
    }

    pub fn supports(format: HostSampleFormat) -> bool {
        matches!(
            format,
            HostSampleFormat::U8Planar | HostSampleFormat::S16Planar | HostSampleFormat::FloatPlanar
        )
    }
}

fn interleave<T: PlanarSample>(
    planes: &[&[u8]],
    frames: usize,
    channels: usize,
    out: &mut [f32],
) -> Result<usize, FormatError> {
    let needed = frames.saturating_mul(channels);
    if needed > out.len() {
        return Err(FormatError::CapacityExceeded {
            needed,
            capacity: out.len(),
        });
    }

    if planes.len() < channels {
        return Err(FormatError::MissingPlane {
            layout: "planar audio",
            index: planes.len(),
        });
    }

    let plane_bytes = frames * T::WIDTH;
    for (channel, plane) in planes.iter().take(channels).enumerate() {
        if plane.len() < plane_bytes {
            return Err(FormatError::ShortPlane {
                channel,
                needed: plane_bytes,
                available: plane.len(),
            });
        }
    }

    for (channel, plane) in planes.iter().take(channels).enumerate() {
        for (frame, bytes) in plane.chunks_exact(T::WIDTH).take(frames).enumerate() {
            out[frame * channels + channel] = T::read(bytes).normalize();
        }
    }

    Ok(needed)
}
