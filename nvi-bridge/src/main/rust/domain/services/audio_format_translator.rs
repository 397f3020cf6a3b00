use crate::domain::errors::FormatError;
use crate::domain::media::{depth, HostSampleFormat, SourceAudioFrame, SpeakerLayout, TransportAudioFrame};

/// Maps received transport PCM onto host interleaved audio.
///
/// All channels of the interleaved buffer are forwarded; the host picks the
/// speaker layout from the channel count.
pub struct AudioFormatTranslator;

impl AudioFormatTranslator {
    pub fn host_format(raw_depth: u16) -> Option<HostSampleFormat> {
        let little_endian = cfg!(target_endian = "little");
        match raw_depth {
            depth::BITS_8 => Some(HostSampleFormat::U8),
            depth::BITS_16 => Some(HostSampleFormat::S16),
            depth::FLOAT_32 => Some(HostSampleFormat::Float),
            depth::BITS_16_LE if little_endian => Some(HostSampleFormat::S16),
            depth::FLOAT_32_LE if little_endian => Some(HostSampleFormat::Float),
            depth::BITS_16_BE if !little_endian => Some(HostSampleFormat::S16),
            depth::FLOAT_32_BE if !little_endian => Some(HostSampleFormat::Float),
            _ => None,
        }
    }

    pub fn to_source_frame<'a>(
        frame: &TransportAudioFrame<'a>,
    ) -> Result<SourceAudioFrame<'a>, FormatError> {
        let format = Self::host_format(frame.depth)
            .ok_or(FormatError::UnsupportedSampleDepth(frame.depth))?;
        let speakers = SpeakerLayout::from_channel_count(frame.channels)
            .ok_or(FormatError::UnsupportedChannelCount(frame.channels))?;

        let needed = frame.samples as usize * usize::from(frame.channels) * format.bytes_per_sample();
        if frame.data.len() < needed {
            return Err(FormatError::ShortBuffer {
                needed,
                available: frame.data.len(),
            });
        }

        Ok(SourceAudioFrame {
            speakers,
            sample_rate: frame.sample_rate,
            format,
            data: &frame.data[..needed],
            frames: frame.samples,
            timestamp_ns: u64::try_from(frame.time_us)
                .unwrap_or(0)
                .saturating_mul(1_000),
        })
    }
}
