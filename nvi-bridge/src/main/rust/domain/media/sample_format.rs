use std::fmt;

/// Sample formats in the host application's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSampleFormat {
    U8,
    S16,
    S32,
    Float,
    U8Planar,
    S16Planar,
    S32Planar,
    FloatPlanar,
}

impl HostSampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::U8 | Self::U8Planar => 1,
            Self::S16 | Self::S16Planar => 2,
            Self::S32 | Self::S32Planar | Self::Float | Self::FloatPlanar => 4,
        }
    }

    pub fn is_planar(&self) -> bool {
        matches!(
            self,
            Self::U8Planar | Self::S16Planar | Self::S32Planar | Self::FloatPlanar
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::Float => "f32",
            Self::U8Planar => "u8-planar",
            Self::S16Planar => "s16-planar",
            Self::S32Planar => "s32-planar",
            Self::FloatPlanar => "f32-planar",
        }
    }
}

impl fmt::Display for HostSampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw sample depth codes used by the transport for PCM audio.
pub mod depth {
    pub const BITS_8: u16 = 0x0008;
    pub const BITS_16: u16 = 0x0010;
    pub const BITS_24: u16 = 0x0018;
    pub const FLOAT_32: u16 = 0x0020;
    pub const LITTLE_ENDIAN: u16 = 0x0100;
    pub const BIG_ENDIAN: u16 = 0x0200;
    pub const BITS_16_LE: u16 = BITS_16 | LITTLE_ENDIAN;
    pub const BITS_24_LE: u16 = BITS_24 | LITTLE_ENDIAN;
    pub const FLOAT_32_LE: u16 = FLOAT_32 | LITTLE_ENDIAN;
    pub const BITS_16_BE: u16 = BITS_16 | BIG_ENDIAN;
    pub const BITS_24_BE: u16 = BITS_24 | BIG_ENDIAN;
    pub const FLOAT_32_BE: u16 = FLOAT_32 | BIG_ENDIAN;
}

/// Codec tags carried in transport frame descriptors
pub mod codec {
    use crate::domain::media::pixel_format::fourcc;

    pub const AVC: u32 = fourcc(b"h264");
    pub const LPCM: u32 = fourcc(b"lpcm");
}

/// Host speaker arrangements selectable from a channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakerLayout {
    Mono,
    Stereo,
    TwoPointOne,
    FourPointZero,
    FourPointOne,
    FivePointOne,
    SevenPointOne,
}

impl SpeakerLayout {
    pub fn from_channel_count(channels: u16) -> Option<Self> {
        match channels {
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            3 => Some(Self::TwoPointOne),
            4 => Some(Self::FourPointZero),
            5 => Some(Self::FourPointOne),
            6 => Some(Self::FivePointOne),
            8 => Some(Self::SevenPointOne),
            _ => None,
        }
    }

    pub fn channel_count(&self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::TwoPointOne => 3,
            Self::FourPointZero => 4,
            Self::FourPointOne => 5,
            Self::FivePointOne => 6,
            Self::SevenPointOne => 8,
        }
    }
}
