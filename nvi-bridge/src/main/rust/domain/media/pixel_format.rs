use std::fmt;

/// Pack four ASCII characters into a transport FourCC code, first character in the high byte.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    ((code[0] as u32) << 24) | ((code[1] as u32) << 16) | ((code[2] as u32) << 8) | (code[3] as u32)
}

/// Pixel layouts in the transport's vocabulary, identified on the wire by FourCC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportPixelFormat {
    /// 4:2:0 planar, Y U V
    I420,
    /// 4:2:0 planar with alpha plane
    I420A,
    /// 4:2:0 semi-planar, Y then interleaved UV
    Nv12,
    Nv12A,
    /// 4:2:0 semi-planar, Y then interleaved VU
    Nv21,
    Nv21A,
    /// 4:2:2 planar, Y U V
    I422,
    I422A,
    P010Le,
    P010Be,
    I420P10Le,
    I420P10Be,
    I422P10Le,
    I422P10Be,
    V210,
    Mono,
}

impl TransportPixelFormat {
    const ALL: [Self; 16] = [
        Self::I420,
        Self::I420A,
        Self::Nv12,
        Self::Nv12A,
        Self::Nv21,
        Self::Nv21A,
        Self::I422,
        Self::I422A,
        Self::P010Le,
        Self::P010Be,
        Self::I420P10Le,
        Self::I420P10Be,
        Self::I422P10Le,
        Self::I422P10Be,
        Self::V210,
        Self::Mono,
    ];

    pub const fn fourcc(&self) -> u32 {
        match self {
            Self::I420 => fourcc(b"i420"),
            Self::I420A => fourcc(b"420a"),
            Self::Nv12 => fourcc(b"nv12"),
            Self::Nv12A => fourcc(b"y12a"),
            Self::Nv21 => fourcc(b"nv21"),
            Self::Nv21A => fourcc(b"y21a"),
            Self::I422 => fourcc(b"422p"),
            Self::I422A => fourcc(b"422a"),
            Self::P010Le => fourcc(b"010l"),
            Self::P010Be => fourcc(b"010b"),
            Self::I420P10Le => fourcc(b"i20l"),
            Self::I420P10Be => fourcc(b"i20b"),
            Self::I422P10Le => fourcc(b"p10l"),
            Self::I422P10Be => fourcc(b"p10b"),
            Self::V210 => fourcc(b"v210"),
            Self::Mono => fourcc(b"mono"),
        }
    }

    pub fn from_fourcc(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.fourcc() == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I420 => "I420",
            Self::I420A => "I420A",
            Self::Nv12 => "NV12",
            Self::Nv12A => "NV12A",
            Self::Nv21 => "NV21",
            Self::Nv21A => "NV21A",
            Self::I422 => "I422",
            Self::I422A => "I422A",
            Self::P010Le => "P010LE",
            Self::P010Be => "P010BE",
            Self::I420P10Le => "I420P10LE",
            Self::I420P10Be => "I420P10BE",
            Self::I422P10Le => "I422P10LE",
            Self::I422P10Be => "I422P10BE",
            Self::V210 => "V210",
            Self::Mono => "MONO",
        }
    }
}

impl fmt::Display for TransportPixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel layouts in the host application's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPixelFormat {
    I420,
    Nv12,
    I422,
    I444,
    Yvyu,
    Yuy2,
    Uyvy,
    Rgba,
    Bgra,
    Bgrx,
    Y800,
}

impl HostPixelFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I420 => "I420",
            Self::Nv12 => "NV12",
            Self::I422 => "I422",
            Self::I444 => "I444",
            Self::Yvyu => "YVYU",
            Self::Yuy2 => "YUY2",
            Self::Uyvy => "UYVY",
            Self::Rgba => "RGBA",
            Self::Bgra => "BGRA",
            Self::Bgrx => "BGRX",
            Self::Y800 => "Y800",
        }
    }
}

impl fmt::Display for HostPixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
