use crate::domain::errors::FormatError;
use crate::domain::media::{
    codec, ColorSpec, FrameRate, HostPixelFormat, HostVideoFrame, SourceVideoFrame, TimeTick,
    TransportPixelFormat, TransportVideoFrame,
};

struct LayoutMapping {
    transport: TransportPixelFormat,
    host: HostPixelFormat,
    planes: usize,
}

const LAYOUTS: [LayoutMapping; 3] = [
    LayoutMapping {
        transport: TransportPixelFormat::I420,
        host: HostPixelFormat::I420,
        planes: 3,
    },
    LayoutMapping {
        transport: TransportPixelFormat::I422,
        host: HostPixelFormat::I422,
        planes: 3,
    },
    LayoutMapping {
        transport: TransportPixelFormat::Nv12,
        host: HostPixelFormat::Nv12,
        planes: 2,
    },
];

/// Maps pixel layouts between transport and host vocabularies.
///
/// Plane slices and strides are carried over as-is; nothing is copied.
pub struct PixelFormatTranslator;

impl PixelFormatTranslator {
    pub fn host_format(format: TransportPixelFormat) -> Option<HostPixelFormat> {
        LAYOUTS
            .iter()
            .find(|mapping| mapping.transport == format)
            .map(|mapping| mapping.host)
    }

    pub fn transport_format(format: HostPixelFormat) -> Option<TransportPixelFormat> {
        LAYOUTS
            .iter()
            .find(|mapping| mapping.host == format)
            .map(|mapping| mapping.transport)
    }

    /// Translate a received transport image into a frame the host can display
    pub fn to_source_frame<'a>(
        frame: &TransportVideoFrame<'a>,
    ) -> Result<SourceVideoFrame<'a>, FormatError> {
        let mapping = TransportPixelFormat::from_fourcc(frame.pixel_format)
            .and_then(|format| LAYOUTS.iter().find(|mapping| mapping.transport == format))
            .ok_or(FormatError::UnsupportedTransportPixelFormat(frame.pixel_format))?;

        Self::require_planes(mapping, |index| frame.planes.has_plane(index))?;

        Ok(SourceVideoFrame {
            format: mapping.host,
            width: frame.width,
            height: frame.height,
            planes: frame.planes.truncated(mapping.planes),
            // the transport carries no BT.601, and the host has no BT.2020
            color: ColorSpec::BT709_FULL,
            timestamp_ns: u64::try_from(frame.time_us)
                .unwrap_or(0)
                .saturating_mul(1_000),
        })
    }

    /// Translate a host image into a transport descriptor ready to send
    pub fn to_transport_frame<'a>(
        frame: &HostVideoFrame<'a>,
        frame_rate: FrameRate,
    ) -> Result<TransportVideoFrame<'a>, FormatError> {
        let mapping = LAYOUTS
            .iter()
            .find(|mapping| mapping.host == frame.format)
            .ok_or_else(|| FormatError::UnsupportedHostPixelFormat(frame.format.to_string()))?;

        Self::require_planes(mapping, |index| frame.planes.has_plane(index))?;

        let ticks = u128::from(frame.timestamp_ns) * u128::from(TimeTick::VIDEO_CLOCK)
            / 1_000_000_000;

        Ok(TransportVideoFrame {
            pixel_format: mapping.transport.fourcc(),
            codec: codec::AVC,
            width: frame.width,
            height: frame.height,
            frame_rate,
            color: ColorSpec::BT709_LIMITED,
            tick: TimeTick::new(
                u64::try_from(ticks).unwrap_or(u64::MAX),
                1,
                TimeTick::VIDEO_CLOCK,
            ),
            time_us: i64::try_from(frame.timestamp_ns / 1_000).unwrap_or(i64::MAX),
            planes: frame.planes.truncated(mapping.planes),
        })
    }

    fn require_planes(
        mapping: &LayoutMapping,
        has_plane: impl Fn(usize) -> bool,
    ) -> Result<(), FormatError> {
        match (0..mapping.planes).find(|&index| !has_plane(index)) {
            Some(index) => Err(FormatError::MissingPlane {
                layout: mapping.transport.as_str(),
                index,
            }),
            None => Ok(()),
        }
    }
}
