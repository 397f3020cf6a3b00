use std::f64::consts::TAU;

use crate::domain::media::{HostPixelFormat, HostVideoFrame, PlaneSet};

/// I420 moving-bar generator standing in for the host's rendered output
pub struct TestPattern {
    width: u32,
    height: u32,
    luma: Vec<u8>,
    chroma_u: Vec<u8>,
    chroma_v: Vec<u8>,
    frame_index: u64,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        let chroma_len = (width.div_ceil(2) * height.div_ceil(2)) as usize;
        Self {
            width,
            height,
            luma: vec![16; (width * height) as usize],
            chroma_u: vec![128; chroma_len],
            chroma_v: vec![128; chroma_len],
            frame_index: 0,
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_index
    }

    /// Render the next frame: a white bar moving one column per frame
    pub fn next_frame(&mut self, timestamp_ns: u64) -> HostVideoFrame<'_> {
        let width = self.width as usize;
        let bar = (self.frame_index % u64::from(self.width.max(1))) as usize;

        for row in self.luma.chunks_exact_mut(width.max(1)) {
            for (column, pixel) in row.iter_mut().enumerate() {
                *pixel = if column.abs_diff(bar) < 4 { 235 } else { 16 };
            }
        }
        self.frame_index += 1;

        let chroma_stride = self.width.div_ceil(2);
        HostVideoFrame {
            format: HostPixelFormat::I420,
            width: self.width,
            height: self.height,
            planes: PlaneSet::new()
                .with_plane(0, &self.luma, self.width)
                .with_plane(1, &self.chroma_u, chroma_stride)
                .with_plane(2, &self.chroma_v, chroma_stride),
            timestamp_ns,
        }
    }
}

/// Planar f32 sine generator standing in for the host's audio mix
pub struct ToneGenerator {
    channels: usize,
    sample_rate: u32,
    frequency: f64,
    phase: f64,
}

impl ToneGenerator {
    pub fn new(channels: usize, sample_rate: u32, frequency: f64) -> Self {
        Self {
            channels,
            sample_rate,
            frequency,
            phase: 0.0,
        }
    }

    /// One plane of native-endian f32 bytes per channel, `frames` samples each
    pub fn next_planes(&mut self, frames: usize) -> Vec<Vec<u8>> {
        let step = TAU * self.frequency / f64::from(self.sample_rate.max(1));
        let samples: Vec<f32> = (0..frames)
            .map(|n| (0.25 * (self.phase + step * n as f64).sin()) as f32)
            .collect();
        self.phase = (self.phase + step * frames as f64) % TAU;

        let plane: Vec<u8> = bytemuck::cast_slice(&samples).to_vec();
        vec![plane; self.channels]
    }
}
