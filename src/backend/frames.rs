//! 10 ms framing between cpal callbacks and the audio transport
//!
//! cpal delivers and requests buffers of whatever size the host picks; the
//! transport always works in 10 ms frames.

use crate::constants::FRAME_DURATION_MS;

/// Interleaved samples in one 10 ms frame
pub fn frame_len(sample_rate: u32, channels: u16) -> usize {
    (sample_rate * FRAME_DURATION_MS / 1000) as usize * channels as usize
}

/// Convert interleaved samples from `from` to `to` channels into `out`.
///
/// Mono output averages the input channels, mono input is copied to every
/// output channel, otherwise channels are copied by position and missing
/// ones are silent.
pub fn remix(input: &[f32], from: u16, to: u16, out: &mut Vec<f32>) {
    out.clear();
    let (from, to) = (from as usize, to as usize);
    if from == 0 || to == 0 {
        return;
    }
    if from == to {
        out.extend_from_slice(input);
        return;
    }

    for frame in input.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else if from == 1 {
            out.extend(std::iter::repeat(frame[0]).take(to));
        } else {
            for ch in 0..to {
                out.push(frame.get(ch).copied().unwrap_or(0.0));
            }
        }
    }
}

/// Collects captured samples into whole frames
pub struct FrameChunker {
    frame_len: usize,
    buffer: Vec<f32>,
}

impl FrameChunker {
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame_len,
            buffer: Vec::with_capacity(frame_len * 2),
        }
    }

    /// Append samples and hand every completed frame to `on_frame`.
    pub fn push(&mut self, samples: &[f32], mut on_frame: impl FnMut(Vec<f32>)) {
        if self.frame_len == 0 {
            return;
        }
        self.buffer.extend_from_slice(samples);

        while self.buffer.len() >= self.frame_len {
            let frame: Vec<f32> = self.buffer.drain(..self.frame_len).collect();
            on_frame(frame);
        }
    }

    /// Samples waiting for a complete frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Serves arbitrary-sized output buffers from whole frames
pub struct PlayoutBuffer {
    frame: Vec<f32>,
    pos: usize,
}

impl PlayoutBuffer {
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame: vec![0.0; frame_len],
            pos: frame_len,
        }
    }

    /// Fill `out`, requesting a new frame from `next_frame` whenever the
    /// current one is used up. `next_frame` returns how many samples it
    /// wrote; the rest of the frame is silence.
    pub fn fill(&mut self, out: &mut [f32], mut next_frame: impl FnMut(&mut [f32]) -> usize) {
        if self.frame.is_empty() {
            out.fill(0.0);
            return;
        }

        let mut written = 0;
        while written < out.len() {
            if self.pos >= self.frame.len() {
                let filled = next_frame(&mut self.frame).min(self.frame.len());
                self.frame[filled..].fill(0.0);
                self.pos = 0;
            }

            let n = (self.frame.len() - self.pos).min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.frame[self.pos..self.pos + n]);
            self.pos += n;
            written += n;
        }
    }
}
