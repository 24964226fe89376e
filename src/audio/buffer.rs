//! Bounded accumulation of captured samples.
//! Interleaved device frames are down-mixed to mono 16-bit on the way in.

use std::collections::VecDeque;

/// Max buffer duration: 10 minutes at 48 kHz.
/// Prevents unbounded memory growth if a recording is never stopped.
const MAX_SAMPLES: usize = 48_000 * 60 * 10;

pub struct SampleBuffer {
    samples: VecDeque<i16>,
    max_samples: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::with_capacity_limit(MAX_SAMPLES)
    }

    pub fn with_capacity_limit(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(64 * 1024),
            max_samples: max_samples.max(1),
        }
    }

    /// Append a sample. Drops oldest when at capacity.
    pub fn push(&mut self, sample: i16) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn push_interleaved_f32(&mut self, data: &[f32], channels: usize) {
        for frame in data.chunks(channels.max(1)) {
            let mean = frame.iter().sum::<f32>() / frame.len() as f32;
            self.push((mean.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
        }
    }

    pub fn push_interleaved_i16(&mut self, data: &[i16], channels: usize) {
        for frame in data.chunks(channels.max(1)) {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            self.push((sum / frame.len() as i32) as i16);
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Drain everything captured so far.
    pub fn take(&mut self) -> Vec<i16> {
        self.samples.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_at_capacity() {
        let mut buffer = SampleBuffer::with_capacity_limit(3);
        for s in 1..=5 {
            buffer.push(s);
        }
        assert_eq!(buffer.take(), vec![3, 4, 5]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn down_mixes_interleaved_frames() {
        let mut buffer = SampleBuffer::new();
        buffer.push_interleaved_i16(&[100, 300, -50, -150], 2);
        buffer.push_interleaved_f32(&[1.0, 1.0, 0.0, 0.0, 2.0, 2.0], 2);
        assert_eq!(buffer.take(), vec![200, -100, i16::MAX, 0, i16::MAX]);
    }
}
