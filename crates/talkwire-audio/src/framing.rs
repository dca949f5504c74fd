/// Reslices arbitrarily sized capture buffers into fixed-size recognition
/// frames. The audio backend delivers whatever buffer size it likes; the
/// recognizer wants a steady cadence.
pub struct FrameAssembler {
    frame_size: usize,
    pending: Vec<f32>,
}

impl FrameAssembler {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            pending: Vec::with_capacity(frame_size),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Appends samples and returns every complete frame now available, each
    /// exactly `frame_size` long.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.pending.extend_from_slice(samples);
        let mut frames = Vec::new();
        while self.pending.len() >= self.frame_size {
            let rest = self.pending.split_off(self.frame_size);
            frames.push(std::mem::replace(&mut self.pending, rest));
        }
        frames
    }

    /// Takes the remaining partial frame, if any. Shorter than `frame_size`.
    pub fn flush(&mut self) -> Option<Vec<f32>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, start: f32) -> Vec<f32> {
        (0..n).map(|i| start + i as f32).collect()
    }

    #[test]
    fn test_exact_frame_passes_through() {
        let mut assembler = FrameAssembler::new(4);
        let frames = assembler.push(&ramp(4, 0.0));
        assert_eq!(frames, vec![vec![0.0, 1.0, 2.0, 3.0]]);
        assert_eq!(assembler.pending_len(), 0);
    }

    #[test]
    fn test_short_push_accumulates() {
        let mut assembler = FrameAssembler::new(8);
        assert!(assembler.push(&ramp(3, 0.0)).is_empty());
        assert_eq!(assembler.pending_len(), 3);
        let frames = assembler.push(&ramp(5, 3.0));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0], ramp(8, 0.0));
    }

    #[test]
    fn test_large_push_yields_multiple_frames() {
        let mut assembler = FrameAssembler::new(4);
        let frames = assembler.push(&ramp(10, 0.0));
        assert_eq!(
            frames,
            vec![vec![0.0, 1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0, 7.0]]
        );
        assert_eq!(assembler.pending_len(), 2);
    }

    #[test]
    fn test_sample_order_preserved_across_pushes() {
        let mut assembler = FrameAssembler::new(6);
        let mut out = Vec::new();
        out.extend(assembler.push(&ramp(4, 0.0)));
        out.extend(assembler.push(&ramp(4, 4.0)));
        out.extend(assembler.push(&ramp(4, 8.0)));
        let flat: Vec<f32> = out.into_iter().flatten().collect();
        assert_eq!(flat, ramp(12, 0.0));
    }

    #[test]
    fn test_flush_returns_partial_frame() {
        let mut assembler = FrameAssembler::new(4);
        assembler.push(&ramp(6, 0.0));
        assert_eq!(assembler.flush(), Some(vec![4.0, 5.0]));
        assert_eq!(assembler.flush(), None);
    }

    #[test]
    fn test_flush_empty_is_none() {
        let mut assembler = FrameAssembler::new(4);
        assert_eq!(assembler.flush(), None);
    }

    #[test]
    fn test_empty_push_is_noop() {
        let mut assembler = FrameAssembler::new(4);
        assert!(assembler.push(&[]).is_empty());
        assert_eq!(assembler.pending_len(), 0);
    }
}
