//! Frame sink standing in for the OLED.

use voice_recorder_core::{BarFrame, Display};

/// Keeps rendered frames and logs a one-line bar summary for each.
#[derive(Debug, Default)]
pub struct FrameLog {
    frames: Vec<BarFrame>,
}

impl FrameLog {
    pub fn frames(&self) -> &[BarFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&BarFrame> {
        self.frames.last()
    }
}

impl Display for FrameLog {
    fn render(&mut self, frame: &BarFrame) {
        let tallest = frame.heights.iter().copied().max().unwrap_or(0);
        log::debug!(
            "Block {}: {} columns, tallest {}, rms {:.3}, peak {:.3}",
            frame.block_index,
            frame.heights.len(),
            tallest,
            frame.levels.rms,
            frame.levels.peak
        );
        self.frames.push(frame.clone());
    }
}
