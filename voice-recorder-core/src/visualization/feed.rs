use std::sync::Arc;

use crate::models::sample::{BarFrame, Sample};
use crate::processing::capture_buffer::CaptureBuffer;
use crate::processing::levels;
use crate::session::context::DeviceContext;
use crate::traits::display::Display;

/// Turns freshly committed capture blocks into bar-graph frames.
///
/// Polled from the control loop. Only reads samples behind the write cursor,
/// so it never races the transfer engine. When several blocks complete
/// between two polls only the latest one is drawn.
pub struct VisualizationFeed {
    buffer: Arc<CaptureBuffer>,
    columns: usize,
    rows: u16,
    midpoint: Sample,
    /// `(generation, write_cursor)` of the last block drawn.
    seen: Option<(usize, usize)>,
}

impl VisualizationFeed {
    pub fn new(context: &DeviceContext) -> Self {
        let config = context.config();
        Self {
            buffer: Arc::clone(context.buffer()),
            columns: config.display_columns,
            rows: config.display_rows,
            midpoint: config.silence_midpoint(),
            seen: None,
        }
    }

    /// Build a frame if a block completed since the last poll.
    ///
    /// The block drawn and the marker recorded as seen come from the same
    /// cursor read. A frame whose recording was reset mid-read is dropped and
    /// the new recording is picked up on the next poll.
    pub fn poll(&mut self) -> Option<BarFrame> {
        let generation = self.buffer.generation();
        let cursor = self.buffer.write_cursor();
        let marker = (generation, cursor);
        if cursor == 0 || self.seen == Some(marker) {
            return None;
        }

        let (block_index, range) = self.buffer.block_ending_at(cursor)?;
        let samples = self.buffer.snapshot(range);
        if self.buffer.generation() != generation {
            return None;
        }
        self.seen = Some(marker);

        Some(BarFrame {
            block_index,
            heights: levels::bar_heights(&samples, self.columns, self.rows, self.midpoint),
            levels: levels::block_levels(&samples, self.midpoint),
        })
    }

    /// Poll and hand any new frame to `display`. Returns whether one was drawn.
    pub fn pump(&mut self, display: &mut dyn Display) -> bool {
        match self.poll() {
            Some(frame) => {
                log::trace!("Rendering block {} (rms {:.3})", frame.block_index, frame.levels.rms);
                display.render(&frame);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RecorderConfig;
    use crate::test_support::{MockDisplay, RecordingStatus};

    fn context() -> DeviceContext {
        let config = RecorderConfig {
            sample_rate: 16,
            record_secs: 1,
            blocks_per_second: 2,
            display_columns: 4,
            display_rows: 8,
            ..RecorderConfig::default()
        };
        DeviceContext::new(config, Arc::new(RecordingStatus::default())).unwrap()
    }

    fn commit(context: &DeviceContext, samples: &[Sample]) {
        let buffer = context.buffer();
        let offset = buffer.write_cursor();
        for (i, &s) in samples.iter().enumerate() {
            buffer.store(offset + i, s);
        }
        buffer.commit_block();
    }

    #[test]
    fn nothing_before_first_block() {
        let context = context();
        let mut feed = VisualizationFeed::new(&context);
        assert!(feed.poll().is_none());
    }

    #[test]
    fn frame_per_completed_block() {
        let context = context();
        let mut feed = VisualizationFeed::new(&context);

        // Columns of two samples: silence, half, full, and mixed swing.
        commit(&context, &[2048, 2048, 3072, 1024, 4095, 1, 2048, 4095]);
        let frame = feed.poll().unwrap();

        assert_eq!(frame.block_index, 0);
        assert_eq!(frame.heights, vec![0, 4, 7, 3]);
        assert!(frame.levels.peak > 0.99);
        assert!(feed.poll().is_none());

        commit(&context, &[2048; 8]);
        let frame = feed.poll().unwrap();
        assert_eq!(frame.block_index, 1);
        assert_eq!(frame.heights, vec![0; 4]);
        assert_eq!(frame.levels.rms, 0.0);
    }

    #[test]
    fn skips_to_latest_block_when_behind() {
        let context = context();
        let mut feed = VisualizationFeed::new(&context);

        commit(&context, &[4095; 8]);
        commit(&context, &[2048; 8]);

        let frame = feed.poll().unwrap();
        assert_eq!(frame.block_index, 1);
        assert_eq!(frame.heights, vec![0; 4]);
        assert!(feed.poll().is_none());
    }

    #[test]
    fn new_recording_is_seen_even_at_same_block_count() {
        let context = context();
        let mut feed = VisualizationFeed::new(&context);
        commit(&context, &[4095; 8]);
        assert!(feed.poll().is_some());

        context.buffer().reset();
        commit(&context, &[2048; 8]);

        let frame = feed.poll().unwrap();
        assert_eq!(frame.block_index, 0);
        assert_eq!(frame.heights, vec![0; 4]);
    }

    #[test]
    fn pump_renders_to_display() {
        let context = context();
        let mut feed = VisualizationFeed::new(&context);
        let mut display = MockDisplay::default();

        assert!(!feed.pump(&mut display));
        commit(&context, &[3072; 8]);
        assert!(feed.pump(&mut display));

        assert_eq!(display.frames.len(), 1);
        assert_eq!(display.frames[0].heights, vec![4; 4]);
    }

    #[test]
    fn frame_matches_cursor_it_was_built_from() {
        let context = context();
        let mut feed = VisualizationFeed::new(&context);

        commit(&context, &[3072; 8]);
        let first = feed.poll().unwrap();
        commit(&context, &[2048; 8]);
        let second = feed.poll().unwrap();

        assert_eq!((first.block_index, second.block_index), (0, 1));
        assert_eq!(first.heights, vec![4; 4]);
        assert_eq!(second.heights, vec![0; 4]);
        assert!(feed.poll().is_none());
    }
}
