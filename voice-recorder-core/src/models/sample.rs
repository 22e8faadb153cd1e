/// One converter reading, widened to 16 bits.
pub type Sample = u16;

/// Summary levels of a block of samples, normalized to 0.0–1.0 around the
/// silence midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockLevels {
    pub rms: f32,
    pub peak: f32,
}

/// One bar-graph frame derived from a completed capture block.
#[derive(Debug, Clone, PartialEq)]
pub struct BarFrame {
    /// Zero-based index of the block within the current recording.
    pub block_index: usize,

    /// Bar height per display column, each within `0..=display_rows`.
    pub heights: Vec<u16>,

    pub levels: BlockLevels,
}
