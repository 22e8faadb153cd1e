use crate::models::sample::{BlockLevels, Sample};

/// Magnitude of a sample's deviation from silence.
fn deviation(sample: Sample, midpoint: Sample) -> u32 {
    (i32::from(sample) - i32::from(midpoint)).unsigned_abs()
}

/// Compute RMS and peak deviation from `midpoint`, normalized so that a
/// full-scale swing reads 1.0.
pub fn block_levels(samples: &[Sample], midpoint: Sample) -> BlockLevels {
    if samples.is_empty() || midpoint == 0 {
        return BlockLevels::default();
    }
    let scale = f32::from(midpoint);
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let d = f64::from(deviation(s, midpoint));
            d * d
        })
        .sum();
    let rms = (sum_sq / samples.len() as f64).sqrt() as f32 / scale;
    let peak = samples
        .iter()
        .map(|&s| deviation(s, midpoint))
        .max()
        .unwrap_or(0) as f32
        / scale;
    BlockLevels {
        rms: rms.min(1.0),
        peak: peak.min(1.0),
    }
}

/// Bar height per column for a block of samples.
///
/// The block is split into `columns` contiguous groups of
/// `max(len / columns, 1)` samples. Each bar is the group's mean deviation
/// from `midpoint`, scaled so a deviation of `midpoint` fills `rows`, then
/// clamped to `rows`. Columns past the end of a short block read zero.
pub fn bar_heights(samples: &[Sample], columns: usize, rows: u16, midpoint: Sample) -> Vec<u16> {
    let per_column = (samples.len() / columns.max(1)).max(1);
    let midpoint = u64::from(midpoint.max(1));

    (0..columns)
        .map(|x| {
            let start = x * per_column;
            let group = samples.get(start..(start + per_column).min(samples.len())).unwrap_or(&[]);
            let sum: u64 = group
                .iter()
                .map(|&s| u64::from(deviation(s, midpoint as Sample)))
                .sum();
            let average = sum / per_column as u64;
            let height = average * u64::from(rows) / midpoint;
            height.min(u64::from(rows)) as u16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn silence_reads_zero() {
        let levels = block_levels(&[2048; 16], 2048);
        assert_eq!(levels, BlockLevels::default());
        assert_eq!(bar_heights(&[2048; 16], 4, 64, 2048), vec![0; 4]);
    }

    #[test]
    fn square_wave_levels() {
        let samples = [1024, 3072, 1024, 3072];
        let levels = block_levels(&samples, 2048);
        assert_relative_eq!(levels.rms, 0.5, epsilon = 1e-6);
        assert_relative_eq!(levels.peak, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn levels_clamped_to_unity() {
        let levels = block_levels(&[0, 0], 2048);
        assert_relative_eq!(levels.rms, 1.0);
        assert_relative_eq!(levels.peak, 1.0);
    }

    #[test]
    fn empty_block_levels() {
        assert_eq!(block_levels(&[], 2048), BlockLevels::default());
    }

    #[test]
    fn bars_average_each_column_group() {
        // Two columns of two samples each.
        let samples = [2048 + 512, 2048 - 512, 2048 + 1024, 2048 + 1024];
        assert_eq!(bar_heights(&samples, 2, 64, 2048), vec![16, 32]);
    }

    #[test]
    fn bars_clamp_to_rows() {
        // Deviation of 2048 from a midpoint of 1024 would read double height.
        assert_eq!(bar_heights(&[3072, 3072], 1, 64, 1024), vec![64]);
    }

    #[test]
    fn short_block_leaves_trailing_columns_empty() {
        let heights = bar_heights(&[4095, 4095], 4, 64, 2048);
        assert_eq!(heights.len(), 4);
        assert_eq!(&heights[2..], &[0, 0]);
        assert!(heights[0] > 60);
    }
}
