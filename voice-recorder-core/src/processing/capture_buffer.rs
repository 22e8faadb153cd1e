use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use crate::models::sample::Sample;

/// Fixed-capacity, append-only sample store shared between the transfer
/// engine, the playback timer and the control loop.
///
/// Samples are stored by the transfer engine into the uncommitted region
/// (`write_cursor..capacity`) and become visible to readers once the capture
/// engine commits the block. Committed samples are never modified until the
/// next [`reset`](Self::reset).
///
/// Overflow behavior: none. Once `write_cursor == capacity` further commits
/// and stores are refused; the buffer is linear, not circular.
pub struct CaptureBuffer {
    samples: Box<[AtomicU16]>,
    block_size: usize,
    write_cursor: AtomicUsize,
    blocks_ready: AtomicUsize,
    generation: AtomicUsize,
}

impl CaptureBuffer {
    pub fn new(capacity: usize, block_size: usize) -> Self {
        Self {
            samples: (0..capacity).map(|_| AtomicU16::new(0)).collect(),
            block_size: block_size.max(1),
            write_cursor: AtomicUsize::new(0),
            blocks_ready: AtomicUsize::new(0),
            generation: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of committed samples.
    pub fn write_cursor(&self) -> usize {
        self.write_cursor.load(Ordering::Acquire)
    }

    /// Blocks committed since the last reset.
    pub fn blocks_ready(&self) -> usize {
        self.blocks_ready.load(Ordering::Acquire)
    }

    /// Incremented by every reset, so readers can tell recordings apart.
    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.write_cursor() == 0
    }

    pub fn is_full(&self) -> bool {
        self.write_cursor() >= self.capacity()
    }

    /// Store one sample into the uncommitted region.
    ///
    /// Returns `false` (and writes nothing) for slots that are already
    /// committed or beyond capacity.
    pub fn store(&self, index: usize, sample: Sample) -> bool {
        if index < self.write_cursor() {
            return false;
        }
        match self.samples.get(index) {
            Some(slot) => {
                slot.store(sample, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Read a committed sample.
    pub fn get(&self, index: usize) -> Option<Sample> {
        if index >= self.write_cursor() {
            return None;
        }
        self.samples.get(index).map(|slot| slot.load(Ordering::Relaxed))
    }

    /// Copy the committed part of `range`.
    pub fn snapshot(&self, range: Range<usize>) -> Vec<Sample> {
        let end = range.end.min(self.write_cursor());
        if range.start >= end {
            return Vec::new();
        }
        self.samples[range.start..end]
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .collect()
    }

    /// Index and sample range of the most recently committed block.
    pub fn latest_block(&self) -> Option<(usize, Range<usize>)> {
        self.block_ending_at(self.write_cursor())
    }

    /// Index and sample range of the block whose commit moved the write
    /// cursor to `cursor`.
    pub fn block_ending_at(&self, cursor: usize) -> Option<(usize, Range<usize>)> {
        if cursor == 0 || cursor > self.capacity() {
            return None;
        }
        let index = (cursor - 1) / self.block_size;
        Some((index, index * self.block_size..cursor))
    }

    /// Commit the next block and return the new write cursor.
    ///
    /// The final block is truncated at capacity. Returns `None` when the
    /// buffer was already full.
    pub(crate) fn commit_block(&self) -> Option<usize> {
        let capacity = self.capacity();
        let previous = self
            .write_cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cursor| {
                (cursor < capacity).then(|| (cursor + self.block_size).min(capacity))
            })
            .ok()?;
        self.blocks_ready.fetch_add(1, Ordering::AcqRel);
        Some((previous + self.block_size).min(capacity))
    }

    /// Discard the previous recording. Only called while no transfer is armed.
    pub(crate) fn reset(&self) {
        self.write_cursor.store(0, Ordering::Release);
        self.blocks_ready.store(0, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("capacity", &self.capacity())
            .field("block_size", &self.block_size)
            .field("write_cursor", &self.write_cursor())
            .field("blocks_ready", &self.blocks_ready())
            .field("generation", &self.generation())
            .finish()
    }
}
