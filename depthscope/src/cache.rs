//! Bounded ring cache of decoded frames.
//!
//! The ring holds the most recent decoded frames keyed by sequential index,
//! newest at the tail. Entries are index-contiguous: the navigator pushes
//! only at the read frontier, and reseeks truncate before refilling, so the
//! ring is always one ascending run with no index collisions. That makes
//! positional lookup O(1): an index maps to an offset from the tail.
//!
//! A miss is not an error here. It is the designed trigger for the
//! navigator's reseek fallback.

use std::collections::VecDeque;

use crate::compositor::DecodedFrame;

/// Bounded history of decoded frames.
pub struct FrameRing {
    entries: VecDeque<DecodedFrame>,
    capacity: usize,
    evictions: u64,
}

impl FrameRing {
    /// Create a ring bounded at `capacity` frames.
    ///
    /// The ring must hold at least the current frame; a zero capacity is
    /// raised to one (configuration validation rejects it earlier).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            evictions: 0,
        }
    }

    /// Append the newest frame, evicting the oldest when full.
    ///
    /// The frame's index must be greater than the current tail's; the
    /// navigator only pushes at the read frontier.
    pub fn push(&mut self, frame: DecodedFrame) {
        debug_assert!(
            self.entries.back().map_or(true, |tail| tail.index < frame.index),
            "ring indices must be strictly increasing"
        );
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.evictions += 1;
        }
        self.entries.push_back(frame);
    }

    /// Look up a cached frame by index.
    pub fn get(&self, index: u64) -> Option<&DecodedFrame> {
        let tail = self.entries.back()?;
        if index > tail.index {
            return None;
        }
        let offset = (tail.index - index) as usize;
        if offset >= self.entries.len() {
            return None;
        }
        let entry = &self.entries[self.entries.len() - 1 - offset];
        debug_assert_eq!(entry.index, index, "ring must be index-contiguous");
        Some(entry)
    }

    /// The cached entry one step behind `current`, if present.
    pub fn peek_previous(&self, current: u64) -> Option<&DecodedFrame> {
        let previous = current.checked_sub(1)?;
        self.get(previous)
    }

    /// Remove every entry with index greater than `index`.
    ///
    /// Returns the number of entries removed. Entries at or below `index`
    /// keep their order.
    pub fn truncate_after(&mut self, index: u64) -> usize {
        let mut removed = 0;
        while self
            .entries
            .back()
            .is_some_and(|entry| entry.index > index)
        {
            self.entries.pop_back();
            removed += 1;
        }
        removed
    }

    /// Number of cached frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity in frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the newest cached frame.
    pub fn newest_index(&self) -> Option<u64> {
        self.entries.back().map(|entry| entry.index)
    }

    /// Index of the oldest cached frame.
    pub fn oldest_index(&self) -> Option<u64> {
        self.entries.front().map(|entry| entry.index)
    }

    /// Frames evicted over the ring's lifetime.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::DepthBuffer;

    use image::RgbImage;
    use proptest::prelude::*;

    fn frame(index: u64) -> DecodedFrame {
        DecodedFrame {
            index,
            composite: RgbImage::new(2, 1),
            depth: DepthBuffer::new(vec![index as u16], 1, 1),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut ring = FrameRing::new(4);
        for i in 0..3 {
            ring.push(frame(i));
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.get(1).map(|f| f.index), Some(1));
        assert_eq!(ring.get(5), None);
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut ring = FrameRing::new(3);
        for i in 0..5 {
            ring.push(frame(i));
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.oldest_index(), Some(2));
        assert_eq!(ring.newest_index(), Some(4));
        assert!(ring.get(1).is_none());
        assert_eq!(ring.evictions(), 2);
    }

    #[test]
    fn test_peek_previous() {
        let mut ring = FrameRing::new(4);
        ring.push(frame(10));
        ring.push(frame(11));
        assert_eq!(ring.peek_previous(11).map(|f| f.index), Some(10));
        assert!(ring.peek_previous(10).is_none());
        assert!(ring.peek_previous(0).is_none());
    }

    #[test]
    fn test_truncate_after_removes_exactly_newer() {
        let mut ring = FrameRing::new(8);
        for i in 0..6 {
            ring.push(frame(i));
        }
        let removed = ring.truncate_after(3);
        assert_eq!(removed, 2);
        assert_eq!(ring.newest_index(), Some(3));
        assert_eq!(ring.oldest_index(), Some(0));
        // Survivors keep their order.
        for i in 0..=3 {
            assert_eq!(ring.get(i).map(|f| f.index), Some(i));
        }
    }

    #[test]
    fn test_truncate_after_everything() {
        let mut ring = FrameRing::new(4);
        ring.push(frame(5));
        ring.push(frame(6));
        assert_eq!(ring.truncate_after(2), 2);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_truncate_after_noop_when_nothing_newer() {
        let mut ring = FrameRing::new(4);
        ring.push(frame(1));
        assert_eq!(ring.truncate_after(1), 0);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut ring = FrameRing::new(0);
        ring.push(frame(0));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.capacity(), 1);
    }

    proptest! {
        /// The ring never exceeds its configured capacity, and lookups
        /// return exactly the surviving window.
        #[test]
        fn prop_size_never_exceeds_capacity(
            capacity in 1usize..16,
            count in 0u64..64,
        ) {
            let mut ring = FrameRing::new(capacity);
            for i in 0..count {
                ring.push(frame(i));
                prop_assert!(ring.len() <= capacity);
            }
            let oldest = count.saturating_sub(capacity as u64);
            for i in 0..count {
                let hit = ring.get(i).is_some();
                prop_assert_eq!(hit, i >= oldest);
            }
        }
    }
}
