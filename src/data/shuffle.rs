// ============================================================
// Layer 4 — Bounded Shuffle Buffer
// ============================================================
// An iterator adapter that approximately shuffles a stream while
// holding at most `capacity` items in memory.
//
//   1. Fill the buffer from the source
//   2. Pick a random slot, emit its item, refill the slot with
//      the next unread item
//   3. When the source is exhausted, drain the buffer in random
//      order
//
// With capacity >= the stream length this is a full uniform
// shuffle; with a smaller buffer an item can only move forward
// by about `capacity` positions, so the permutation is local.
//
// The RNG is a seeded StdRng, so the same source order and seed
// always give the same output order.

use rand::{rngs::StdRng, Rng, SeedableRng};

pub struct ShuffleBuffer<I: Iterator> {
    source:   I,
    buffer:   Vec<I::Item>,
    capacity: usize,
    rng:      StdRng,
}

impl<I: Iterator> ShuffleBuffer<I> {
    /// A capacity of 0 is treated as 1 (no shuffling).
    pub fn new(source: I, capacity: usize, seed: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            buffer: Vec::with_capacity(capacity),
            capacity,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<I: Iterator> Iterator for ShuffleBuffer<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while self.buffer.len() < self.capacity {
            match self.source.next() {
                Some(item) => self.buffer.push(item),
                None => break,
            }
        }
        if self.buffer.is_empty() {
            return None;
        }

        let slot = self.rng.gen_range(0..self.buffer.len());
        match self.source.next() {
            Some(next) => Some(std::mem::replace(&mut self.buffer[slot], next)),
            None => Some(self.buffer.swap_remove(slot)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_item_emitted_once() {
        let mut out: Vec<u32> = ShuffleBuffer::new(0..500u32, 64, 7).collect();
        out.sort();
        assert_eq!(out, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_order() {
        let a: Vec<u32> = ShuffleBuffer::new(0..200u32, 50, 42).collect();
        let b: Vec<u32> = ShuffleBuffer::new(0..200u32, 50, 42).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_order() {
        let a: Vec<u32> = ShuffleBuffer::new(0..200u32, 200, 1).collect();
        let b: Vec<u32> = ShuffleBuffer::new(0..200u32, 200, 2).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_capacity_one_keeps_order() {
        let out: Vec<u32> = ShuffleBuffer::new(0..20u32, 1, 3).collect();
        assert_eq!(out, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_displacement_bounded_by_capacity() {
        // item i cannot be emitted before position i - capacity + 1
        let cap = 10;
        let out: Vec<usize> = ShuffleBuffer::new(0..300usize, cap, 9).collect();
        for (pos, &item) in out.iter().enumerate() {
            assert!(item <= pos + cap - 1, "item {item} emitted at {pos}");
        }
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(ShuffleBuffer::new(std::iter::empty::<u8>(), 10, 0).count(), 0);
    }
}
