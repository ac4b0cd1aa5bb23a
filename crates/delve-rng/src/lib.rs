//! Deterministic random number generation for dungeon building.
//!
//! Implements a 128-bit xorshift generator (Marsaglia 2003) seeded through
//! a splitmix-style avalanche mixer. Identical seed plus identical call
//! sequence yields an identical output stream on every platform: the state
//! transition uses only integer and bit operations, so there is no
//! floating-point drift to worry about.

use serde::{Deserialize, Serialize};

/// Golden-ratio increment used by the splitmix seeding walk.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Avalanche mixer (murmur3-style finalizer) used to spread seed entropy
/// across the four state words.
#[inline]
fn avalanche32(mut z: u32) -> u32 {
    z ^= z >> 16;
    z = z.wrapping_mul(0x85EB_CA6B);
    z ^= z >> 13;
    z = z.wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Seeded pseudo-random generator.
///
/// State is four unsigned 32-bit words advanced by a 128-bit xorshift
/// transform. Derived operations (`int_between`, `shuffle`, `weighted_pick`,
/// ...) all consume the same stream, so two instances with the same seed
/// stay in lockstep only for an identical call sequence.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: [u32; 4],
    seed: u64,
}

// Only the seed is serialized; deserializing recreates a fresh generator at
// stream position zero, the same strategy nh-style save games use.
impl Serialize for SeededRandom {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SeededRandom {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(SeededRandom::new(seed))
    }
}

impl SeededRandom {
    /// Create a generator from an integer seed.
    ///
    /// The mixer is applied four times along a golden-ratio walk, one
    /// output per state word, so nearby seeds produce unrelated states.
    pub fn new(seed: u64) -> Self {
        let mut state = [0u32; 4];
        let mut s = seed;
        for word in &mut state {
            s = s.wrapping_add(GOLDEN_GAMMA);
            *word = avalanche32((s ^ (s >> 32)) as u32);
        }
        // xorshift has one absorbing state: all zeros.
        if state == [0, 0, 0, 0] {
            state[0] = 0x9E37_79B9;
        }
        Self { state, seed }
    }

    /// Create a generator seeded from the system clock.
    pub fn from_time() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED);
        Self::new(nanos)
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance the state and return the next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let [x, y, z, w] = self.state;
        let t = x ^ (x << 11);
        let w2 = w ^ (w >> 19) ^ t ^ (t >> 8);
        self.state = [y, z, w, w2];
        w2
    }

    /// Next value normalized to `[0, 1)`.
    #[inline]
    pub fn next(&mut self) -> f64 {
        // 2^-32; exact in f64, so the mapping is uniform over the raw range.
        self.next_u32() as f64 * (1.0 / 4_294_967_296.0)
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    ///
    /// `min > max` is a programming error. Callers must guard it; in
    /// release builds the result is unspecified.
    #[inline]
    pub fn int_between(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max, "int_between called with min {min} > max {max}");
        let span = (max as i64).wrapping_sub(min as i64).wrapping_add(1) as u64;
        (min as i64).wrapping_add((self.next_u32() as u64 % span.max(1)) as i64) as i32
    }

    /// Uniform float in `[min, max)`.
    pub fn float_between(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Returns true with probability `p` (clamped by comparison: `p <= 0`
    /// never fires, `p >= 1` always fires).
    pub fn chance(&mut self, p: f64) -> bool {
        self.next() < p
    }

    /// Choose one element uniformly, or `None` on an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let idx = self.int_between(0, items.len() as i32 - 1) as usize;
            Some(&items[idx])
        }
    }

    /// Choose up to `count` distinct elements: shuffle a copy, take a prefix.
    pub fn pick_multiple<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut copy = items.to_vec();
        self.shuffle(&mut copy);
        copy.truncate(count);
        copy
    }

    /// Fisher–Yates shuffle in place, driven by `int_between`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.int_between(0, i as i32) as usize;
            items.swap(i, j);
        }
    }

    /// Weighted choice by cumulative scan. Weights at or below zero count
    /// as zero; if every weight is zero the scan falls through to the last
    /// element. `None` on an empty slice or mismatched lengths.
    pub fn weighted_pick<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
        if items.is_empty() || items.len() != weights.len() {
            return None;
        }
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return items.last();
        }
        let roll = self.next() * total;
        let mut acc = 0.0;
        for (item, w) in items.iter().zip(weights) {
            acc += w.max(0.0);
            if roll < acc {
                return Some(item);
            }
        }
        items.last()
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::from_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_mixed_call_sequence_stays_in_lockstep() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..200 {
            assert_eq!(a.int_between(0, 9), b.int_between(0, 9));
            assert_eq!(a.chance(0.5), b.chance(0.5));
            assert!((a.float_between(-1.0, 1.0) - b.float_between(-1.0, 1.0)).abs() == 0.0);
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRandom::new(1);
        let mut b = SeededRandom::new(2);
        let same = (0..64).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 4);
    }

    #[test]
    fn test_next_unit_interval_100k() {
        let mut rng = SeededRandom::new(0xDEAD_BEEF);
        for _ in 0..100_000 {
            let v = rng.next();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_int_between_inclusive_bounds() {
        let mut rng = SeededRandom::new(7);
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let v = rng.int_between(-2, 3);
            assert!((-2..=3).contains(&v));
            seen[(v + 2) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "all values in range should appear");
    }

    #[test]
    fn test_int_between_degenerate_range() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..100 {
            assert_eq!(rng.int_between(5, 5), 5);
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SeededRandom::new(9);
        for _ in 0..1000 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_pick_empty() {
        let mut rng = SeededRandom::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SeededRandom::new(1234);
        let mut items: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_deterministic() {
        let mut a = SeededRandom::new(99);
        let mut b = SeededRandom::new(99);
        let mut va: Vec<u32> = (0..20).collect();
        let mut vb: Vec<u32> = (0..20).collect();
        a.shuffle(&mut va);
        b.shuffle(&mut vb);
        assert_eq!(va, vb);
    }

    #[test]
    fn test_pick_multiple_distinct() {
        let mut rng = SeededRandom::new(5);
        let items: Vec<u32> = (0..10).collect();
        let picked = rng.pick_multiple(&items, 4);
        assert_eq!(picked.len(), 4);
        let mut dedup = picked.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 4);
    }

    #[test]
    fn test_pick_multiple_count_larger_than_slice() {
        let mut rng = SeededRandom::new(5);
        let items = [1, 2, 3];
        assert_eq!(rng.pick_multiple(&items, 10).len(), 3);
    }

    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let mut rng = SeededRandom::new(21);
        let items = ["never", "always"];
        for _ in 0..500 {
            assert_eq!(rng.weighted_pick(&items, &[0.0, 3.0]), Some(&"always"));
        }
    }

    #[test]
    fn test_weighted_pick_empty_and_mismatched() {
        let mut rng = SeededRandom::new(21);
        let empty: [u8; 0] = [];
        assert!(rng.weighted_pick(&empty, &[]).is_none());
        assert!(rng.weighted_pick(&[1, 2], &[1.0]).is_none());
    }

    #[test]
    fn test_weighted_pick_all_zero_falls_back() {
        let mut rng = SeededRandom::new(21);
        assert_eq!(rng.weighted_pick(&[1, 2, 3], &[0.0, 0.0, 0.0]), Some(&3));
    }

    #[test]
    fn test_serde_round_trip_reseeds() {
        let mut rng = SeededRandom::new(777);
        rng.next_u32();
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SeededRandom = serde_json::from_str(&json).unwrap();
        // Only the seed round-trips; the restored stream starts over.
        let mut fresh = SeededRandom::new(777);
        assert_eq!(restored.seed(), 777);
        assert_eq!(restored.next_u32(), fresh.next_u32());
    }

    proptest! {
        #[test]
        fn prop_int_between_in_range(seed: u64, a in -10_000i32..10_000, b in -10_000i32..10_000) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let mut rng = SeededRandom::new(seed);
            for _ in 0..32 {
                let v = rng.int_between(min, max);
                prop_assert!(v >= min && v <= max);
            }
        }

        #[test]
        fn prop_next_in_unit_interval(seed: u64) {
            let mut rng = SeededRandom::new(seed);
            for _ in 0..64 {
                let v = rng.next();
                prop_assert!((0.0..1.0).contains(&v));
            }
        }
    }
}
