//! Deterministic PRNG based on the Xorshift64 algorithm.
//!
//! The composition generator draws every random decision from this source,
//! so a seed fully determines a generated composition on every platform.

/// Alphabet for base-36 identifiers.
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of identifiers produced by [`Xorshift64::next_id`].
pub const ID_LEN: usize = 9;

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed of 0 is replaced
/// with a non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1), built from the upper
    /// 53 bits of `next_u64()`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Returns a uniformly distributed integer in the closed range [min, max].
    ///
    /// The bounds are swapped if given in the wrong order.
    pub fn next_int_inclusive(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = hi.abs_diff(lo) + 1;
        lo + (self.next_u64() % span) as i64
    }

    /// Picks one element of `items` uniformly, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_usize(items.len()))
    }

    /// Returns a fresh [`ID_LEN`]-character lowercase base-36 identifier.
    pub fn next_id(&mut self) -> String {
        let mut bits = self.next_u64();
        (0..ID_LEN)
            .map(|_| {
                let digit = (bits % 36) as usize;
                bits /= 36;
                BASE36[digit] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every composition reproduced from a logged seed changes.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn two_instances_with_same_seed_produce_identical_sequences() {
        let mut a = Xorshift64::new(42);
        let mut b = Xorshift64::new(42);
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "sequences diverged at index {i}");
        }
    }

    #[test]
    fn next_int_inclusive_reaches_both_bounds() {
        let mut rng = Xorshift64::new(31337);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..10_000 {
            let v = rng.next_int_inclusive(-2, 2);
            assert!((-2..=2).contains(&v), "value {v} out of [-2, 2]");
            seen_min |= v == -2;
            seen_max |= v == 2;
        }
        assert!(seen_min && seen_max, "inclusive bounds never drawn");
    }

    #[test]
    fn next_int_inclusive_with_equal_bounds_is_constant() {
        let mut rng = Xorshift64::new(5);
        for _ in 0..100 {
            assert_eq!(rng.next_int_inclusive(7, 7), 7);
        }
    }

    #[test]
    fn next_int_inclusive_accepts_reversed_bounds() {
        let mut rng = Xorshift64::new(5);
        for _ in 0..100 {
            let v = rng.next_int_inclusive(60, 25);
            assert!((25..=60).contains(&v));
        }
    }

    #[test]
    fn pick_on_empty_slice_is_none() {
        let mut rng = Xorshift64::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }

    #[test]
    fn pick_returns_member_of_slice() {
        let mut rng = Xorshift64::new(1);
        let items = ["a", "b", "c"];
        for _ in 0..100 {
            let v = rng.pick(&items).unwrap();
            assert!(items.contains(v));
        }
    }

    #[test]
    fn next_id_is_nine_base36_chars() {
        let mut rng = Xorshift64::new(2024);
        for _ in 0..500 {
            let id = rng.next_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(
                id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()),
                "unexpected character in id {id}"
            );
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_range_in_bounds_for_any_seed_and_range(
                seed: u64,
                min in -1e6_f64..1e6,
                max in -1e6_f64..1e6,
            ) {
                prop_assume!(min < max);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "next_range({min}, {max}) = {v}");
                }
            }

            #[test]
            fn next_int_inclusive_in_bounds_for_any_seed(
                seed: u64,
                min in -1000_i64..1000,
                width in 0_i64..1000,
            ) {
                let max = min + width;
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_int_inclusive(min, max);
                    prop_assert!(v >= min && v <= max, "{v} outside [{min}, {max}]");
                }
            }

            #[test]
            fn next_f64_approximate_uniformity(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                let mut buckets = [0u32; 10];
                for _ in 0..10_000 {
                    let idx = (rng.next_f64() * 10.0).min(9.0) as usize;
                    buckets[idx] += 1;
                }
                for (i, &count) in buckets.iter().enumerate() {
                    prop_assert!(count >= 500, "bucket {i} has only {count} values");
                }
            }
        }
    }
}
