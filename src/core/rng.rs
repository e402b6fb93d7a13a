//! Seeded deterministic RNG with draw-index tracking.
//!
//! Every draw consumes exactly one 64-bit word pair from a ChaCha8 stream, so
//! the draw index alone is enough to seek back to any position. That is what
//! lets a battle snapshot store only `(seed, index)`.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Persisted form of an [`RngContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RngState", into = "RngState")]
pub struct RngContext {
    seed: u64,
    index: u64,
    rng: ChaCha8Rng,
}

impl RngContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            index: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rebuild a context positioned after `index` draws of `seed`.
    pub fn restore(seed: u64, index: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        // Each draw reads one u64, i.e. two 32-bit words
        rng.set_word_pos(u128::from(index) * 2);
        Self { seed, index, rng }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws made so far.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            index: self.index,
        }
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_double(&mut self) -> f64 {
        self.index += 1;
        // 53 high bits -> exact f64 mantissa
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_bool(&mut self, probability: f64) -> bool {
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability out of range: {}",
            probability
        );
        self.next_double() < probability
    }

    /// Uniform integer in `[lo, hi)`. Always consumes exactly one draw.
    pub fn next_int(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo < hi, "empty range {}..{}", lo, hi);
        let span = (hi - lo) as f64;
        let offset = (self.next_double() * span) as i64;
        (lo + offset).min(hi - 1)
    }

    /// Derive an independent child stream for `stream_id`.
    ///
    /// The parent's index is untouched, so subsystems like loot can draw
    /// without perturbing the combat sequence.
    pub fn split(&self, stream_id: u64) -> RngContext {
        RngContext::new(derive_stream_seed(self.seed, stream_id))
    }
}

impl PartialEq for RngContext {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.index == other.index
    }
}

impl From<RngState> for RngContext {
    fn from(state: RngState) -> Self {
        RngContext::restore(state.seed, state.index)
    }
}

impl From<RngContext> for RngState {
    fn from(ctx: RngContext) -> Self {
        ctx.state()
    }
}

fn derive_stream_seed(seed: u64, stream_id: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(stream_id.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RngContext::new(42);
        let mut b = RngContext::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_double().to_bits(), b.next_double().to_bits());
        }
        assert_eq!(a.index(), 100);
    }

    #[test]
    fn test_index_starts_at_zero_and_counts_every_draw() {
        let mut rng = RngContext::new(7);
        assert_eq!(rng.index(), 0);
        rng.next_double();
        rng.next_bool(0.5);
        rng.next_int(0, 10);
        assert_eq!(rng.index(), 3);
    }

    #[test]
    fn test_next_double_in_unit_interval() {
        let mut rng = RngContext::new(1);
        for _ in 0..1000 {
            let v = rng.next_double();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_next_int_bounds() {
        let mut rng = RngContext::new(9);
        for _ in 0..1000 {
            let v = rng.next_int(-3, 4);
            assert!((-3..4).contains(&v));
        }
    }

    #[test]
    fn test_restore_resumes_sequence() {
        let mut original = RngContext::new(1234);
        for _ in 0..37 {
            original.next_double();
        }
        let mut restored = RngContext::restore(1234, 37);
        for _ in 0..50 {
            assert_eq!(
                original.next_double().to_bits(),
                restored.next_double().to_bits()
            );
        }
        assert_eq!(original.index(), restored.index());
    }

    #[test]
    fn test_serde_roundtrip_preserves_position() {
        let mut rng = RngContext::new(99);
        rng.next_double();
        rng.next_double();
        let json = serde_json::to_string(&rng).unwrap();
        assert_eq!(json, r#"{"seed":99,"index":2}"#);
        let mut back: RngContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.next_double().to_bits(), rng.next_double().to_bits());
    }

    #[test]
    fn test_split_does_not_consume_parent() {
        let mut parent = RngContext::new(5);
        parent.next_double();
        let mut child = parent.split(LOOT);
        child.next_double();
        child.next_double();
        assert_eq!(parent.index(), 1);
        assert_eq!(child.index(), 2);

        let mut reference = RngContext::new(5);
        reference.next_double();
        assert_eq!(parent.next_double().to_bits(), reference.next_double().to_bits());
    }

    #[test]
    fn test_split_streams_are_stable_and_distinct() {
        let parent = RngContext::new(5);
        let mut a1 = parent.split(LOOT);
        let mut a2 = parent.split(LOOT);
        let mut b = parent.split(LOOT + 1);
        let x1 = a1.next_double();
        assert_eq!(x1.to_bits(), a2.next_double().to_bits());
        assert_ne!(x1.to_bits(), b.next_double().to_bits());
    }

    #[test]
    #[should_panic(expected = "probability out of range")]
    fn test_next_bool_rejects_bad_probability() {
        RngContext::new(1).next_bool(1.5);
    }

    const LOOT: u64 = crate::core::constants::LOOT_STREAM_ID;
}
