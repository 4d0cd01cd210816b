//! Deterministic Random Number Generator
//!
//! Uses Xorshift128+ for fast, reproducible randomness. Role shuffles draw
//! from a [`RandomSource`] so tests can pin the sequence with a fixed seed.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Source of uniformly distributed integers.
///
/// The router only ever needs bounded integers (for shuffling), so this is
/// the whole seam. Implemented by [`DeterministicRng`]; tests may supply
/// their own scripted sources.
pub trait RandomSource {
    /// Generate a random integer in range [0, max). Returns 0 when `max == 0`.
    fn next_int(&mut self, max: u32) -> u32;
}

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use prop_hunt::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Xorshift must never sit in the all-zero state
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }
}

impl RandomSource for DeterministicRng {
    /// Uses rejection sampling so every value in [0, max) is equally likely.
    #[inline]
    fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let max = max as u64;
        // Largest multiple of `max` that fits, everything above it is rejected
        let zone = u64::MAX - (u64::MAX % max);
        loop {
            let v = self.next_u64();
            if v < zone {
                return (v % max) as u32;
            }
        }
    }
}

/// Shuffle a slice in place using Fisher-Yates.
///
/// Every permutation is equally likely given a uniform `rng`.
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, slice: &mut [T]) {
    let len = slice.len();
    for i in (1..len).rev() {
        let j = rng.next_int((i + 1) as u32) as usize;
        slice.swap(i, j);
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a round seed from a nonce and the participants of the round.
///
/// The same nonce and roster always give the same seed, so a logged nonce
/// is enough to replay a role shuffle. Participant order matters; callers
/// pass the roster in host enumeration order.
pub fn derive_round_seed<S: AsRef<str>>(nonce: u64, roster: &[S]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"PROP_HUNT_ROUND_V1");
    hasher.update(nonce.to_le_bytes());

    for id in roster {
        let id = id.as_ref().as_bytes();
        // Length prefix keeps ["ab", "c"] distinct from ["a", "bc"]
        hasher.update((id.len() as u32).to_le_bytes());
        hasher.update(id);
    }

    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================
