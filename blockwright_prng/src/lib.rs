// Deterministic, portable pseudo-random number generator for the planner.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// The planner only needs randomness in one place: the `Random` sort mode,
// where every action context carries a tie-break value. Those values must be
// identical across two passes over the same inputs, and must not depend on
// the order in which rayon happens to schedule positions. So instead of one
// shared generator, each context derives its own stream from the pass seed
// and a stable key (`PlanRng::keyed`), which makes the value a pure function
// of `(seed, key)`.
//
// See also: `blockwright_sim::result::context` where the tie-break values are
// drawn, `blockwright_sim::config` for the pass seed.
//
// **Critical constraint: determinism.** Every method on `PlanRng` must produce
// identical output given the same prior state, regardless of platform,
// compiler version, or thread scheduling. No floating-point arithmetic in the
// core generator and no OS entropy.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRng {
    s: [u64; 4],
}

impl PlanRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a generator whose stream depends only on `seed` and `key`.
    ///
    /// Each key part is folded through SplitMix64 in order, so `[1, 2]` and
    /// `[2, 1]` give different streams. Used to hand every parallel task
    /// its own reproducible stream without sharing mutable state.
    pub fn keyed(seed: u64, key: &[i64]) -> Self {
        let mut sm = seed;
        let mut folded = splitmix64(&mut sm);
        for &part in key {
            sm ^= (part as u64).wrapping_add(folded);
            folded = splitmix64(&mut sm);
        }
        Self::new(folded)
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64, used for seeding and key folding.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
