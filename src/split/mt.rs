//! MT19937 seeded and consumed the way CPython's `random` module does it.
//!
//! The generator itself is `rand_mt`; its `new_with_key` is the reference
//! `init_by_array` that `random.seed` uses for integer seeds. This module adds
//! CPython's seed splitting and the draws built on top of the raw stream.
//!
//! Matching CPython bit for bit means an assignment produced here can be
//! reproduced by any other tool that calls `random.seed(n)` followed by
//! `random.shuffle(files)`, which is how VisDrone client splits are usually
//! generated.

use rand_mt::Mt;

/// A Mersenne Twister with CPython's integer seeding and bounded sampling.
#[derive(Clone, Debug)]
pub struct PythonRandom {
    mt: Mt,
}

impl PythonRandom {
    /// Equivalent to `random.seed(seed)` for a non-negative integer seed.
    pub fn seed(seed: u64) -> Self {
        // CPython splits the seed into little-endian 32-bit words and keeps at
        // least one word, so a seed of zero becomes `[0]`.
        let words = [seed as u32, (seed >> 32) as u32];
        let key = if words[1] == 0 { &words[..1] } else { &words[..] };
        Self {
            mt: Mt::new_with_key(key.iter().copied()),
        }
    }

    /// Next raw 32-bit output (`genrand_uint32`).
    pub fn next_u32(&mut self) -> u32 {
        self.mt.next_u32()
    }

    /// Equivalent to `random.getrandbits(k)` for `1 <= k <= 64`.
    pub fn getrandbits(&mut self, k: u32) -> u64 {
        debug_assert!((1..=64).contains(&k));
        if k <= 32 {
            return u64::from(self.next_u32() >> (32 - k));
        }

        // Words are filled least significant first; only the last is shifted.
        let low = u64::from(self.next_u32());
        let high = u64::from(self.next_u32() >> (64 - k));
        low | (high << 32)
    }

    /// Equivalent to `random.random()`: a float in `[0, 1)` with 53 bits.
    pub fn random(&mut self) -> f64 {
        let a = u64::from(self.next_u32() >> 5);
        let b = u64::from(self.next_u32() >> 6);
        (a as f64 * 67_108_864.0 + b as f64) * (1.0 / 9_007_199_254_740_992.0)
    }

    /// Uniform integer in `0..n` by rejection sampling (`_randbelow`).
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let n = n as u64;
        let k = u64::BITS - n.leading_zeros();
        loop {
            let r = self.getrandbits(k);
            if r < n {
                return r as usize;
            }
        }
    }

    /// In-place Fisher-Yates shuffle, consuming draws in CPython's order.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
