use std::num::Wrapping;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

// Linear congruential generator parameters
const MUL: u64 = 6364136223846793005; // Knuth section 3.3.4 (p.108)
const INC: u64 = 1442695040888963407;

#[derive(Clone, PartialEq)]
struct Rng {
    state: u64,
}

impl Rng {
    fn from_seed(seed: &[u8]) -> Rng {
        // The two halves of the state are murmur2 hashes of the seed under different keys,
        // byte-swapped so that the layout is the same on every platform.
        let lower = murmur2(seed, 1690382925).swap_bytes();
        let upper = murmur2(seed, 72970470).swap_bytes();
        let state = u64::from(lower) | (u64::from(upper) << 32);
        Rng { state }
    }

    /// Picks a random value uniformly distributed between `0.0` (inclusive) and `1.0` (exclusive).
    fn rnd(&mut self) -> f64 {
        let old_state = self.state;
        // Advance internal state.
        self.state = old_state.wrapping_mul(MUL).wrapping_add(INC);
        // Calculate output function (XSH RR) using the old state.
        // This is a PCG-XSH-RR generator (O'Neill 2014, section 6.3.1) that drops 3 bits during
        // the xorshift.
        let xorshifted = ((((old_state >> 18) & !(3 << 30)) ^ old_state) >> 27) as u32;
        let fac = xorshifted.rotate_right((old_state >> 59) as u32);
        2.0f64.powi(-32) * f64::from(fac)
    }

    /// Picks an integer uniformly distributed in `[0, n)`. `n` must be positive.
    fn below(&mut self, n: usize) -> usize {
        ((self.rnd() * n as f64) as usize).min(n - 1)
    }
}

/// The single entropy stream shared by every stage of image generation.
///
/// Draws are serialized by an internal lock which is held only for the duration of one draw,
/// so a `RandomSource` can be shared freely between threads (usually behind an `Arc`). The
/// underlying generator is never handed out.
pub struct RandomSource {
    rng: Mutex<Rng>,
}

impl RandomSource {
    /// Creates a source seeded from the current wall-clock time in nanoseconds.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        log::debug!("seeding random source from clock: {:#x}", nanos);
        Self::from_seed(nanos)
    }

    /// Creates a source with a fixed seed. Two sources with the same seed produce the same
    /// sequence of draws.
    pub fn from_seed(seed: u64) -> Self {
        RandomSource {
            rng: Mutex::new(Rng::from_seed(&seed.to_le_bytes())),
        }
    }

    /// Picks an integer uniformly distributed in `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn next_int(&self, n: usize) -> usize {
        assert!(n > 0, "next_int bound must be positive");
        self.rng.lock().below(n)
    }

    /// Picks a value uniformly distributed in `[0.0, 1.0)`.
    pub fn next_float(&self) -> f64 {
        self.rng.lock().rnd()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RandomSource { .. }")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_seed_state() {
        assert_eq!(Rng::from_seed(b"").state, 0x381a85e943aeeb00);
        assert_eq!(
            Rng::from_seed(&hex!(
                "efa7bdd92b5e9cd9de9b54ac0e3dc60623f1c989a80ed9c5157fffff10c2a148"
            ))
            .state,
            0x506997572177a894
        );
    }

    #[test]
    fn test_rnd_sequence() {
        let mut rng = Rng::from_seed(b"");
        let us: [f64; 8] = std::array::from_fn(|_| rng.rnd());
        assert_eq!(
            us,
            [
                0.8438512671273202,
                0.43491613143123686,
                0.26782758394256234,
                0.9794597257860005,
                0.8957886048592627,
                0.5943453973159194,
                0.07430003909394145,
                0.37728449678979814
            ]
        );
    }

    #[test]
    fn test_below_sequence() {
        // Same draws as `test_rnd_sequence`, scaled to [0, 10).
        let mut rng = Rng::from_seed(b"");
        let vs: [usize; 8] = std::array::from_fn(|_| rng.below(10));
        assert_eq!(vs, [8, 4, 2, 9, 8, 5, 0, 3]);
    }

    #[test]
    fn test_below_one_is_zero() {
        let mut rng = Rng::from_seed(b"");
        for _ in 0..100 {
            assert_eq!(rng.below(1), 0);
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let a = RandomSource::from_seed(0xdecafbad);
        let b = RandomSource::from_seed(0xdecafbad);
        for i in 1..64 {
            assert_eq!(a.next_int(i), b.next_int(i));
            assert_eq!(a.next_float(), b.next_float());
        }
    }

    #[test]
    fn test_next_int_in_range() {
        let rng = RandomSource::from_seed(7);
        for n in 1..200 {
            assert!(rng.next_int(n) < n);
        }
        for _ in 0..1000 {
            let v = rng.next_float();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    #[should_panic(expected = "next_int bound must be positive")]
    fn test_next_int_zero_panics() {
        RandomSource::from_seed(1).next_int(0);
    }

    #[test]
    fn test_concurrent_draws() {
        let rng = RandomSource::from_seed(99);
        let total: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..1000).filter(|_| rng.next_int(256) < 256).count()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(total, 8000);
    }
}

fn murmur2(bytes: &[u8], seed: u32) -> u32 {
    const K: usize = 16;
    const MASK: Wrapping<u32> = Wrapping(0xffff);
    const MASK_BYTE: Wrapping<u32> = Wrapping(0xff);
    const M: Wrapping<u32> = Wrapping(0x5bd1e995);

    let mut l: usize = bytes.len();
    let mut h = Wrapping(seed ^ (l as u32));
    let mut i = 0;

    let byte32 = |i: usize| Wrapping(u32::from(bytes[i]));

    while l >= 4 {
        let mut k = (byte32(i) & MASK_BYTE)
            | ((byte32(i + 1) & MASK_BYTE) << 8)
            | ((byte32(i + 2) & MASK_BYTE) << 16)
            | ((byte32(i + 3) & MASK_BYTE) << 24);
        i += 4;
        k = (k & MASK) * M + ((((k >> K) * M) & MASK) << K);
        k ^= k >> 24;
        k = (k & MASK) * M + ((((k >> K) * M) & MASK) << K);
        h = ((h & MASK) * M + ((((h >> K) * M) & MASK) << K)) ^ k;
        l -= 4;
    }
    if l >= 3 {
        h ^= (byte32(i + 2) & MASK_BYTE) << K;
    }
    if l >= 2 {
        h ^= (byte32(i + 1) & MASK_BYTE) << 8;
    }
    if l >= 1 {
        h ^= byte32(i) & MASK_BYTE;
        h = (h & MASK) * M + ((((h >> K) * M) & MASK) << K);
    }

    h ^= h >> 13;
    h = (h & MASK) * M + ((((h >> K) * M) & MASK) << K);
    h ^= h >> 15;

    h.0
}
