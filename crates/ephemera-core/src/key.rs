//! Image key generation.
//!
//! Keys are drawn uniformly, with replacement, from a 62-symbol alphabet.
//! At the default length of 50 the key space is about 2.98e89, so no
//! uniqueness check is made before insert. The generator is not
//! cryptographically secure.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

/// Symbols a key may contain.
pub const KEY_ALPHABET: &[u8; 62] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Default key length.
pub const KEY_LENGTH: usize = 50;

/// Entropy stream consumed by [`KeyGenerator`].
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..bound`. `bound` is never zero.
    fn next_index(&self, bound: usize) -> usize;
}

/// Thread-local RNG of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn next_index(&self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Deterministic source for tests and reproducible runs.
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    /// Creates a source seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn next_index(&self, bound: usize) -> usize {
        self.rng.lock().gen_range(0..bound)
    }
}

impl fmt::Debug for SeededRandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandomSource").finish_non_exhaustive()
    }
}

/// Produces opaque image keys.
#[derive(Clone)]
pub struct KeyGenerator {
    source: Arc<dyn RandomSource>,
}

impl KeyGenerator {
    /// Creates a generator over the given entropy source.
    #[must_use]
    pub fn new(source: Arc<dyn RandomSource>) -> Self {
        Self { source }
    }

    /// Generates a key of `length` symbols.
    #[must_use]
    pub fn generate(&self, length: usize) -> String {
        (0..length)
            .map(|_| char::from(KEY_ALPHABET[self.source.next_index(KEY_ALPHABET.len())]))
            .collect()
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandomSource))
    }
}

impl fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_has_62_distinct_symbols() {
        let distinct: HashSet<u8> = KEY_ALPHABET.iter().copied().collect();
        assert_eq!(distinct.len(), 62);
    }

    #[test]
    fn test_generate_length_and_alphabet() {
        let generator = KeyGenerator::default();
        let key = generator.generate(KEY_LENGTH);

        assert_eq!(key.len(), KEY_LENGTH);
        assert!(key.bytes().all(|b| KEY_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_zero_length() {
        let generator = KeyGenerator::default();
        assert!(generator.generate(0).is_empty());
    }

    #[test]
    fn test_generated_keys_differ() {
        let generator = KeyGenerator::default();
        let keys: HashSet<String> = (0..100).map(|_| generator.generate(KEY_LENGTH)).collect();
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let a = KeyGenerator::new(Arc::new(SeededRandomSource::new(42)));
        let b = KeyGenerator::new(Arc::new(SeededRandomSource::new(42)));

        assert_eq!(a.generate(KEY_LENGTH), b.generate(KEY_LENGTH));
    }

    #[test]
    fn test_seeded_source_advances() {
        let generator = KeyGenerator::new(Arc::new(SeededRandomSource::new(7)));
        assert_ne!(generator.generate(KEY_LENGTH), generator.generate(KEY_LENGTH));
    }

    #[test]
    fn test_symbols_are_roughly_uniform() {
        let generator = KeyGenerator::new(Arc::new(SeededRandomSource::new(1234)));
        let sample = generator.generate(62 * 1000);

        let mut counts = [0usize; 128];
        for b in sample.bytes() {
            counts[b as usize] += 1;
        }

        // Expected 1000 per symbol; a fair source stays well inside this band.
        for &symbol in KEY_ALPHABET {
            let count = counts[symbol as usize];
            assert!((700..1300).contains(&count), "symbol {} drawn {} times", symbol as char, count);
        }
    }
}
