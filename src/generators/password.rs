// src/generators/password.rs
use rand::distributions::{Distribution, Uniform};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub length: usize,
    pub use_uppercase: bool,
    pub use_digits: bool,
    pub use_symbols: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            length: 12,
            use_uppercase: true,
            use_digits: true,
            use_symbols: true,
        }
    }
}

/// Builds randomized passwords from the enabled character pools. Lowercase
/// is always in play; every enabled pool contributes at least one character,
/// so the output can exceed `length` when the request is shorter than the
/// number of enabled pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordGenerator;

impl PasswordGenerator {
    pub fn new() -> Self {
        PasswordGenerator
    }

    pub fn generate(&self, options: &GenerationOptions) -> String {
        self.generate_with_rng(options, &mut rand::thread_rng())
    }

    /// Same as [`generate`](Self::generate) but drawing from a caller-owned
    /// source, so deterministic generators can be substituted.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        options: &GenerationOptions,
        rng: &mut R,
    ) -> String {
        let mut pool: Vec<u8> = Vec::new();
        pool.extend_from_slice(LOWERCASE);

        // One guaranteed pick per enabled pool
        let mut chars: Vec<u8> = vec![pick(LOWERCASE, rng)];

        if options.use_uppercase {
            pool.extend_from_slice(UPPERCASE);
            chars.push(pick(UPPERCASE, rng));
        }
        if options.use_digits {
            pool.extend_from_slice(DIGITS);
            chars.push(pick(DIGITS, rng));
        }
        if options.use_symbols {
            pool.extend_from_slice(SYMBOLS);
            chars.push(pick(SYMBOLS, rng));
        }

        let fill = options.length.saturating_sub(chars.len());
        if fill > 0 {
            let dist = Uniform::from(0..pool.len());
            for _ in 0..fill {
                chars.push(pool[dist.sample(rng)]);
            }
        }

        // Shuffle so the mandatory picks are not clustered at the front
        chars.shuffle(rng);
        chars.into_iter().map(char::from).collect()
    }

    pub fn generate_many(&self, count: usize, options: &GenerationOptions) -> Vec<String> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| self.generate_with_rng(options, &mut rng))
            .collect()
    }
}

fn pick<R: Rng + ?Sized>(pool: &[u8], rng: &mut R) -> u8 {
    pool[rng.gen_range(0..pool.len())]
}
