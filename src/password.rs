//! Randomized password generation under per-class quotas.
//!
//! A password is assembled from runs. Each run picks one active character
//! class uniformly at random and draws between 1 and `max_run` symbols from it,
//! bounded by what is left of the class budget and of the target length. A
//! class leaves the active pool once its budget is spent.
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Default password length.
pub const DEFAULT_LENGTH: usize = 64;

/// A fixed alphabet used during generation.
#[derive(Debug, PartialEq, Eq)]
pub struct CharacterClass {
    pub name: &'static str,
    symbols: &'static [u8],
}

impl CharacterClass {
    pub fn symbols(&self) -> &'static [u8] {
        self.symbols
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.symbols.contains(&(c as u8))
    }

    fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.symbols[rng.gen_range(0..self.symbols.len())] as char
    }
}

pub static LOWERCASE: CharacterClass = CharacterClass {
    name: "lowercase",
    symbols: b"abcdefghijklmnopqrstuvwxyz",
};

pub static UPPERCASE: CharacterClass = CharacterClass {
    name: "uppercase",
    symbols: b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
};

pub static DIGIT: CharacterClass = CharacterClass {
    name: "digit",
    symbols: b"0123456789",
};

pub static SPECIAL: CharacterClass = CharacterClass {
    name: "special",
    symbols: b"!@#$%^&*()_+-=",
};

/// Remaining budget and run cap of one class during a single generation.
#[derive(Debug, Clone)]
pub struct ClassQuota {
    pub class: &'static CharacterClass,
    pub remaining: usize,
    pub max_run: usize,
}

impl ClassQuota {
    pub fn new(class: &'static CharacterClass, remaining: usize, max_run: usize) -> Self {
        Self {
            class,
            remaining,
            max_run,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub include_special: bool,
    pub length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            include_special: true,
            length: DEFAULT_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Fresh quotas for one generation call.
    pub fn quotas(&self) -> Vec<ClassQuota> {
        let mut quotas = vec![
            ClassQuota::new(&LOWERCASE, 64, 16),
            ClassQuota::new(&UPPERCASE, 64, 16),
            ClassQuota::new(&DIGIT, 32, 4),
        ];
        if self.include_special {
            quotas.push(ClassQuota::new(&SPECIAL, 16, 4));
        }
        quotas
    }

    /// The longest password the enabled classes can produce.
    pub fn capacity(&self) -> usize {
        self.quotas().iter().map(|q| q.remaining).sum()
    }
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("character pool exhausted after {generated} of {target} symbols")]
    ExhaustedPool { generated: usize, target: usize },

    #[error("could not seed random source: {0}")]
    Entropy(#[from] rand::Error),
}

/// Symbols contributed by one class in one draw step.
#[derive(Debug, Clone)]
pub struct Run {
    pub class: &'static CharacterClass,
    pub symbols: String,
}

/// Generate a password with a generator freshly seeded from the OS entropy source.
pub fn generate(policy: &PasswordPolicy) -> Result<String, PasswordError> {
    let mut rng = StdRng::from_rng(OsRng)?;
    generate_with_rng(policy, &mut rng)
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    policy: &PasswordPolicy,
    rng: &mut R,
) -> Result<String, PasswordError> {
    let runs = draw_runs(policy.quotas(), policy.length, rng)?;
    Ok(runs.into_iter().map(|run| run.symbols).collect())
}

/// Draw runs from `active` until `target` symbols have been produced.
///
/// Every iteration either shrinks `target - generated` or removes a quota, so
/// the loop ends after at most `target + active.len()` iterations.
pub fn draw_runs<R: Rng + ?Sized>(
    mut active: Vec<ClassQuota>,
    target: usize,
    rng: &mut R,
) -> Result<Vec<Run>, PasswordError> {
    let mut runs = Vec::new();
    let mut generated = 0;

    while generated < target {
        if active.is_empty() {
            return Err(PasswordError::ExhaustedPool { generated, target });
        }

        let index = rng.gen_range(0..active.len());
        let quota = &mut active[index];
        let bound = quota.max_run.min(quota.remaining).min(target - generated);

        if bound > 0 {
            let len = rng.gen_range(1..=bound);
            let symbols: String = (0..len).map(|_| quota.class.choose(rng)).collect();
            quota.remaining -= len;
            generated += len;
            runs.push(Run {
                class: quota.class,
                symbols,
            });
        }

        if bound == 0 || quota.remaining == 0 {
            active.swap_remove(index);
        }
    }

    Ok(runs)
}

/// Postgres pre-hashed password form: `md5` followed by hex(md5(password || username)).
pub fn md5_password(username: &str, password: &str) -> String {
    format!("md5{:x}", md5::compute(format!("{}{}", password, username)))
}
