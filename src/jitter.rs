// Source of the color variation. Production uses a random generator,
// tests and reproducible runs use a seed or a fixed value.

pub trait Jitter {
    /// Next factor in [0, 1).
    fn next_factor(&mut self) -> f64;
}

#[derive(Clone, Debug)]
pub struct SeededJitter {
    rng: fastrand::Rng,
}

impl Default for SeededJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SeededJitter {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Jitter for SeededJitter {
    fn next_factor(&mut self) -> f64 {
        self.rng.f64()
    }
}

/// Always the same factor.
#[derive(Clone, Copy, Debug)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn next_factor(&mut self) -> f64 {
        self.0
    }
}
