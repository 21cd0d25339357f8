use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Source of randomness for generated payloads and latency.
///
/// Seeding makes every generated value reproducible, which is how tests pin
/// down exact outputs. Without a seed the generator draws from OS entropy.
pub struct MockRng {
    inner: Mutex<StdRng>,
}

impl MockRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Runs `f` with exclusive access to the generator.
    pub fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// A v4-shaped UUID drawn from `rng` rather than the OS.
pub fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid()
}

/// `base` moved by a random fraction in `[-pct, pct]`, rounded to cents.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f64, pct: f64) -> f64 {
    round2(base * (1.0 + rng.gen_range(-pct..=pct)))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = MockRng::seeded(99);
        let b = MockRng::seeded(99);
        let xs: Vec<u32> = (0..8).map(|_| a.with(|r| r.r#gen())).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.with(|r| r.r#gen())).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_random_uuid_is_v4() {
        let rng = MockRng::seeded(1);
        let id = rng.with(|r| random_uuid(r));
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_jitter_bounds() {
        let rng = MockRng::seeded(3);
        for _ in 0..500 {
            let v = rng.with(|r| jitter(r, 100.0, 0.01));
            assert!((99.0..=101.0).contains(&v));
        }
    }
}
