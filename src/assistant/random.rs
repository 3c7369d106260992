use crate::models::Product;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::Mutex;

/// Source of randomness for the popular-products fallback.
pub trait RandomSource: Send + Sync {
    fn shuffle(&self, products: &mut [Product]);
}

/// Thread-local RNG; the production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn shuffle(&self, products: &mut [Product]) {
        products.shuffle(&mut rand::thread_rng());
    }
}

/// Reproducible RNG seeded up front.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn shuffle(&self, products: &mut [Product]) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        products.shuffle(&mut *rng);
    }
}

/// Leaves the order untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShuffle;

impl RandomSource for NoShuffle {
    fn shuffle(&self, _products: &mut [Product]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed::demo_products;

    fn ids(products: &[Product]) -> Vec<String> {
        products.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn same_seed_gives_same_order() {
        let mut a = demo_products();
        let mut b = demo_products();
        SeededRandom::new(7).shuffle(&mut a);
        SeededRandom::new(7).shuffle(&mut b);
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn shuffling_preserves_membership() {
        let original = demo_products();
        let mut shuffled = original.clone();
        ThreadRandom.shuffle(&mut shuffled);

        let mut left = ids(&original);
        let mut right = ids(&shuffled);
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn no_shuffle_is_identity() {
        let original = demo_products();
        let mut copy = original.clone();
        NoShuffle.shuffle(&mut copy);
        assert_eq!(original, copy);
    }
}
