use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Shared random source for a channel.
///
/// The generator sits behind a plain mutex that is only held for a single
/// draw, never across an `.await`.
pub struct Dice {
    rng: Mutex<StdRng>,
}

impl Dice {
    /// Seed from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence, used by tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform integer in `[0, upper)`. Returns 0 when `upper` is 0.
    pub fn below(&self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..upper)
    }

    /// Uniform integer in `[0, 100)`.
    pub fn percent(&self) -> u32 {
        self.below(100)
    }

    /// Single Bernoulli trial succeeding with probability `pct`/100.
    pub fn chance(&self, pct: u32) -> bool {
        self.percent() < pct
    }

    /// Pick a uniformly random element. `None` only for an empty slice.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
        if len == 0 {
            return None;
        }
        items.get(self.below(len) as usize)
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_zero_is_zero() {
        let dice = Dice::seeded(1);
        assert_eq!(dice.below(0), 0);
    }

    #[test]
    fn chance_extremes() {
        let dice = Dice::seeded(7);
        for _ in 0..500 {
            assert!(!dice.chance(0));
            assert!(dice.chance(100));
        }
    }

    #[test]
    fn seeded_dice_repeat() {
        let a = Dice::seeded(42);
        let b = Dice::seeded(42);
        let left: Vec<u32> = (0..32).map(|_| a.percent()).collect();
        let right: Vec<u32> = (0..32).map(|_| b.percent()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn pick_covers_every_item() {
        let dice = Dice::seeded(3);
        let items = ["a", "b", "c"];
        let mut seen = [false; 3];
        for _ in 0..200 {
            let picked = dice.pick(&items).unwrap();
            let idx = items.iter().position(|i| i == picked).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert!(dice.pick::<u8>(&[]).is_none());
    }
}
