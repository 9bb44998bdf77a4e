use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every random decision the engine makes goes through here.
pub(crate) trait RandomSource {
    /// Uniform index in `0..len`.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform integer in `lo..=hi`.
    fn between(&mut self, lo: u32, hi: u32) -> u32;

    /// Index into `weights`, drawn proportionally to each weight.
    fn weighted(&mut self, weights: &[f64]) -> usize;
}

pub(crate) fn choose<T: Copy>(rng: &mut impl RandomSource, items: &[T]) -> T {
    items[rng.pick(items.len()).min(items.len() - 1)]
}

pub(crate) struct Dice<R = StdRng> {
    rng: R,
}

impl Dice<StdRng> {
    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> RandomSource for Dice<R> {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    fn between(&mut self, lo: u32, hi: u32) -> u32 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    fn weighted(&mut self, weights: &[f64]) -> usize {
        match WeightedIndex::new(weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(e) => {
                tracing::warn!(error = %e, "unusable weights, taking first option");
                0
            }
        }
    }
}

/// Replays queued answers; an exhausted queue answers with the lowest option.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct Scripted {
    picks: std::collections::VecDeque<usize>,
    betweens: std::collections::VecDeque<u32>,
    weighted: std::collections::VecDeque<usize>,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn picks(mut self, i: usize) -> Self {
        self.picks.push_back(i);
        self
    }

    pub(crate) fn rolls(mut self, v: u32) -> Self {
        self.betweens.push_back(v);
        self
    }

    pub(crate) fn outcomes(mut self, i: usize) -> Self {
        self.weighted.push_back(i);
        self
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }

    fn between(&mut self, lo: u32, hi: u32) -> u32 {
        self.betweens.pop_front().unwrap_or(lo).clamp(lo, hi)
    }

    fn weighted(&mut self, weights: &[f64]) -> usize {
        self.weighted
            .pop_front()
            .unwrap_or(0)
            .min(weights.len().saturating_sub(1))
    }
}
