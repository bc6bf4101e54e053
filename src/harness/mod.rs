//! Batch runner: plays many independent episodes under one policy.
//!
//! Episodes share no state beyond the read-only move tables, so they are
//! spread over a rayon pool. Every episode gets its own seed derived from the
//! batch seed, and outcomes come back in episode order regardless of
//! scheduling, so a seeded run is reproducible on any number of threads.
//!
//! ```
//! use bench_2048::harness::{Benchmark, BenchConfig};
//! use bench_2048::policy::UniformRandom;
//! let cfg = BenchConfig { episodes: 4, max_turns: 50, seed: Some(1), ..Default::default() };
//! let report = Benchmark::new(cfg).run(&UniformRandom).unwrap();
//! assert_eq!(report.policy, "uniform-random");
//! assert_eq!(report.outcomes.len(), 4);
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;

use crate::engine::{self, Board};
use crate::policy::Policy;

mod episode;

pub use episode::{Episode, EpisodeError, EpisodeOutcome, EpisodeStatus};

#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Benchmark settings.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub episodes: usize,
    /// Per-episode cap on applied moves.
    pub max_turns: u64,
    /// Batch seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    pub start: Board,
    /// Tiles spawned before the first turn (1 gives the classic two-tile start).
    pub opening_tiles: usize,
    /// Worker threads; `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_turns: 100_000,
            seed: None,
            start: Board::EMPTY,
            opening_tiles: 0,
            threads: None,
        }
    }
}

/// Raw results of a benchmark run; aggregation is left to the caller.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub policy: String,
    /// Batch seed, for replaying the run.
    pub seed: u64,
    pub outcomes: Vec<EpisodeOutcome>,
    /// Wall-clock time of the whole batch.
    pub elapsed: Duration,
}

impl BenchReport {
    /// Moves applied across every episode.
    pub fn total_turns(&self) -> u64 { self.outcomes.iter().map(|o| o.turns).sum() }
}

pub struct Benchmark {
    cfg: BenchConfig,
}

impl Benchmark {
    pub fn new(cfg: BenchConfig) -> Self { Benchmark { cfg } }

    #[inline]
    pub fn config(&self) -> &BenchConfig { &self.cfg }

    pub fn run<P: Policy + ?Sized>(&self, policy: &P) -> Result<BenchReport, HarnessError> {
        self.run_with_progress(policy, |_| {})
    }

    /// Like [`Self::run`], calling `on_episode` from the worker that finished
    /// each episode (in completion order, not episode order).
    pub fn run_with_progress<P, F>(&self, policy: &P, on_episode: F) -> Result<BenchReport, HarnessError>
    where
        P: Policy + ?Sized,
        F: Fn(&EpisodeOutcome) + Sync,
    {
        // Build tables before the clock starts.
        engine::new();
        let seed = self.cfg.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let episode = Episode {
            start: self.cfg.start,
            opening_tiles: self.cfg.opening_tiles,
            max_turns: self.cfg.max_turns,
        };
        let episodes = self.cfg.episodes;

        let started = Instant::now();
        let play_all = || -> Vec<EpisodeOutcome> {
            (0..episodes)
                .into_par_iter()
                .map(|idx| {
                    let outcome = episode.play(policy, episode_seed(seed, idx as u64));
                    on_episode(&outcome);
                    outcome
                })
                .collect()
        };
        let outcomes = match self.cfg.threads {
            Some(n) => rayon::ThreadPoolBuilder::new().num_threads(n).build()?.install(play_all),
            None => play_all(),
        };

        Ok(BenchReport { policy: policy.name().to_string(), seed, outcomes, elapsed: started.elapsed() })
    }
}

/// Run `episodes` episodes of at most `max_turns` moves each from an empty
/// board, with a random batch seed.
pub fn run<P: Policy + ?Sized>(policy: &P, episodes: usize, max_turns: u64) -> Result<BenchReport, HarnessError> {
    Benchmark::new(BenchConfig { episodes, max_turns, ..Default::default() }).run(policy)
}

/// Seed for episode `idx` of a batch (SplitMix64 over the batch seed).
pub fn episode_seed(batch_seed: u64, idx: u64) -> u64 {
    let mut z = batch_seed.wrapping_add(idx.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::UniformRandom;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn episode_seeds_are_distinct() {
        let seeds: HashSet<u64> = (0..10_000).map(|i| episode_seed(17, i)).collect();
        assert_eq!(seeds.len(), 10_000);
        assert_ne!(episode_seed(1, 0), episode_seed(2, 0));
    }

    #[test]
    fn outcomes_are_in_episode_order() {
        let cfg = BenchConfig { episodes: 32, max_turns: 20, seed: Some(5), ..Default::default() };
        let report = Benchmark::new(cfg).run(&UniformRandom).unwrap();
        assert_eq!(report.outcomes.len(), 32);
        assert_eq!(report.seed, 5);
        for (idx, o) in report.outcomes.iter().enumerate() {
            assert_eq!(o.seed, episode_seed(5, idx as u64));
        }
    }

    #[test]
    fn progress_callback_sees_every_episode() {
        let seen = AtomicUsize::new(0);
        let cfg = BenchConfig { episodes: 10, max_turns: 10, seed: Some(2), threads: Some(2), ..Default::default() };
        let report = Benchmark::new(cfg)
            .run_with_progress(&UniformRandom, |_| {
                seen.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 10);
        assert_eq!(report.total_turns(), 100);
    }

    #[test]
    fn zero_episodes_is_an_empty_report() {
        let report = run(&UniformRandom, 0, 10).unwrap();
        assert!(report.outcomes.is_empty());
    }
}
