//! bench-2048: a bit-packed 2048 engine and a policy benchmark harness
//!
//! This crate provides:
//! - A `Board` packing 16 five-bit tile exponents into a `u128`, with a grid
//!   codec (`engine::encode` / `engine::decode`)
//! - Row move tables covering every 20-bit row, from which all four moves are
//!   derived by mirroring and transposition (`engine::tables`)
//! - Legal-move resolution (`engine::legal_moves`)
//! - A `Policy` trait plus uniform-random, greedy and expectimax policies
//! - A parallel benchmark harness returning raw per-episode outcomes (`harness`)
//!
//! Quick start:
//! ```
//! use bench_2048::engine::{self as GameEngine, Board};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // One-time table init (otherwise done lazily on first move)
//! GameEngine::new();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let legal = b0.legal_moves();
//! assert!(!legal.is_empty());
//! let dir = legal.actions().nth(0).unwrap();
//! assert_eq!(legal.result(dir), Some(b0.shift(dir)));
//! ```
//!
//! Benchmark (seeded, so it replays exactly)
//! ```
//! use bench_2048::harness::{Benchmark, BenchConfig};
//! use bench_2048::policy::UniformRandom;
//!
//! let cfg = BenchConfig { episodes: 8, seed: Some(7), ..Default::default() };
//! let a = Benchmark::new(cfg.clone()).run(&UniformRandom).unwrap();
//! let b = Benchmark::new(cfg).run(&UniformRandom).unwrap();
//! let turns = |r: &bench_2048::harness::BenchReport| r.outcomes.iter().map(|o| o.turns).collect::<Vec<_>>();
//! assert_eq!(turns(&a), turns(&b));
//! ```
//!
pub mod engine;
pub mod expectimax;
pub mod harness;
pub mod policy;
