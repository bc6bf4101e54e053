use std::collections::BTreeMap;
use std::time::Duration;

use bench_2048::engine as GameEngine;
use bench_2048::harness::{BenchConfig, BenchReport, Benchmark, EpisodeStatus};
use bench_2048::policy::PolicyKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Parser)]
#[command(name = "bench", about = "Benchmark 2048 policies over many seeded episodes")]
struct Args {
    /// Policy to benchmark
    #[arg(short, long, value_enum, default_value_t = PolicyKind::Random)]
    policy: PolicyKind,

    /// Number of episodes
    #[arg(short = 'n', long, default_value_t = 1000)]
    episodes: usize,

    /// Per-episode cap on moves
    #[arg(long, default_value_t = 100_000)]
    max_turns: u64,

    /// Batch seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Tiles spawned before the first turn (1 = classic two-tile start)
    #[arg(long, default_value_t = 0)]
    opening_tiles: usize,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Expectimax depth cap
    #[arg(long)]
    depth: Option<u64>,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.threads == Some(0) {
        anyhow::bail!("--threads must be at least 1");
    }
    GameEngine::new();

    let policy = args.policy.build(args.depth);
    let cfg = BenchConfig {
        episodes: args.episodes,
        max_turns: args.max_turns,
        seed: args.seed,
        opening_tiles: args.opening_tiles,
        threads: args.threads,
        ..Default::default()
    };

    let pb = if !args.quiet {
        let pb = ProgressBar::new(args.episodes as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} episodes ({eta})")?
                .progress_chars("=>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let report = Benchmark::new(cfg).run_with_progress(&policy, |_| {
        if let Some(pb) = &pb { pb.inc(1); }
    })?;
    if let Some(pb) = pb { pb.finish_and_clear(); }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &BenchReport) {
    let n = report.outcomes.len();
    println!("policy: {} | seed: {} | episodes: {}", report.policy, report.seed, n);
    if n == 0 {
        return;
    }

    let (mut game_over, mut turn_limit, mut aborted) = (0usize, 0usize, 0usize);
    for (idx, o) in report.outcomes.iter().enumerate() {
        match &o.status {
            EpisodeStatus::GameOver => game_over += 1,
            EpisodeStatus::TurnLimit => turn_limit += 1,
            EpisodeStatus::Aborted(err) => {
                aborted += 1;
                eprintln!("episode {idx} (seed {}) aborted: {err}", o.seed);
            }
        }
    }
    println!("game over: {game_over} | turn limit: {turn_limit} | aborted: {aborted}");

    let mut turns: Vec<u64> = report.outcomes.iter().map(|o| o.turns).collect();
    turns.sort_unstable();
    let total = report.total_turns();
    println!(
        "turns: mean {:.1} | median {} | min {} | max {}",
        total as f64 / n as f64,
        turns[n / 2],
        turns[0],
        turns[n - 1]
    );

    let mut scores: Vec<u64> = report.outcomes.iter().map(|o| o.score).collect();
    scores.sort_unstable();
    let mean_score = scores.iter().map(|&s| s as f64).sum::<f64>() / n as f64;
    println!("score: mean {:.1} | median {} | max {}", mean_score, scores[n / 2], scores[n - 1]);

    let mut tiles: BTreeMap<u64, usize> = BTreeMap::new();
    for o in &report.outcomes {
        *tiles.entry(o.max_tile).or_default() += 1;
    }
    println!("max tile reached:");
    for (tile, count) in tiles.iter().rev() {
        println!("  {:>10}: {:>6} ({:.1}%)", tile, count, 100.0 * *count as f64 / n as f64);
    }

    let elapsed = report.elapsed.as_secs_f64().max(1e-6);
    println!(
        "elapsed: {:.2}s | episodes/sec: {:.1} | moves/sec: {:.1}",
        elapsed,
        n as f64 / elapsed,
        total as f64 / elapsed
    );
}
