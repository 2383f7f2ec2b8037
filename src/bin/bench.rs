use anyhow::{Context, Result};
use clap::Parser;
use cozy_chess::Move;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use searchcore::eval::MaterialOracle;
use searchcore::search::history::history_bonus;
use searchcore::search::params::CoreConfig;
use searchcore::search::see::static_exchange;
use searchcore::search::tt::{Bound, Entry};
use searchcore::search::{MoveHistory, SearchCore};
use searchcore::Position;
use std::time::Instant;

const DEFAULT_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

#[derive(Parser, Debug)]
#[command(name = "core-bench", version, about = "Time SEE, history, evaluation and transposition-table workloads")]
struct Args {
    /// Optional JSON config; flags below override its values
    #[arg(long)]
    config: Option<String>,

    /// File with one FEN per line (defaults to a built-in set)
    #[arg(long)]
    fens: Option<String>,

    /// Passes over the position set
    #[arg(long, default_value_t = 200)]
    iterations: u64,

    /// Threads for the table workload
    #[arg(long)]
    threads: Option<usize>,

    /// Transposition table size in MB
    #[arg(long)]
    hash_mb: Option<usize>,

    /// Probe/save operations per thread
    #[arg(long, default_value_t = 1_000_000)]
    tt_ops: u64,
}

fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::new();
    pos.board().generate_moves(|ml| {
        out.extend(ml);
        false
    });
    out
}

fn load_positions(path: Option<&str>) -> Result<Vec<Position>> {
    let text;
    let lines: Vec<&str> = match path {
        Some(p) => {
            text = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
            text.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')).collect()
        }
        None => DEFAULT_FENS.to_vec(),
    };
    lines
        .into_iter()
        .map(|fen| Position::from_fen(fen).with_context(|| format!("bad FEN: {fen}")))
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = match args.config.as_deref() {
        Some(p) => CoreConfig::load(p)?,
        None => CoreConfig::default(),
    };
    if let Some(t) = args.threads { cfg.threads = t; }
    if let Some(mb) = args.hash_mb { cfg.hash_mb = mb; }
    let core = SearchCore::new(cfg)?;
    let positions = load_positions(args.fens.as_deref())?;
    let moves: Vec<Vec<Move>> = positions.iter().map(legal_moves).collect();
    let total_moves: usize = moves.iter().map(Vec::len).sum();
    log::info!("{} positions, {} moves, {} iterations", positions.len(), total_moves, args.iterations);

    let progress = ProgressBar::new(args.iterations);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("progress template")?,
    );

    let mut worker = core.worker(0);
    let bonus = history_bonus(6, &core.config().bonus);
    let (mut see_ns, mut hist_ns, mut eval_ns) = (0u128, 0u128, 0u128);
    let (mut see_wins, mut checksum) = (0u64, 0i64);

    for _ in 0..args.iterations {
        for (pos, mvs) in positions.iter().zip(&moves) {
            let t = Instant::now();
            for &mv in mvs.iter().filter(|&&m| pos.is_capture(m)) {
                see_wins += static_exchange(pos, mv, 0) as u64;
            }
            see_ns += t.elapsed().as_nanos();

            let t = Instant::now();
            worker.stack.current_mut().threats = pos.threats();
            for &mv in mvs {
                checksum += worker.history.move_score(pos, mv, &worker.stack) as i64;
            }
            if let Some(&best) = mvs.first() {
                worker.history.update_quiet_cutoff(pos, &worker.stack, best, mvs, bonus);
            }
            hist_ns += t.elapsed().as_nanos();

            let t = Instant::now();
            checksum += worker.evaluate(pos, &MaterialOracle) as i64;
            eval_ns += t.elapsed().as_nanos();
        }
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let threads = core.config().threads;
    let tt = core.tt();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let t = Instant::now();
    let hits: u64 = pool.install(|| {
        (0..threads as u64)
            .into_par_iter()
            .map(|id| {
                let mut rng = SmallRng::seed_from_u64(id);
                let mut hits = 0u64;
                for _ in 0..args.tt_ops {
                    // Narrow key space so probes revisit earlier saves.
                    let key: u64 = rng.gen::<u64>() & 0xFFFF_0000_00FF_FFFF;
                    if tt.get(key, 0).is_some() {
                        hits += 1;
                    }
                    let slot = tt.probe(key);
                    let entry = Entry { depth: rng.gen_range(1..20), score: rng.gen_range(-500..500), bound: Bound::Lower, ..Entry::default() };
                    tt.save(slot, entry, key, 0, false);
                }
                hits
            })
            .sum()
    });
    let tt_elapsed = t.elapsed();

    let per = |ns: u128, n: usize| if n == 0 { 0.0 } else { ns as f64 / n as f64 };
    let iters = args.iterations as usize;
    println!("see:     {:.1} ns/position  wins={}", per(see_ns, positions.len() * iters), see_wins);
    println!("history: {:.1} ns/move", per(hist_ns, total_moves * iters));
    println!("eval:    {:.1} ns/position  checksum={}", per(eval_ns, positions.len() * iters), checksum);
    let ops = args.tt_ops as f64 * threads as f64;
    println!(
        "tt:      {:.2} Mops/s on {} threads  hits={} hashfull={}",
        ops / tt_elapsed.as_secs_f64().max(1e-9) / 1e6,
        threads,
        hits,
        tt.hash_full()
    );

    let t = Instant::now();
    core.tt().clear(threads)?;
    println!("clear:   {:.3} ms", t.elapsed().as_secs_f64() * 1e3);
    Ok(())
}
