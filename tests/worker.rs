use cozy_chess::{BitBoard, Move, Square};
use searchcore::eval::MaterialOracle;
use searchcore::search::history::HistoryLayout;
use searchcore::search::params::CoreConfig;
use searchcore::search::tt::{Bound, Entry};
use searchcore::search::{MoveHistory, SearchCore};
use searchcore::Position;

fn small_core(threads: usize) -> SearchCore {
    SearchCore::new(CoreConfig { hash_mb: 1, threads, ..CoreConfig::default() }).unwrap()
}

#[test]
fn invalid_config_is_refused() {
    assert!(SearchCore::new(CoreConfig { hash_mb: 0, ..CoreConfig::default() }).is_err());
}

#[test]
fn workers_share_one_table() {
    let core = small_core(3);
    let workers = core.workers();
    assert_eq!(workers.len(), 3);
    assert_eq!(workers.iter().map(|w| w.id).collect::<Vec<_>>(), vec![0, 1, 2]);

    let key = 0xFEED;
    let slot = core.tt().probe(key);
    core.tt().save(slot, Entry { depth: 4, score: 12, bound: Bound::Exact, ..Entry::default() }, key, 0, false);
    let other = std::sync::Arc::clone(core.tt());
    assert_eq!(other.get(key, 0).map(|e| e.score), Some(12));
}

#[test]
fn worker_evaluation_is_cached() {
    let core = small_core(1);
    let mut w = core.worker(0);
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
    let first = w.evaluate(&pos, &MaterialOracle);
    assert_eq!(w.eval_cache.probe(pos.zobrist()), Some(first));
    // Scaled: 900 * (26909 + 900) / 32768
    assert_eq!(first, 763);
}

#[test]
fn new_search_ages_and_new_game_clears() {
    let core = small_core(2);
    let mut workers = core.workers();
    let pos = Position::startpos();
    let m = Move { from: Square::G1, to: Square::F3, promotion: None };

    let key = 0xBEEF;
    let slot = core.tt().probe(key);
    core.tt().save(slot, Entry { depth: 2, score: 1, bound: Bound::Lower, ..Entry::default() }, key, 0, false);
    for w in workers.iter_mut() {
        w.history.update_quiet(&pos, m, BitBoard::EMPTY, 500);
        w.evaluate(&pos, &MaterialOracle);
        w.stack.push_move(&pos, m);
        w.new_search();
        assert_eq!(w.stack.ply(), 0);
        assert_eq!(w.history.quiet_score(&pos, m, BitBoard::EMPTY), 500);
    }

    core.new_search();
    core.new_search();
    assert_eq!(core.tt().generation(), 2);

    core.new_game(&mut workers).unwrap();
    assert_eq!(core.tt().generation(), 0);
    assert!(core.tt().get(key, 0).is_none());
    for w in &workers {
        assert_eq!(w.history.quiet_score(&pos, m, BitBoard::EMPTY), 0);
        assert_eq!(w.eval_cache.probe(pos.zobrist()), None);
    }
}

#[test]
fn unified_layout_is_selectable() {
    let core = SearchCore::new(CoreConfig {
        hash_mb: 1,
        history_layout: HistoryLayout::Unified,
        ..CoreConfig::default()
    })
    .unwrap();
    let mut w = core.worker(0);
    let pos = Position::startpos();
    w.history.update_correction(&pos, 512);
    assert_eq!(w.history.correction(&pos), 512);
}
