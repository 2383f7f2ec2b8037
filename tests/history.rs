use cozy_chess::{BitBoard, Move, Square};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use searchcore::search::eval::MATE_BOUND;
use searchcore::search::history::{
    apply_clamped, apply_gravity, build, history_bonus, history_malus, HistoryLayout, MoveHistory,
    CORRECTION_LIMIT, HISTORY_MAX,
};
use searchcore::search::params::{BonusParams, HistoryWeights};
use searchcore::search::stack::SearchStack;
use searchcore::Position;

const LAYOUTS: [HistoryLayout; 2] = [HistoryLayout::Segmented, HistoryLayout::Unified];

fn mv(from: Square, to: Square) -> Move {
    Move { from, to, promotion: None }
}

fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::new();
    pos.board().generate_moves(|ml| {
        out.extend(ml);
        false
    });
    out
}

#[test]
fn gravity_never_leaves_bounds() {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut entry = 0i16;
    for _ in 0..100_000 {
        let bonus = rng.gen_range(-40_000..40_000);
        apply_gravity(&mut entry, bonus);
        assert!((entry as i32).abs() <= HISTORY_MAX, "entry {entry} after bonus {bonus}");
    }
    for _ in 0..100 {
        apply_gravity(&mut entry, i32::MAX);
    }
    assert_eq!(entry as i32, HISTORY_MAX);
}

#[test]
fn repeated_bonus_approaches_the_bound() {
    let mut entry = 0i16;
    let mut prev = 0i16;
    for _ in 0..1000 {
        apply_gravity(&mut entry, 1000);
        assert!(entry >= prev);
        assert!(entry as i32 <= HISTORY_MAX);
        prev = entry;
    }
    assert!(entry as i32 > HISTORY_MAX - 20);
}

#[test]
fn gravity_shrinks_steps_near_the_bound() {
    let mut low = 0i16;
    apply_gravity(&mut low, 1000);
    assert_eq!(low, 1000);
    let mut high = 15_000i16;
    apply_gravity(&mut high, 1000);
    assert!(high - 15_000 < 1000);
}

#[test]
fn correction_saturates_at_limit() {
    let mut entry = 0i16;
    for _ in 0..10 {
        apply_clamped(&mut entry, i32::MAX);
    }
    assert_eq!(entry as i32, CORRECTION_LIMIT);
    apply_clamped(&mut entry, i32::MIN);
    assert_eq!(entry as i32, -CORRECTION_LIMIT);

    let pos = Position::startpos();
    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        for _ in 0..50 {
            h.update_correction(&pos, 1 << 20);
        }
        assert_eq!(h.correction(&pos), CORRECTION_LIMIT, "{layout:?}");
    }
}

#[test]
fn corrected_eval_adds_scaled_correction_and_avoids_mate_range() {
    let pos = Position::startpos();
    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        h.update_correction(&pos, 2560);
        assert_eq!(h.corrected_eval(&pos, 100), 110);
        assert_eq!(h.corrected_eval(&pos, MATE_BOUND + 50), MATE_BOUND - 1);
    }
}

#[test]
fn bonus_and_malus_follow_depth() {
    let p = BonusParams::default();
    assert_eq!(history_bonus(0, &p), 0);
    assert_eq!(history_bonus(1, &p), 50);
    assert_eq!(history_bonus(4, &p), 950);
    assert_eq!(history_bonus(40, &p), 2500);
    assert_eq!(history_malus(4, &p), -950);
}

#[test]
fn quiet_history_is_keyed_by_threats() {
    let pos = Position::startpos();
    let m = mv(Square::G1, Square::F3);
    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        let threatened = Square::F3.bitboard();
        h.update_quiet(&pos, m, threatened, 800);
        assert_eq!(h.quiet_score(&pos, m, threatened), 800);
        assert_eq!(h.quiet_score(&pos, m, BitBoard::EMPTY), 0);
    }
}

#[test]
fn continuation_needs_enough_stack() {
    let mut pos = Position::startpos();
    let mut stack = SearchStack::new();
    let reply = mv(Square::G8, Square::F6);

    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        // At the root there is no previous move.
        h.update_continuation(&pos, reply, &stack, 1000);
        assert_eq!(h.continuation_score(&pos, reply, &stack, 1), 0);
    }

    let first = mv(Square::E2, Square::E4);
    assert!(stack.push_move(&pos, first));
    pos.play(first).unwrap();

    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        h.update_continuation(&pos, reply, &stack, 1000);
        assert_eq!(h.continuation_score(&pos, reply, &stack, 1), 1000, "{layout:?}");
        assert_eq!(h.continuation_score(&pos, reply, &stack, 2), 0);
        assert_eq!(h.continuation_score(&pos, reply, &stack, 4), 0);
        // Offsets outside 1, 2, 4 have no table.
        assert_eq!(h.continuation_score(&pos, reply, &stack, 3), 0);
    }
}

#[test]
fn capture_history_separates_victims() {
    let pos = Position::from_fen("4k3/8/8/3q1r2/4P3/8/8/4K3 w - - 0 1").unwrap();
    let takes_queen = mv(Square::E4, Square::D5);
    let takes_rook = mv(Square::E4, Square::F5);
    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        h.update_capture(&pos, takes_queen, 1200);
        assert_eq!(h.capture_score(&pos, takes_queen), 1200);
        assert_eq!(h.capture_score(&pos, takes_rook), 0);
        let stack = SearchStack::new();
        assert_eq!(h.move_score(&pos, takes_queen, &stack), 1200);
    }
}

#[test]
fn layouts_agree_after_the_same_updates() {
    let params = BonusParams::default();
    let mut seg = build(HistoryLayout::Segmented, HistoryWeights::default());
    let mut uni = build(HistoryLayout::Unified, HistoryWeights::default());
    let mut rng = SmallRng::seed_from_u64(42);

    let mut pos = Position::startpos();
    let mut stack = SearchStack::new();
    for ply in 0..12 {
        let moves = legal_moves(&pos);
        if moves.is_empty() {
            break;
        }
        stack.current_mut().threats = pos.threats();
        let quiets: Vec<Move> = moves.iter().copied().filter(|&m| !pos.is_capture(m)).take(6).collect();
        if let Some(&best) = quiets.last() {
            let bonus = history_bonus(ply % 6 + 1, &params);
            seg.update_quiet_cutoff(&pos, &stack, best, &quiets, bonus);
            uni.update_quiet_cutoff(&pos, &stack, best, &quiets, bonus);
        }
        for &m in moves.iter().filter(|&&m| pos.is_capture(m)) {
            seg.update_capture(&pos, m, 300);
            uni.update_capture(&pos, m, 300);
        }
        seg.update_correction(&pos, 700);
        uni.update_correction(&pos, 700);

        for &m in &moves {
            assert_eq!(seg.move_score(&pos, m, &stack), uni.move_score(&pos, m, &stack), "ply {ply} move {m}");
        }
        assert_eq!(seg.correction(&pos), uni.correction(&pos));

        let next = moves[rng.gen_range(0..moves.len())];
        assert!(stack.push_move(&pos, next));
        pos.play(next).unwrap();
    }
}

#[test]
fn cutoff_rewards_best_and_punishes_the_rest() {
    let pos = Position::startpos();
    let stack = SearchStack::new();
    let best = mv(Square::G1, Square::F3);
    let tried = [mv(Square::A2, Square::A3), mv(Square::H2, Square::H3), best];
    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        h.update_quiet_cutoff(&pos, &stack, best, &tried, 1000);
        assert!(h.move_score(&pos, best, &stack) > 0);
        assert!(h.move_score(&pos, tried[0], &stack) < 0);
        assert!(h.move_score(&pos, tried[1], &stack) < 0);
    }
}

#[test]
fn clear_resets_every_table() {
    let pos = Position::startpos();
    let stack = SearchStack::new();
    let m = mv(Square::B1, Square::C3);
    for layout in LAYOUTS {
        let mut h = build(layout, HistoryWeights::default());
        h.update_quiet(&pos, m, BitBoard::EMPTY, 900);
        h.update_pawn(&pos, m, 900);
        h.update_correction(&pos, 900);
        assert!(h.move_score(&pos, m, &stack) != 0);

        h.clear();
        assert_eq!(h.move_score(&pos, m, &stack), 0, "{layout:?}");
        assert_eq!(h.pawn_score(&pos, m), 0);
        assert_eq!(h.correction(&pos), 0);
        assert_eq!(h.weights(), &HistoryWeights::default());
    }
}
