use cozy_chess::{Move, Square};
use searchcore::search::see::static_exchange;
use searchcore::Position;

fn mv(from: Square, to: Square) -> Move {
    Move { from, to, promotion: None }
}

fn see(fen: &str, from: Square, to: Square, threshold: i32) -> bool {
    let pos = Position::from_fen(fen).unwrap();
    static_exchange(&pos, mv(from, to), threshold)
}

#[test]
fn pawn_takes_hanging_queen() {
    let fen = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";
    assert!(see(fen, Square::E4, Square::D5, 0));
    assert!(see(fen, Square::E4, Square::D5, 800));
    assert!(!see(fen, Square::E4, Square::D5, 901));
}

#[test]
fn queen_takes_defended_pawn() {
    let fen = "4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1";
    assert!(!see(fen, Square::D1, Square::D5, 0));
    assert!(see(fen, Square::D1, Square::D5, -800));
}

#[test]
fn king_cannot_capture_into_defended_square() {
    let defended = "4k3/8/8/b7/8/8/3p4/4K3 w - - 0 1";
    assert!(!see(defended, Square::E1, Square::D2, 0));
    let loose = "4k3/8/8/8/8/8/3p4/4K3 w - - 0 1";
    assert!(see(loose, Square::E1, Square::D2, 0));
}

#[test]
fn king_recapture_blocked_by_second_attacker() {
    // Rxd5: the e6 king may retake only if the b3 bishop is gone.
    let backed = "8/8/4k3/3p4/8/1B6/8/3RK3 w - - 0 1";
    assert!(see(backed, Square::D1, Square::D5, 0));
    let alone = "8/8/4k3/3p4/8/8/8/3RK3 w - - 0 1";
    assert!(!see(alone, Square::D1, Square::D5, 0));
}

#[test]
fn pinned_defender_does_not_recapture() {
    let free = "7k/8/5n2/3p4/8/2N5/8/4K3 w - - 0 1";
    assert!(!see(free, Square::C3, Square::D5, 0));
    // The d4 bishop pins f6 to h8.
    let pinned = "7k/8/5n2/3p4/3B4/2N5/8/4K3 w - - 0 1";
    assert!(see(pinned, Square::C3, Square::D5, 0));
}

#[test]
fn pinned_piece_recaptures_along_its_pin_line() {
    // The e2 rook pins e5 to the e8 king, but e2 is on that file, so after
    // Rxe2 Nxe2 the e5 rook may still take back.
    let fen = "4k3/8/8/4r3/8/8/2r1R3/K1N5 b - - 0 1";
    assert!(see(fen, Square::C2, Square::E2, 100));
    assert!(see(fen, Square::C2, Square::E2, 320));
    assert!(!see(fen, Square::C2, Square::E2, 321));
}

#[test]
fn xray_attacker_joins_behind_slider() {
    // The d1 rook backs d3 through the x-ray: Rxd6 Rxd6 Rxd6 nets the pawn.
    let fen = "3r2k1/8/3p4/8/8/3R4/8/3RK3 w - - 0 1";
    assert!(see(fen, Square::D3, Square::D6, 0));
    assert!(see(fen, Square::D3, Square::D6, 100));
    assert!(!see(fen, Square::D3, Square::D6, 101));
}

#[test]
fn en_passant_and_castling_use_threshold_only() {
    let ep = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2";
    assert!(see(ep, Square::E5, Square::D6, 0));
    assert!(!see(ep, Square::E5, Square::D6, 1));

    let castle = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    assert!(see(castle, Square::E1, Square::H1, 0));
    assert!(!see(castle, Square::E1, Square::H1, 50));
}
