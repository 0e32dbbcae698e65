mod common;

use common::sq;
use duel::chess::{Board, Color, Move, Piece, PieceType, INITIAL_PLACEMENT};
use duel::game::{GameError, GameSession};
use duel::messages::ServerMessage;
use duel::chess::TurnError;
use std::collections::BTreeSet;

fn set(names: &[&str]) -> BTreeSet<duel::Position> {
    names.iter().map(|n| sq(n)).collect()
}

fn seated(color: Color) -> GameSession {
    let mut session = GameSession::new();
    session
        .handle_server_message(ServerMessage::PlayerAssigned {
            color,
            opponent_connected: true,
        })
        .unwrap();
    session
}

/// Play `moves` alternately starting with White, mirroring each on the other replica
fn play_both(white: &mut GameSession, black: &mut GameSession, moves: &[&str]) {
    for (i, text) in moves.iter().enumerate() {
        let mv: Move = text.parse().unwrap();
        let (mover, other) = if i % 2 == 0 {
            (&mut *white, &mut *black)
        } else {
            (&mut *black, &mut *white)
        };
        let outcome = mover.request_move(mv.from, mv.to).unwrap();
        other.apply_remote_move(outcome.mv).unwrap();
    }
}

#[cfg(test)]
mod move_generation_tests {
    use super::*;

    #[test]
    fn test_lone_pawn_on_home_rank() {
        let board = Board::from_placement("8/8/8/8/8/8/4P3/8").unwrap();
        assert_eq!(board.legal_targets(sq("e2")), set(&["e3", "e4"]));
    }

    #[test]
    fn test_rook_ray_stops_at_capture() {
        let board = Board::from_placement("8/8/3p4/8/3R4/8/8/8").unwrap();
        let targets = board.legal_targets(sq("d4"));
        assert!(targets.contains(&sq("d5")));
        assert!(targets.contains(&sq("d6")));
        assert!(!targets.contains(&sq("d7")));
        assert!(!targets.contains(&sq("d8")));
    }

    #[test]
    fn test_empty_origin_has_no_targets() {
        let board = Board::new();
        assert!(board.legal_targets(sq("e4")).is_empty());
    }

    #[test]
    fn test_generation_does_not_mutate() {
        let board = Board::new();
        for pos in duel::Position::all_positions() {
            let _ = board.legal_targets(pos);
        }
        assert_eq!(board.to_placement(), INITIAL_PLACEMENT);
    }

    #[test]
    fn test_opening_position_mobility() {
        let board = Board::new();
        let total: usize = board
            .pieces()
            .filter(|(_, piece)| piece.color == Color::White)
            .map(|(pos, _)| board.legal_targets(pos).len())
            .sum();
        // 16 pawn moves plus two squares for each knight
        assert_eq!(total, 20);
    }
}

/// Scattered friendly (white) and enemy (black) pawns to block rays
const SWEEP_PLACEMENT: &str = "8/1p3P2/8/3p4/5P2/2p5/6P1/8";

const SWEEP_PIECES: [PieceType; 5] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
];

/// Every free square of the sweep board with a white `piece_type` placed on it
fn sweep_boards(piece_type: PieceType) -> Vec<(Board, duel::Position)> {
    let blockers = Board::from_placement(SWEEP_PLACEMENT).unwrap();
    duel::Position::all_positions()
        .filter(|&origin| blockers.is_empty_at(origin))
        .map(|origin| {
            let mut board = blockers.clone();
            board
                .set_piece(origin, Some(Piece::new(piece_type, Color::White)))
                .unwrap();
            (board, origin)
        })
        .collect()
}

fn deltas(from: duel::Position, to: duel::Position) -> (i8, i8) {
    (to.file as i8 - from.file as i8, to.rank as i8 - from.rank as i8)
}

#[cfg(test)]
mod board_sweep_tests {
    use super::*;

    #[test]
    fn test_sliders_stop_at_first_blocker() {
        for piece_type in [PieceType::Rook, PieceType::Bishop, PieceType::Queen] {
            for (board, origin) in sweep_boards(piece_type) {
                for target in board.legal_targets(origin) {
                    let (df, dr) = deltas(origin, target);
                    let step = (df.signum(), dr.signum());
                    let between: Vec<_> = origin
                        .ray(step.0, step.1)
                        .take_while(|&pos| pos != target)
                        .collect();
                    assert!(
                        between.iter().all(|&pos| board.is_empty_at(pos)),
                        "{:?} on {} jumps a blocker to reach {}",
                        piece_type,
                        origin,
                        target
                    );
                    assert!(!board.get_piece(target).is_some_and(|p| p.color == Color::White));
                }

                // Nothing past the first occupied square of any ray
                let targets = board.legal_targets(origin);
                for (df, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)] {
                    let beyond = origin.ray(df, dr).skip_while(|&pos| board.is_empty_at(pos)).skip(1);
                    for pos in beyond {
                        assert!(
                            !targets.contains(&pos),
                            "{:?} on {} reaches {} past a blocker",
                            piece_type,
                            origin,
                            pos
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_step_movers_stay_on_board() {
        let shapes: [(PieceType, fn(i8, i8) -> bool); 2] = [
            (PieceType::Knight, |df, dr| {
                matches!((df.abs(), dr.abs()), (1, 2) | (2, 1))
            }),
            (PieceType::King, |df, dr| df.abs().max(dr.abs()) == 1),
        ];

        for (piece_type, shape) in shapes {
            for (board, origin) in sweep_boards(piece_type) {
                let targets = board.legal_targets(origin);
                let mut expected = 0;
                for df in -2i8..=2 {
                    for dr in -2i8..=2 {
                        let file = origin.file as i8 + df;
                        let rank = origin.rank as i8 + dr;
                        if !shape(df, dr) || !(0..8).contains(&file) || !(0..8).contains(&rank) {
                            continue;
                        }
                        let pos = duel::Position::new(file as u8, rank as u8).unwrap();
                        if !board.get_piece(pos).is_some_and(|p| p.color == Color::White) {
                            expected += 1;
                        }
                    }
                }

                assert_eq!(targets.len(), expected, "{:?} on {}", piece_type, origin);
                for target in targets {
                    assert!(target.file < 8 && target.rank < 8);
                    let (df, dr) = deltas(origin, target);
                    assert!(shape(df, dr), "{:?} on {} reaches {}", piece_type, origin, target);
                }
            }
        }
    }

    #[test]
    fn test_quiet_move_then_reverse_restores_board() {
        for piece_type in SWEEP_PIECES {
            for (board, origin) in sweep_boards(piece_type) {
                for target in board.legal_targets(origin) {
                    if !board.is_empty_at(target) {
                        continue;
                    }
                    let mv = Move::new_unchecked(origin, target);
                    let mut replayed = board.clone();
                    let forward = replayed.apply_move(mv).unwrap();
                    assert!(forward.captured.is_none());
                    assert!(!forward.promoted);

                    replayed.apply_move(mv.reversed()).unwrap();
                    assert_eq!(replayed, board, "{:?} {} then back", piece_type, mv);
                    assert_eq!(
                        replayed.get_piece(origin),
                        Some(Piece::new(piece_type, Color::White))
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod move_application_tests {
    use super::*;

    #[test]
    fn test_promotion_on_empty_board() {
        let mut board = Board::from_placement("8/4P3/8/8/8/8/8/8").unwrap();
        let outcome = board
            .apply_move(Move::new(sq("e7"), sq("e8")).unwrap())
            .unwrap();
        assert!(outcome.promoted);
        assert_eq!(
            board.get_piece(sq("e8")),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert_eq!(board.get_piece(sq("e7")), None);
    }

    #[test]
    fn test_black_promotes_on_first_rank() {
        let mut board = Board::from_placement("8/8/8/8/8/8/3p4/2N5").unwrap();
        let outcome = board
            .apply_move(Move::new(sq("d2"), sq("c1")).unwrap())
            .unwrap();
        assert!(outcome.promoted);
        assert_eq!(
            outcome.captured,
            Some(Piece::new(PieceType::Knight, Color::White))
        );
        assert_eq!(
            board.get_piece(sq("c1")),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
    }

    #[test]
    fn test_capture_removes_target() {
        let mut board = Board::from_placement("8/8/3p4/8/3R4/8/8/8").unwrap();
        board
            .apply_move(Move::new(sq("d4"), sq("d6")).unwrap())
            .unwrap();
        assert_eq!(board.piece_count(), 1);
        assert_eq!(
            board.get_piece(sq("d6")),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
    }
}

#[cfg(test)]
mod turn_sync_tests {
    use super::*;

    #[test]
    fn test_second_white_move_rejected_before_black_replies() {
        let mut white = seated(Color::White);
        let mut black = seated(Color::Black);
        play_both(&mut white, &mut black, &["e2e4"]);

        let before = white.board().clone();
        assert_eq!(
            white.request_move(sq("d2"), sq("d4")),
            Err(GameError::Turn(TurnError::OutOfTurn {
                expected: Color::Black,
                got: Color::White
            }))
        );
        assert_eq!(white.board(), &before);
        assert_eq!(white.turn(), Color::Black);
    }

    #[test]
    fn test_replicas_converge_over_a_game() {
        let mut white = seated(Color::White);
        let mut black = seated(Color::Black);
        play_both(
            &mut white,
            &mut black,
            &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"],
        );

        assert_eq!(white.board(), black.board());
        assert_eq!(white.turn(), black.turn());
        assert_eq!(white.turn(), Color::Black);
        assert_eq!(white.fingerprint(), black.fingerprint());
        assert_eq!(
            white.board().get_piece(sq("f7")),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert_eq!(white.board().piece_count(), 31);
    }

    #[test]
    fn test_reset_mid_game_restores_initial_state() {
        let mut white = seated(Color::White);
        let mut black = seated(Color::Black);
        play_both(&mut white, &mut black, &["e2e4", "d7d5", "e4d5"]);

        for session in [&mut white, &mut black] {
            session.handle_server_message(ServerMessage::GameReset).unwrap();
            assert_eq!(session.board().to_placement(), INITIAL_PLACEMENT);
            assert_eq!(session.board().piece_count(), 32);
            assert_eq!(session.turn(), Color::White);
        }
        assert_eq!(white.fingerprint(), black.fingerprint());
    }

    #[test]
    fn test_reset_is_allowed_out_of_turn_and_when_inactive() {
        let mut white = seated(Color::White);
        let mut black = seated(Color::Black);
        play_both(&mut white, &mut black, &["g1f3"]);
        white
            .handle_server_message(ServerMessage::OpponentDisconnected)
            .unwrap();

        white.handle_server_message(ServerMessage::GameReset).unwrap();
        assert_eq!(white.turn(), Color::White);
        assert_eq!(white.board(), &Board::new());
    }

    #[test]
    fn test_promotion_agrees_across_replicas() {
        let mut white = seated(Color::White);
        let mut black = seated(Color::Black);
        let board = Board::from_placement("7k/1P6/8/8/8/8/8/K7").unwrap();
        white.set_board(board.clone());
        black.set_board(board);

        let outcome = white.request_move(sq("b7"), sq("b8")).unwrap();
        assert!(outcome.promoted);
        black.apply_remote_move(outcome.mv).unwrap();

        assert_eq!(white.board(), black.board());
        assert_eq!(
            black.board().get_piece(sq("b8")),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
    }
}
