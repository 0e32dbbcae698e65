mod common;

use common::{spawn_relay, sq, TestPeer};
use duel::chess::Color;
use duel::messages::{ClientMessage, ServerMessage};
use std::time::Duration;

async fn seat_two() -> (TestPeer, TestPeer, tokio::task::JoinHandle<()>) {
    let (addr, relay) = spawn_relay().await;

    let mut white = TestPeer::connect(addr).await;
    assert_eq!(
        white.recv().await,
        ServerMessage::PlayerAssigned {
            color: Color::White,
            opponent_connected: false
        }
    );

    let mut black = TestPeer::connect(addr).await;
    assert_eq!(
        black.recv().await,
        ServerMessage::PlayerAssigned {
            color: Color::Black,
            opponent_connected: true
        }
    );
    assert_eq!(white.recv().await, ServerMessage::OpponentConnected);

    (white, black, relay)
}

#[cfg(test)]
mod seating_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_two_peers_get_both_colors() {
        let (_white, _black, relay) = seat_two().await;
        relay.abort();
    }

    #[tokio::test]
    async fn test_third_peer_gets_game_full_and_is_closed() {
        let (addr, relay) = spawn_relay().await;
        let mut white = TestPeer::connect(addr).await;
        white.recv().await;
        let mut black = TestPeer::connect(addr).await;
        black.recv().await;
        white.recv().await;

        let mut third = TestPeer::connect(addr).await;
        assert_eq!(third.recv().await, ServerMessage::GameFull);
        assert!(third.try_recv().await.unwrap_err().is_closed());

        // The seated players are unaffected
        white.expect_silence(Duration::from_millis(100)).await;
        black.expect_silence(Duration::from_millis(100)).await;
        relay.abort();
    }

    #[tokio::test]
    async fn test_replacement_peer_takes_free_seat() {
        let (addr, relay) = spawn_relay().await;
        let mut white = TestPeer::connect(addr).await;
        white.recv().await;
        let mut black = TestPeer::connect(addr).await;
        black.recv().await;
        white.recv().await;

        white.close().await;
        assert_eq!(black.recv().await, ServerMessage::OpponentDisconnected);

        let mut replacement = TestPeer::connect(addr).await;
        assert_eq!(
            replacement.recv().await,
            ServerMessage::PlayerAssigned {
                color: Color::White,
                opponent_connected: true
            }
        );
        assert_eq!(black.recv().await, ServerMessage::OpponentConnected);
        relay.abort();
    }
}

#[cfg(test)]
mod forwarding_tests {
    use super::*;

    #[tokio::test]
    async fn test_move_forwarded_to_opponent_only() {
        let (mut white, mut black, relay) = seat_two().await;

        white
            .send(ClientMessage::MakeMove {
                from: sq("e2"),
                to: sq("e4"),
            })
            .await;
        assert_eq!(
            black.recv().await,
            ServerMessage::MoveMade {
                from: sq("e2"),
                to: sq("e4")
            }
        );
        white.expect_silence(Duration::from_millis(100)).await;
        relay.abort();
    }

    #[tokio::test]
    async fn test_relay_does_not_judge_moves() {
        let (mut white, mut black, relay) = seat_two().await;

        // Nonsense for the rules, but the relay forwards it anyway
        black
            .send(ClientMessage::MakeMove {
                from: sq("a1"),
                to: sq("h8"),
            })
            .await;
        assert_eq!(
            white.recv().await,
            ServerMessage::MoveMade {
                from: sq("a1"),
                to: sq("h8")
            }
        );
        relay.abort();
    }

    #[tokio::test]
    async fn test_moves_arrive_in_send_order() {
        let (mut white, mut black, relay) = seat_two().await;
        let moves = [("e2", "e4"), ("d2", "d4"), ("g1", "f3")];
        for (from, to) in moves {
            white
                .send(ClientMessage::MakeMove {
                    from: sq(from),
                    to: sq(to),
                })
                .await;
        }
        for (from, to) in moves {
            assert_eq!(
                black.recv().await,
                ServerMessage::MoveMade {
                    from: sq(from),
                    to: sq(to)
                }
            );
        }
        relay.abort();
    }

    #[tokio::test]
    async fn test_reset_broadcast_to_both() {
        let (mut white, mut black, relay) = seat_two().await;
        black.send(ClientMessage::ResetGame).await;
        assert_eq!(white.recv().await, ServerMessage::GameReset);
        assert_eq!(black.recv().await, ServerMessage::GameReset);
        relay.abort();
    }

    #[tokio::test]
    async fn test_move_without_opponent_is_dropped() {
        let (addr, relay) = spawn_relay().await;
        let mut white = TestPeer::connect(addr).await;
        white.recv().await;

        white
            .send(ClientMessage::MakeMove {
                from: sq("e2"),
                to: sq("e4"),
            })
            .await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut black = TestPeer::connect(addr).await;
        assert_eq!(
            black.recv().await,
            ServerMessage::PlayerAssigned {
                color: Color::Black,
                opponent_connected: true
            }
        );
        black.expect_silence(Duration::from_millis(100)).await;
        relay.abort();
    }

    #[tokio::test]
    async fn test_disconnect_notifies_remaining_peer() {
        let (white, mut black, relay) = seat_two().await;
        white.close().await;
        assert_eq!(black.recv().await, ServerMessage::OpponentDisconnected);
        relay.abort();
    }
}
