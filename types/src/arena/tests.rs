use super::*;
use commonware_codec::{Encode, EncodeSize, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, Signer};

fn session() -> GameSession {
    let player1 = PrivateKey::from_seed(1).public_key();
    let player2 = PrivateKey::from_seed(2).public_key();
    GameSession {
        id: 1,
        player1: player1.clone(),
        player2,
        current_move_user: player1,
        last_move_height: 40,
        winner: None,
        move_count: 0,
        state_blob: Board::empty(BOARD_SIZE).encode().to_vec(),
    }
}

#[test]
fn test_default_config_matches_constants() {
    let config = MatchConfig::default();
    assert_eq!(config.round_size, 20);
    assert_eq!(config.entry_fee, 1_000_000_000);
    assert_eq!(config.move_timeout, 12);
    assert_eq!(config.board_size, 15);
    assert_eq!(config.line_length, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_round_id_buckets_heights() {
    let config = MatchConfig::default();
    assert_eq!(config.round_id(0), 0);
    assert_eq!(config.round_id(19), 0);
    assert_eq!(config.round_id(20), 1);
    assert_eq!(config.round_id(45), 2);
}

#[test]
fn test_config_validation_rejects_bad_values() {
    let zero_round = MatchConfig {
        round_size: 0,
        ..Default::default()
    };
    assert_eq!(
        zero_round.validate(),
        Err(ConfigError::InvalidNonZero {
            field: "round_size"
        })
    );

    let long_line = MatchConfig {
        board_size: 4,
        ..Default::default()
    };
    assert_eq!(
        long_line.validate(),
        Err(ConfigError::LineLongerThanBoard {
            line_length: 5,
            board_size: 4
        })
    );

    let huge = MatchConfig {
        board_size: MAX_BOARD_SIZE + 1,
        ..Default::default()
    };
    assert!(matches!(
        huge.validate(),
        Err(ConfigError::BoardTooLarge { .. })
    ));
}

#[test]
fn test_config_partial_overrides() {
    let config: MatchConfig = serde_json::from_str(r#"{"move_timeout": 3}"#).unwrap();
    assert_eq!(config.move_timeout, 3);
    assert_eq!(config.round_size, ROUND_SIZE);

    let config: MatchConfig = serde_yaml::from_str("board_size: 9\nline_length: 4\n").unwrap();
    assert_eq!(config.board_size, 9);
    assert_eq!(config.line_length, 4);

    assert!(serde_json::from_str::<MatchConfig>(r#"{"bogus": 1}"#).is_err());
}

#[test]
fn test_error_codes_are_unique_and_reversible() {
    for code in 0..=u8::MAX {
        if let Some(error) = MatchError::from_code(code) {
            assert_eq!(error.code(), code);
        }
    }
    assert_eq!(MatchError::from_code(0), None);
    assert_eq!(MatchError::AlreadyInGame.code(), 1);
    assert_eq!(MatchError::InvalidPayload.code(), 13);
}

#[test]
fn test_board_addressing() {
    let mut board = Board::empty(15);
    assert!(board.set(3, 4, 2));
    assert_eq!(board.get(3, 4), Some(2));
    assert_eq!(board.cells()[3 * 15 + 4], 2);
    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, 15), None);
    assert!(!board.set(15, 0, 1));
}

#[test]
fn test_board_from_rows_requires_square() {
    assert!(Board::from_rows(&[vec![0, 1], vec![2, 0]]).is_some());
    assert!(Board::from_rows(&[vec![0, 1], vec![2]]).is_none());
}

#[test]
fn test_board_decode_rejects_truncated_cells() {
    let encoded = Board::empty(15).encode();
    assert!(Board::read(&mut &encoded[..encoded.len() - 1]).is_err());
    let oversized = [MAX_BOARD_SIZE + 1];
    assert!(Board::read(&mut &oversized[..]).is_err());
}

#[test]
fn test_board_digest_tracks_cells() {
    let empty = Board::empty(15);
    let mut marked = empty.clone();
    marked.set(7, 7, 1);
    assert_ne!(empty.digest(), marked.digest());
    assert_eq!(empty.digest(), Board::empty(15).digest());
}

#[test]
fn test_witness_direction_check() {
    assert!(WinWitness::NONE.assert_correct().is_ok());
    assert!(!WinWitness::NONE.is_claim());
    let diagonal = WinWitness {
        x: 4,
        y: 0,
        direction_x: -1,
        direction_y: 1,
    };
    assert!(diagonal.is_claim());
    assert!(diagonal.assert_correct().is_ok());
    let encoded = diagonal.encode();
    assert_eq!(WinWitness::read(&mut &encoded[..]).unwrap(), diagonal);

    let bad = WinWitness {
        direction_x: 2,
        ..WinWitness::NONE
    };
    assert_eq!(bad.assert_correct(), Err(MatchError::InvalidDirection));
}

#[test]
fn test_session_seats() {
    let mut session = session();
    assert_eq!(session.current_seat(), Seat::First);
    assert_eq!(session.waiting_player(), &session.player2);
    assert_eq!(session.seat_of(&session.player2.clone()), Some(Seat::Second));
    assert_eq!(
        session.seat_of(&PrivateKey::from_seed(3).public_key()),
        None
    );

    session.current_move_user = session.player2.clone();
    assert_eq!(session.waiting_player(), &session.player1);
    assert!(!session.is_finished());
    session.winner = Some(session.player1.clone());
    assert!(session.is_finished());
}

#[test]
fn test_session_roundtrip() {
    let mut session = session();
    session.winner = Some(session.player2.clone());
    session.move_count = 9;
    let encoded = session.encode();
    assert_eq!(encoded.len(), session.encode_size());
    assert_eq!(GameSession::read(&mut &encoded[..]).unwrap(), session);
}
