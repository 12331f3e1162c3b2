use super::constants::*;
use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use thiserror::Error as ThisError;

/// Named rejection of a single call.
///
/// A rejection never aborts the block: the call's writes are discarded and the
/// next call applies against the unchanged prior state.
#[derive(ThisError, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchError {
    #[error("player already in game")]
    AlreadyInGame,
    #[error("player already queued in this round")]
    AlreadyQueued,
    #[error("invalid session id")]
    InvalidSessionId,
    #[error("not your move")]
    NotYourMove,
    #[error("game finished")]
    GameFinished,
    #[error("timeout not reached")]
    TimeoutNotReached,
    #[error("invalid win direction")]
    InvalidDirection,
    #[error("illegal board edit")]
    IllegalBoardEdit,
    #[error("win not proved")]
    WinNotProved,
    #[error("no winner yet")]
    NoWinnerYet,
    #[error("session already settled")]
    AlreadySettled,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("invalid move payload")]
    InvalidPayload,
}

impl MatchError {
    pub const fn code(self) -> u8 {
        match self {
            Self::AlreadyInGame => ERROR_ALREADY_IN_GAME,
            Self::AlreadyQueued => ERROR_ALREADY_QUEUED,
            Self::InvalidSessionId => ERROR_INVALID_SESSION_ID,
            Self::NotYourMove => ERROR_NOT_YOUR_MOVE,
            Self::GameFinished => ERROR_GAME_FINISHED,
            Self::TimeoutNotReached => ERROR_TIMEOUT_NOT_REACHED,
            Self::InvalidDirection => ERROR_INVALID_DIRECTION,
            Self::IllegalBoardEdit => ERROR_ILLEGAL_BOARD_EDIT,
            Self::WinNotProved => ERROR_WIN_NOT_PROVED,
            Self::NoWinnerYet => ERROR_NO_WINNER_YET,
            Self::AlreadySettled => ERROR_ALREADY_SETTLED,
            Self::InsufficientBalance => ERROR_INSUFFICIENT_BALANCE,
            Self::InvalidPayload => ERROR_INVALID_PAYLOAD,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            ERROR_ALREADY_IN_GAME => Self::AlreadyInGame,
            ERROR_ALREADY_QUEUED => Self::AlreadyQueued,
            ERROR_INVALID_SESSION_ID => Self::InvalidSessionId,
            ERROR_NOT_YOUR_MOVE => Self::NotYourMove,
            ERROR_GAME_FINISHED => Self::GameFinished,
            ERROR_TIMEOUT_NOT_REACHED => Self::TimeoutNotReached,
            ERROR_INVALID_DIRECTION => Self::InvalidDirection,
            ERROR_ILLEGAL_BOARD_EDIT => Self::IllegalBoardEdit,
            ERROR_WIN_NOT_PROVED => Self::WinNotProved,
            ERROR_NO_WINNER_YET => Self::NoWinnerYet,
            ERROR_ALREADY_SETTLED => Self::AlreadySettled,
            ERROR_INSUFFICIENT_BALANCE => Self::InsufficientBalance,
            ERROR_INVALID_PAYLOAD => Self::InvalidPayload,
            _ => return None,
        })
    }
}

impl Write for MatchError {
    fn write(&self, writer: &mut impl BufMut) {
        self.code().write(writer);
    }
}

impl Read for MatchError {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let code = u8::read(reader)?;
        Self::from_code(code).ok_or(Error::InvalidEnum(code))
    }
}

impl FixedSize for MatchError {
    const SIZE: usize = u8::SIZE;
}
