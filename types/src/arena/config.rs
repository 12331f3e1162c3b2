use super::constants::{
    ARENA_TOKEN_ID, BOARD_SIZE, CELLS_LINE_TO_WIN, ENTRY_FEE, MAX_BOARD_SIZE, MOVE_TIMEOUT_UNITS,
    ROUND_SIZE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables of the matchmaking engine and the five-in-a-row rules.
///
/// Every field is optional when deserializing; missing fields take the defaults
/// from [`super::constants`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Ordering-counter units per matchmaking round.
    pub round_size: u64,
    /// Entry fee withheld at registration.
    pub entry_fee: u64,
    /// Blocks of inactivity after which the waiting player may claim the session.
    pub move_timeout: u64,
    pub board_size: u8,
    pub line_length: u8,
    pub token_id: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            round_size: ROUND_SIZE,
            entry_fee: ENTRY_FEE,
            move_timeout: MOVE_TIMEOUT_UNITS,
            board_size: BOARD_SIZE,
            line_length: CELLS_LINE_TO_WIN,
            token_id: ARENA_TOKEN_ID,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be > 0")]
    InvalidNonZero { field: &'static str },
    #[error("board_size must be <= {max} (got {value})")]
    BoardTooLarge { value: u8, max: u8 },
    #[error("line_length ({line_length}) must not exceed board_size ({board_size})")]
    LineLongerThanBoard { line_length: u8, board_size: u8 },
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field });
    }
    Ok(())
}

impl MatchConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        ensure_nonzero("round_size", self.round_size)?;
        ensure_nonzero("board_size", self.board_size as u64)?;
        ensure_nonzero("line_length", self.line_length as u64)?;
        if self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooLarge {
                value: self.board_size,
                max: MAX_BOARD_SIZE,
            });
        }
        if self.line_length > self.board_size {
            return Err(ConfigError::LineLongerThanBoard {
                line_length: self.line_length,
                board_size: self.board_size,
            });
        }
        Ok(self)
    }

    /// Round bucket for the given ordering counter.
    pub fn round_id(&self, height: u64) -> u64 {
        height.checked_div(self.round_size).unwrap_or(0)
    }
}
