//! Pluggable game rules.
//!
//! The registrar and move handlers are generic over [`GameRules`]: a rules implementation
//! supplies the initial state of a new session, validates each proposed state against the
//! current one, and can search a state for a winning witness.

use arena_types::arena::{MatchConfig, MatchError, Seat};
use commonware_codec::{Encode, Read, ReadExt};

mod five_in_row;

pub use five_in_row::{detect_win, FiveInRow};

/// Accepted move: the state to commit and whether the mover proved a win.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome<T> {
    pub state: T,
    pub won: bool,
}

pub trait GameRules {
    /// Game-specific session state, persisted as the session's state blob.
    type State: Encode + Read<Cfg = ()> + Clone;
    /// Mover-supplied win assertion attached to every move.
    type Claim: Encode + Read<Cfg = ()> + Clone;

    /// State written when two players are paired.
    fn init_session(&self) -> Self::State;

    /// Validate `proposed` as the next state after `current` for the player in `seat`.
    fn apply_move(
        &self,
        current: &Self::State,
        proposed: Self::State,
        claim: &Self::Claim,
        seat: Seat,
    ) -> Result<MoveOutcome<Self::State>, MatchError>;

    /// Find a witness proving `seat` has won in `state`, if any.
    fn check_win(&self, state: &Self::State, seat: Seat) -> Option<Self::Claim>;

    /// Whether these rules agree with the game parameters in `config`.
    fn matches_config(&self, _config: &MatchConfig) -> bool {
        true
    }
}

/// Decode a value that must occupy the whole buffer.
pub fn decode_exact<T: Read<Cfg = ()>>(bytes: &[u8]) -> Result<T, MatchError> {
    let mut reader = bytes;
    let value = T::read(&mut reader).map_err(|_| MatchError::InvalidPayload)?;
    if !reader.is_empty() {
        return Err(MatchError::InvalidPayload);
    }
    Ok(value)
}
