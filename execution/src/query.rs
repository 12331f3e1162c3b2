//! Read-only views over any [`State`].
//!
//! Absent keys read as their zero value (no active game, empty queue, zero balance).
//! A key holding a value of the wrong kind is a storage error.

use crate::State;
use anyhow::{bail, Result};
use arena_types::{
    arena::{GameSession, Holder, QueueEntry},
    execution::{Key, Value},
};
use commonware_cryptography::ed25519::PublicKey;

async fn query_amount<S: State>(state: &S, key: Key) -> Result<u64> {
    match state.get(&key).await? {
        None => Ok(0),
        Some(Value::Amount(amount)) => Ok(amount),
        Some(other) => bail!("expected amount at {key:?}, found {other:?}"),
    }
}

async fn query_count<S: State>(state: &S, key: Key) -> Result<u64> {
    match state.get(&key).await? {
        None => Ok(0),
        Some(Value::Count(count)) => Ok(count),
        Some(other) => bail!("expected count at {key:?}, found {other:?}"),
    }
}

async fn query_flag<S: State>(state: &S, key: Key) -> Result<bool> {
    match state.get(&key).await? {
        None => Ok(false),
        Some(Value::Flag(flag)) => Ok(flag),
        Some(other) => bail!("expected flag at {key:?}, found {other:?}"),
    }
}

pub async fn query_balance<S: State>(state: &S, token: u64, holder: &Holder) -> Result<u64> {
    query_amount(state, Key::Balance(token, holder.clone())).await
}

pub async fn query_pending_balance<S: State>(state: &S, player: &PublicKey) -> Result<u64> {
    query_amount(state, Key::PendingBalance(player.clone())).await
}

pub async fn query_game_fund<S: State>(state: &S, session_id: u64) -> Result<u64> {
    query_amount(state, Key::GameFund(session_id)).await
}

/// Session id the player is currently bound to, `0` when idle.
pub async fn query_active_game<S: State>(state: &S, player: &PublicKey) -> Result<u64> {
    match state.get(&Key::ActiveGame(player.clone())).await? {
        None => Ok(0),
        Some(Value::ActiveGame(session_id)) => Ok(session_id),
        Some(other) => bail!("expected active game for {player:?}, found {other:?}"),
    }
}

/// Player a session key was registered by.
pub async fn query_session_owner<S: State>(
    state: &S,
    session_key: &PublicKey,
) -> Result<Option<PublicKey>> {
    match state.get(&Key::SessionKey(session_key.clone())).await? {
        None => Ok(None),
        Some(Value::SessionOwner(owner)) => Ok(Some(owner)),
        Some(other) => bail!("expected session owner for {session_key:?}, found {other:?}"),
    }
}

pub async fn query_session<S: State>(state: &S, session_id: u64) -> Result<Option<GameSession>> {
    match state.get(&Key::Session(session_id)).await? {
        None => Ok(None),
        Some(Value::Session(session)) => Ok(Some(session)),
        Some(other) => bail!("expected session {session_id}, found {other:?}"),
    }
}

pub async fn query_session_count<S: State>(state: &S) -> Result<u64> {
    query_count(state, Key::SessionCount).await
}

pub async fn query_game_finished<S: State>(state: &S, session_id: u64) -> Result<bool> {
    query_flag(state, Key::GameFinished(session_id)).await
}

pub async fn query_queue_length<S: State>(state: &S, round: u64) -> Result<u64> {
    query_count(state, Key::QueueLength(round)).await
}

/// Whether the player holds a live registration in the round.
pub async fn query_is_queued<S: State>(state: &S, round: u64, player: &PublicKey) -> Result<bool> {
    query_flag(
        state,
        Key::QueueRegistered {
            round,
            player: player.clone(),
        },
    )
    .await
}

/// Entries waiting in a round, in index order.
pub async fn query_queue<S: State>(state: &S, round: u64) -> Result<Vec<QueueEntry>> {
    let length = query_queue_length(state, round).await?;
    let mut entries = Vec::new();
    for index in 0..length {
        match state.get(&Key::QueueEntry { round, index }).await? {
            Some(Value::QueueEntry(entry)) => entries.push(entry),
            None => bail!("missing queue entry {index} in round {round}"),
            Some(other) => bail!("expected queue entry {index} in round {round}, found {other:?}"),
        }
    }
    Ok(entries)
}

/// Last height applied by the state transition, `0` before the first block.
pub async fn query_height<S: State>(state: &S) -> Result<u64> {
    match state.get(&Key::Commit).await? {
        None => Ok(0),
        Some(Value::Commit { height }) => Ok(height),
        Some(other) => bail!("expected commit marker, found {other:?}"),
    }
}
