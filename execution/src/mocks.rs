//! Helpers for driving the engine in tests and tooling.

use crate::State;
use anyhow::Result;
use arena_types::{
    arena::{Board, Holder, WinWitness, ARENA_TOKEN_ID},
    execution::{Instruction, Key, Transaction, Value},
};
use commonware_codec::Encode;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};

/// Deterministic account keypair derived from `seed`.
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

/// Credit `amount` of the arena token directly into a player's escrow balance.
pub async fn fund<S: State>(state: &mut S, player: &PublicKey, amount: u64) -> Result<()> {
    let key = Key::Balance(ARENA_TOKEN_ID, Holder::Player(player.clone()));
    let current = match state.get(&key).await? {
        Some(Value::Amount(amount)) => amount,
        _ => 0,
    };
    state
        .insert(key, Value::Amount(current.saturating_add(amount)))
        .await
}

/// Copy of `board` with `(x, y)` set to `mark`.
pub fn play(board: &Board, x: i64, y: i64, mark: u8) -> Board {
    let mut next = board.clone();
    assert!(next.set(x, y, mark), "cell ({x}, {y}) is off the board");
    next
}

/// `MakeMove` transaction proposing `board` with `claim`.
pub fn make_move(
    public: &PublicKey,
    session_id: u64,
    board: &Board,
    claim: WinWitness,
) -> Transaction {
    Transaction::new(
        public.clone(),
        Instruction::MakeMove {
            session_id,
            proposed_state: board.encode().to_vec(),
            claim: claim.encode().to_vec(),
        },
    )
}
