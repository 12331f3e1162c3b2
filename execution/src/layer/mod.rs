use anyhow::{Context as _, Result};
use arena_types::{
    arena::{GameSession, Holder, MatchConfig, MatchError},
    execution::{Event, Instruction, Key, Output, Transaction, Value},
};
use commonware_cryptography::ed25519::PublicKey;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::query;
use crate::rules::GameRules;
use crate::state::{State, Status};

mod handlers;

/// Why a single call did not commit.
#[derive(Debug)]
pub(crate) enum CallError {
    /// The call broke a rule; its writes are discarded and execution continues.
    Rejected(MatchError),
    /// The backing state failed; the whole block aborts.
    State(anyhow::Error),
}

impl From<MatchError> for CallError {
    fn from(error: MatchError) -> Self {
        Self::Rejected(error)
    }
}

impl From<anyhow::Error> for CallError {
    fn from(error: anyhow::Error) -> Self {
        Self::State(error)
    }
}

type CallResult<T = Vec<Event>> = std::result::Result<T, CallError>;

/// Block-scoped execution overlay.
///
/// Reads fall through the current call's staged writes, then the writes of calls already
/// accepted in this block, then the backing state. A call's staged writes are promoted
/// only when it succeeds.
pub struct Layer<'a, S: State, R: GameRules> {
    state: &'a S,
    config: MatchConfig,
    rules: &'a R,
    height: u64,

    pending: BTreeMap<Key, Status>,
    staged: BTreeMap<Key, Status>,
}

impl<'a, S: State, R: GameRules> Layer<'a, S, R> {
    /// `height` is the ordering counter every call in this layer observes as "now".
    pub fn new(state: &'a S, config: MatchConfig, rules: &'a R, height: u64) -> Self {
        Self {
            state,
            config,
            rules,
            height,

            pending: BTreeMap::new(),
            staged: BTreeMap::new(),
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    async fn apply(&mut self, transaction: &Transaction) -> CallResult {
        let public = &transaction.public;

        match &transaction.instruction {
            Instruction::Register {
                session_key,
                timestamp,
            } => {
                self.handle_register(public, session_key, *timestamp)
                    .await
            }
            Instruction::CollectPendingBalance => self.handle_collect_pending_balance(public).await,
            Instruction::MakeMove {
                session_id,
                proposed_state,
                claim,
            } => {
                self.handle_make_move(public, *session_id, proposed_state, claim)
                    .await
            }
            Instruction::ClaimTimeout { session_id } => {
                self.handle_claim_timeout(public, *session_id).await
            }
            Instruction::Win { session_id } => self.handle_win(public, *session_id).await,
        }
    }

    /// Apply calls strictly in order, returning the output log.
    ///
    /// A rejected call leaves no writes behind and is reported with `Event::Rejected`.
    /// Storage failures abort the whole batch.
    pub async fn execute(&mut self, transactions: Vec<Transaction>) -> Result<Vec<Output>> {
        let mut outputs = Vec::new();

        for tx in transactions {
            let result = self.apply(&tx).await;
            self.close_call(result.is_ok());
            match result {
                Ok(events) => {
                    outputs.extend(events.into_iter().map(Output::Event));
                }
                Err(CallError::Rejected(error)) => {
                    let session_id = session_of(&tx.instruction);
                    warn!(
                        caller = ?tx.public,
                        session_id,
                        code = error.code(),
                        %error,
                        "call rejected"
                    );
                    outputs.push(Output::Event(Event::Rejected {
                        caller: tx.public.clone(),
                        session_id,
                        error,
                    }));
                }
                Err(CallError::State(err)) => {
                    return Err(err).context("state error during apply");
                }
            }
            outputs.push(Output::Transaction(tx));
        }

        Ok(outputs)
    }

    /// Promote the current call's staged writes, or drop them if it was rejected.
    fn close_call(&mut self, accepted: bool) {
        let staged = std::mem::take(&mut self.staged);
        if accepted {
            self.pending.extend(staged);
        }
    }

    /// Ordered change set of every accepted call.
    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }

    // === Typed reads ===

    async fn active_game(&self, player: &PublicKey) -> Result<u64> {
        query::query_active_game(self, player).await
    }

    async fn pending_balance(&self, player: &PublicKey) -> Result<u64> {
        query::query_pending_balance(self, player).await
    }

    /// Owner of a session key; an unbound key acts for itself.
    async fn resolve_caller(&self, public: &PublicKey) -> Result<PublicKey> {
        Ok(query::query_session_owner(self, public)
            .await?
            .unwrap_or_else(|| public.clone()))
    }

    async fn load_session(&self, session_id: u64) -> CallResult<GameSession> {
        match query::query_session(self, session_id).await? {
            Some(session) => Ok(session),
            None => Err(MatchError::InvalidSessionId.into()),
        }
    }

    async fn store_session(&mut self, session: GameSession) -> Result<()> {
        self.insert(Key::Session(session.id), Value::Session(session))
            .await
    }

    /// Release both players so they can queue again.
    async fn release_players(&mut self, session: &GameSession) -> Result<()> {
        for player in [&session.player1, &session.player2] {
            self.delete(&Key::ActiveGame(player.clone())).await?;
        }
        debug!(session_id = session.id, "players released");
        Ok(())
    }
}

fn session_of(instruction: &Instruction) -> Option<u64> {
    match instruction {
        Instruction::MakeMove { session_id, .. }
        | Instruction::ClaimTimeout { session_id }
        | Instruction::Win { session_id } => Some(*session_id),
        Instruction::Register { .. } | Instruction::CollectPendingBalance => None,
    }
}

impl<'a, S: State, R: GameRules> State for Layer<'a, S, R> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let status = self.staged.get(key).or_else(|| self.pending.get(key));
        Ok(match status {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.staged.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.staged.insert(key.clone(), Status::Delete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_account_keypair, fund, make_move, play};
    use crate::rules::FiveInRow;
    use crate::Memory;
    use arena_types::arena::{Board, WinWitness, ENTRY_FEE};
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    fn register(public: &PublicKey, session_key: &PublicKey) -> Transaction {
        Transaction::new(
            public.clone(),
            Instruction::Register {
                session_key: session_key.clone(),
                timestamp: 0,
            },
        )
    }

    fn rejections(outputs: &[Output]) -> Vec<MatchError> {
        outputs
            .iter()
            .filter_map(|output| match output {
                Output::Event(Event::Rejected { error, .. }) => Some(*error),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rejected_call_leaves_no_writes() {
        let executor = Runner::default();
        executor.start(|_| async move {
            // No funds: the fee transfer fails after the session key was staged.
            let state = Memory::default();
            let rules = FiveInRow::default();
            let mut layer = Layer::new(&state, MatchConfig::default(), &rules, 1);
            let (_, alice) = create_account_keypair(1);
            let (_, session_key) = create_account_keypair(100);

            let outputs = layer
                .execute(vec![register(&alice, &session_key)])
                .await
                .unwrap();
            assert_eq!(rejections(&outputs), vec![MatchError::InsufficientBalance]);
            assert!(matches!(
                outputs.last(),
                Some(Output::Transaction(tx)) if tx.public == alice
            ));
            assert_eq!(
                layer.get(&Key::SessionKey(session_key)).await.unwrap(),
                None
            );
            assert!(layer.commit().is_empty());
        });
    }

    #[test]
    fn test_rejection_does_not_block_later_calls() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let (_, alice) = create_account_keypair(1);
            let (_, bob) = create_account_keypair(2);
            fund(&mut state, &alice, ENTRY_FEE).await.unwrap();
            let rules = FiveInRow::default();
            let mut layer = Layer::new(&state, MatchConfig::default(), &rules, 1);

            let outputs = layer
                .execute(vec![register(&bob, &bob), register(&alice, &alice)])
                .await
                .unwrap();
            assert_eq!(rejections(&outputs), vec![MatchError::InsufficientBalance]);
            assert!(outputs.iter().any(|output| matches!(
                output,
                Output::Event(Event::PlayerQueued { player, .. }) if *player == alice
            )));
            assert_eq!(layer.pending_balance(&alice).await.unwrap(), ENTRY_FEE);
        });
    }

    #[test]
    fn test_reads_see_accepted_writes_of_same_block() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let (_, alice) = create_account_keypair(1);
            let (_, bob) = create_account_keypair(2);
            fund(&mut state, &alice, ENTRY_FEE).await.unwrap();
            fund(&mut state, &bob, ENTRY_FEE).await.unwrap();
            let rules = FiveInRow::default();
            let mut layer = Layer::new(&state, MatchConfig::default(), &rules, 1);

            let outputs = layer
                .execute(vec![
                    register(&alice, &alice),
                    register(&bob, &bob),
                    make_move(&alice, 1, &play(&Board::empty(15), 7, 7, 1), WinWitness::NONE),
                ])
                .await
                .unwrap();
            assert!(rejections(&outputs).is_empty());
            let session = layer.load_session(1).await.unwrap();
            assert_eq!(session.current_move_user, bob);
            assert_eq!(session.move_count, 1);
        });
    }

    #[test]
    fn test_layer_execute_is_deterministic_for_identical_inputs() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let players: Vec<_> = (1..=5).map(|seed| create_account_keypair(seed).1).collect();
            for player in &players {
                fund(&mut state, player, 3 * ENTRY_FEE).await.unwrap();
            }
            let txs: Vec<_> = players
                .iter()
                .map(|player| register(player, player))
                .chain(std::iter::once(make_move(
                    &players[0],
                    1,
                    &play(&Board::empty(15), 0, 0, 1),
                    WinWitness::NONE,
                )))
                .collect();

            let rules = FiveInRow::default();
            let mut layer1 = Layer::new(&state, MatchConfig::default(), &rules, 3);
            let mut layer2 = Layer::new(&state, MatchConfig::default(), &rules, 3);
            let outputs1 = layer1.execute(txs.clone()).await.unwrap();
            let outputs2 = layer2.execute(txs).await.unwrap();

            assert_eq!(outputs1, outputs2);
            assert!(layer1.commit() == layer2.commit());
        });
    }
}
