//! Drive scenario blocks through `execute_block` over an in-memory state.

use crate::scenario::{Scenario, Step};
use anyhow::{bail, Context, Result};
use arena_execution::{
    detect_win,
    mocks::{fund, make_move},
    query::{
        query_active_game, query_balance, query_game_finished, query_game_fund, query_height,
        query_pending_balance, query_session, query_session_count,
    },
    state_transition::{execute_block, StateTransitionResult},
    FiveInRow, Memory,
};
use arena_types::{
    arena::{Board, Holder, MatchConfig, WinWitness},
    execution::{Instruction, Output, Transaction},
};
use commonware_codec::{DecodeExt, Encode};
use commonware_cryptography::ed25519::PublicKey;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub struct Replay {
    state: Memory,
    config: MatchConfig,
    rules: FiveInRow,
    keys: BTreeMap<String, PublicKey>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub height: u64,
    pub null_balance: u64,
    pub players: BTreeMap<String, PlayerSummary>,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub key: String,
    pub balance: u64,
    pub pending: u64,
    pub active_game: u64,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: u64,
    pub player1: String,
    pub player2: String,
    pub current_move_user: String,
    pub winner: Option<String>,
    pub move_count: u32,
    pub last_move_height: u64,
    pub fund: u64,
    pub settled: bool,
    /// Rows of the board, `board[x][y]`.
    pub board: Vec<Vec<u8>>,
}

impl Replay {
    pub async fn new(scenario: &Scenario) -> Result<Self> {
        let keys = scenario.keys();
        let mut state = Memory::default();
        for (name, amount) in &scenario.balances {
            let public = keys
                .get(name)
                .with_context(|| format!("unknown player {name}"))?;
            fund(&mut state, public, *amount)
                .await
                .with_context(|| format!("fund {name}"))?;
        }
        Ok(Self {
            state,
            config: scenario.config.clone(),
            rules: FiveInRow::from_config(&scenario.config),
            keys,
        })
    }

    /// Execute `steps` as the next block.
    ///
    /// Boards for `place` steps are built from the committed session state plus any
    /// earlier `place` in the same block, so a rejected move earlier in the block
    /// makes the following proposals stale.
    pub async fn run_block(&mut self, steps: &[Step]) -> Result<StateTransitionResult> {
        let height = query_height(&self.state).await? + 1;
        let mut drafts = BTreeMap::new();
        let mut transactions = Vec::with_capacity(steps.len());
        for step in steps {
            let tx = self
                .transaction(height, step, &mut drafts)
                .await
                .with_context(|| format!("build {step:?} at height {height}"))?;
            transactions.push(tx);
        }

        let result = execute_block(
            &mut self.state,
            &self.config,
            &self.rules,
            height,
            transactions,
        )
        .await?;
        for output in &result.outputs {
            match output {
                Output::Event(event) => info!(height, ?event, "event"),
                Output::Commit { height } => debug!(height, "committed"),
                Output::Transaction(_) => {}
            }
        }
        Ok(result)
    }

    fn key(&self, name: &str) -> Result<&PublicKey> {
        self.keys
            .get(name)
            .with_context(|| format!("unknown player {name}"))
    }

    async fn transaction(
        &self,
        height: u64,
        step: &Step,
        drafts: &mut BTreeMap<u64, Board>,
    ) -> Result<Transaction> {
        let tx = match step {
            Step::Register(name) => {
                let public = self.key(name)?;
                Transaction::new(
                    public.clone(),
                    Instruction::Register {
                        session_key: public.clone(),
                        timestamp: height,
                    },
                )
            }
            Step::Collect(name) => {
                Transaction::new(self.key(name)?.clone(), Instruction::CollectPendingBalance)
            }
            Step::Place(place) => {
                let public = self.key(&place.player)?;
                let session = query_session(&self.state, place.session)
                    .await?
                    .with_context(|| format!("session {} does not exist", place.session))?;
                let seat = session.seat_of(public).with_context(|| {
                    format!("{} does not play in session {}", place.player, place.session)
                })?;
                let mut board = match drafts.get(&place.session) {
                    Some(board) => board.clone(),
                    None => Board::decode(session.state_blob.as_slice())
                        .context("decode session board")?,
                };
                if !board.set(place.x, place.y, seat.mark()) {
                    bail!("({}, {}) is off the board", place.x, place.y);
                }
                let claim = match (place.claim, place.auto_claim) {
                    (Some(claim), _) => claim.into(),
                    (None, true) => detect_win(&board, seat.mark(), self.config.line_length)
                        .unwrap_or(WinWitness::NONE),
                    (None, false) => WinWitness::NONE,
                };
                let tx = make_move(public, place.session, &board, claim);
                drafts.insert(place.session, board);
                tx
            }
            Step::ClaimTimeout(call) => Transaction::new(
                self.key(&call.player)?.clone(),
                Instruction::ClaimTimeout {
                    session_id: call.session,
                },
            ),
            Step::Win(call) => Transaction::new(
                self.key(&call.player)?.clone(),
                Instruction::Win {
                    session_id: call.session,
                },
            ),
        };
        Ok(tx)
    }

    fn name_of(&self, public: &PublicKey) -> String {
        self.keys
            .iter()
            .find(|(_, key)| *key == public)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| commonware_utils::hex(&public.encode()))
    }

    pub async fn summary(&self) -> Result<Summary> {
        let token = self.config.token_id;
        let mut players = BTreeMap::new();
        for (name, public) in &self.keys {
            players.insert(
                name.clone(),
                PlayerSummary {
                    key: commonware_utils::hex(&public.encode()),
                    balance: query_balance(&self.state, token, &Holder::Player(public.clone()))
                        .await?,
                    pending: query_pending_balance(&self.state, public).await?,
                    active_game: query_active_game(&self.state, public).await?,
                },
            );
        }

        let mut sessions = Vec::new();
        for id in 1..=query_session_count(&self.state).await? {
            let session = query_session(&self.state, id)
                .await?
                .with_context(|| format!("session {id} missing below the session counter"))?;
            let board = Board::decode(session.state_blob.as_slice())
                .with_context(|| format!("decode board of session {id}"))?;
            sessions.push(SessionSummary {
                id,
                player1: self.name_of(&session.player1),
                player2: self.name_of(&session.player2),
                current_move_user: self.name_of(&session.current_move_user),
                winner: session.winner.as_ref().map(|winner| self.name_of(winner)),
                move_count: session.move_count,
                last_move_height: session.last_move_height,
                fund: query_game_fund(&self.state, id).await?,
                settled: query_game_finished(&self.state, id).await?,
                board: board
                    .cells()
                    .chunks(board.size() as usize)
                    .map(<[u8]>::to_vec)
                    .collect(),
            });
        }

        Ok(Summary {
            height: query_height(&self.state).await?,
            null_balance: query_balance(&self.state, token, &Holder::Null).await?,
            players,
            sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{arena::MatchError, execution::Event};
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    const FEE: u64 = 1_000_000_000;

    fn rejections(result: &StateTransitionResult) -> Vec<MatchError> {
        result
            .outputs
            .iter()
            .filter_map(|output| match output {
                Output::Event(Event::Rejected { error, .. }) => Some(*error),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn replays_sample_duel() {
        let scenario = Scenario::parse(include_str!("../scenarios/duel.yaml")).unwrap();
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut replay = Replay::new(&scenario).await.unwrap();
            for steps in &scenario.blocks {
                let result = replay.run_block(steps).await.unwrap();
                assert!(rejections(&result).is_empty(), "{result:?}");
            }

            let summary = replay.summary().await.unwrap();
            assert_eq!(summary.height, scenario.blocks.len() as u64);
            assert_eq!(summary.players["alice"].balance, 6 * FEE);
            assert_eq!(summary.players["bob"].balance, 4 * FEE);
            assert_eq!(summary.players["alice"].active_game, 0);

            let session = &summary.sessions[0];
            assert_eq!(session.winner.as_deref(), Some("alice"));
            assert!(session.settled);
            assert_eq!(session.fund, 0);
            assert_eq!(session.move_count, 9);
            assert_eq!(session.board[7][3..8], [1, 1, 1, 1, 1]);
            assert_eq!(session.board[8][3..7], [2, 2, 2, 2]);
        });
    }

    #[test]
    fn replays_timeout_claim() {
        let scenario = Scenario::parse(
            r#"
config:
  move_timeout: 3
players:
  alice: 1
  bob: 2
balances:
  alice: 2000000000
  bob: 2000000000
blocks:
  - - register: alice
    - register: bob
  - []
  - []
  - - claim_timeout: { player: bob, session: 1 }
  - - claim_timeout: { player: bob, session: 1 }
    - win: { player: alice, session: 1 }
"#,
        )
        .unwrap();
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut replay = Replay::new(&scenario).await.unwrap();
            let mut results = Vec::new();
            for steps in &scenario.blocks {
                results.push(replay.run_block(steps).await.unwrap());
            }
            assert_eq!(rejections(&results[3]), vec![MatchError::TimeoutNotReached]);
            assert!(rejections(&results[4]).is_empty());

            let summary = replay.summary().await.unwrap();
            assert_eq!(summary.sessions[0].winner.as_deref(), Some("bob"));
            assert_eq!(summary.sessions[0].last_move_height, 5);
            assert_eq!(summary.players["bob"].balance, 3 * FEE);
            assert_eq!(summary.players["alice"].balance, FEE);
        });
    }

    #[test]
    fn place_requires_seated_player() {
        let scenario = Scenario::parse(
            r#"
players:
  alice: 1
  bob: 2
  carol: 3
balances:
  alice: 2000000000
  bob: 2000000000
blocks:
  - - register: alice
    - register: bob
  - - place: { player: carol, session: 1, x: 0, y: 0 }
"#,
        )
        .unwrap();
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut replay = Replay::new(&scenario).await.unwrap();
            replay.run_block(&scenario.blocks[0]).await.unwrap();
            let err = replay.run_block(&scenario.blocks[1]).await.unwrap_err();
            assert!(format!("{err:#}").contains("carol does not play in session 1"));
        });
    }
}
