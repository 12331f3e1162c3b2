use super::super::*;
use anyhow::Context as _;
use arena_types::arena::{QueueEntry, PLAYERS_PER_SESSION};
use commonware_codec::Encode;

impl<'a, S: State, R: GameRules> Layer<'a, S, R> {
    // === Queue Registrar ===

    pub(in crate::layer) async fn handle_register(
        &mut self,
        public: &PublicKey,
        session_key: &PublicKey,
        timestamp: u64,
    ) -> CallResult {
        if self.active_game(public).await? != 0 {
            return Err(MatchError::AlreadyInGame.into());
        }

        self.insert(
            Key::SessionKey(session_key.clone()),
            Value::SessionOwner(public.clone()),
        )
        .await?;

        let round = self.config.round_id(self.height);
        // Only a live entry blocks; a player popped from this round may queue in it again.
        if query::query_is_queued(self, round, public).await? {
            return Err(MatchError::AlreadyQueued.into());
        }

        self.withhold_entry_fee(public).await?;

        let event = match self.pop_opponent(round).await? {
            Some(opponent) => self.create_session(opponent, public).await?,
            None => self.enqueue(round, public, timestamp).await?,
        };
        Ok(vec![event])
    }

    pub(in crate::layer) async fn handle_collect_pending_balance(
        &mut self,
        public: &PublicKey,
    ) -> CallResult {
        let owner = self.resolve_caller(public).await?;
        let amount = self.pending_balance(&owner).await?;
        if amount == 0 {
            return Ok(Vec::new());
        }

        self.mint(&Holder::Player(owner.clone()), amount).await?;
        self.insert(Key::PendingBalance(owner.clone()), Value::Amount(0))
            .await?;
        info!(player = ?owner, amount, "pending balance collected");

        Ok(vec![Event::PendingBalanceCollected {
            player: owner,
            amount,
        }])
    }

    /// Charge the entry fee into escrow unless the pending balance already exceeds it.
    async fn withhold_entry_fee(&mut self, public: &PublicKey) -> CallResult<()> {
        let fee = self.config.entry_fee;
        let pending = self.pending_balance(public).await?;
        if pending > fee {
            return Ok(());
        }

        self.transfer(&Holder::Player(public.clone()), &Holder::Null, fee)
            .await?;
        self.insert(
            Key::PendingBalance(public.clone()),
            Value::Amount(pending.saturating_add(fee)),
        )
        .await?;
        Ok(())
    }

    /// Pop queue entries newest-first until one belongs to an idle player whose entry fee
    /// is still withheld.
    ///
    /// Entries of players paired elsewhere since queuing, or who collected their pending
    /// balance while queued, are dropped.
    async fn pop_opponent(&mut self, round: u64) -> Result<Option<PublicKey>> {
        let mut length = query::query_queue_length(self, round).await?;
        if length == 0 {
            return Ok(None);
        }

        let mut opponent = None;
        while length > 0 {
            length -= 1;
            let key = Key::QueueEntry {
                round,
                index: length,
            };
            let Some(Value::QueueEntry(entry)) = self.get(&key).await? else {
                continue;
            };
            self.delete(&key).await?;
            self.insert(
                Key::QueueRegistered {
                    round,
                    player: entry.player.clone(),
                },
                Value::Flag(false),
            )
            .await?;

            if self.active_game(&entry.player).await? != 0 {
                debug!(round, player = ?entry.player, "discarded stale queue entry");
                continue;
            }
            if self.pending_balance(&entry.player).await? < self.config.entry_fee {
                debug!(round, player = ?entry.player, "discarded unfunded queue entry");
                continue;
            }
            opponent = Some(entry.player);
            break;
        }

        self.insert(Key::QueueLength(round), Value::Count(length))
            .await?;
        Ok(opponent)
    }

    async fn enqueue(&mut self, round: u64, public: &PublicKey, timestamp: u64) -> Result<Event> {
        let index = query::query_queue_length(self, round).await?;
        self.insert(
            Key::QueueEntry { round, index },
            Value::QueueEntry(QueueEntry {
                player: public.clone(),
                registration_timestamp: timestamp,
            }),
        )
        .await?;
        self.insert(
            Key::QueueRegistered {
                round,
                player: public.clone(),
            },
            Value::Flag(true),
        )
        .await?;
        self.insert(Key::QueueLength(round), Value::Count(index + 1))
            .await?;
        debug!(player = ?public, round, index, "player queued");

        Ok(Event::PlayerQueued {
            player: public.clone(),
            round,
            index,
        })
    }

    /// Open a session between the queued `opponent` (who moves first) and the registrant.
    ///
    /// The registrant-moves-first rule of session initialisation conflicts with the
    /// end-to-end flow where the first player to queue places mark 1; the queued player
    /// is seated as `player1` and opens the game.
    ///
    /// Each player's withheld fee moves from their pending balance into the game fund.
    async fn create_session(&mut self, opponent: PublicKey, registrant: &PublicKey) -> Result<Event> {
        let session_id = query::query_session_count(self)
            .await?
            .checked_add(1)
            .context("session counter overflow")?;
        let session = GameSession {
            id: session_id,
            player1: opponent.clone(),
            player2: registrant.clone(),
            current_move_user: opponent.clone(),
            last_move_height: self.height,
            winner: None,
            move_count: 0,
            state_blob: self.rules.init_session().encode().to_vec(),
        };
        self.store_session(session).await?;
        self.insert(Key::SessionCount, Value::Count(session_id))
            .await?;

        let fee = self.config.entry_fee;
        let fund = fee.saturating_mul(PLAYERS_PER_SESSION);
        self.insert(Key::GameFund(session_id), Value::Amount(fund))
            .await?;

        for player in [&opponent, registrant] {
            self.insert(
                Key::ActiveGame(player.clone()),
                Value::ActiveGame(session_id),
            )
            .await?;
            let pending = self.pending_balance(player).await?;
            self.insert(
                Key::PendingBalance(player.clone()),
                Value::Amount(pending.saturating_sub(fee)),
            )
            .await?;
        }

        info!(
            session_id,
            player1 = ?opponent,
            player2 = ?registrant,
            fund,
            "session created"
        );
        Ok(Event::SessionCreated {
            session_id,
            player1: opponent,
            player2: registrant.clone(),
            fund,
        })
    }
}
