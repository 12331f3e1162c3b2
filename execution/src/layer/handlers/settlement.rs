use super::super::*;

impl<'a, S: State, R: GameRules> Layer<'a, S, R> {
    // === Settlement ===

    /// Pay out the fund of a session that has a winner. Anyone may trigger it.
    pub(in crate::layer) async fn handle_win(
        &mut self,
        public: &PublicKey,
        session_id: u64,
    ) -> CallResult {
        let session = self.load_session(session_id).await?;
        let Some(winner) = session.winner else {
            return Err(MatchError::NoWinnerYet.into());
        };

        let events = self
            .distribute_fund(
                session_id,
                &[(Holder::Player(winner.clone()), 1), (Holder::Null, 0)],
            )
            .await?;
        info!(session_id, ?winner, caller = ?public, "session settled");
        Ok(events)
    }

    /// Split the session fund by `shares`, rounding each payout down, then mark the
    /// session finished. Fails if the session was already settled.
    pub(in crate::layer) async fn distribute_fund(
        &mut self,
        session_id: u64,
        shares: &[(Holder, u64)],
    ) -> CallResult {
        if query::query_game_finished(self, session_id).await? {
            return Err(MatchError::AlreadySettled.into());
        }
        self.insert(Key::GameFinished(session_id), Value::Flag(true))
            .await?;

        let fund = query::query_game_fund(self, session_id).await?;
        let total: u128 = shares.iter().map(|(_, share)| *share as u128).sum();
        let mut events = Vec::new();
        for (recipient, share) in shares {
            let amount = (fund as u128)
                .saturating_mul(*share as u128)
                .checked_div(total)
                .unwrap_or(0) as u64;
            if amount == 0 {
                continue;
            }
            self.mint(recipient, amount).await?;
            events.push(Event::SessionSettled {
                session_id,
                recipient: recipient.clone(),
                amount,
            });
        }
        self.insert(Key::GameFund(session_id), Value::Amount(0))
            .await?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use crate::rules::FiveInRow;
    use crate::Memory;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    async fn finished_session(winner: Option<PublicKey>, fund: u64) -> Memory {
        let (_, alice) = create_account_keypair(1);
        let (_, bob) = create_account_keypair(2);
        let mut state = Memory::default();
        state
            .insert(
                Key::Session(1),
                Value::Session(GameSession {
                    id: 1,
                    player1: alice.clone(),
                    player2: bob,
                    current_move_user: alice,
                    last_move_height: 1,
                    winner,
                    move_count: 0,
                    state_blob: Vec::new(),
                }),
            )
            .await
            .unwrap();
        state
            .insert(Key::GameFund(1), Value::Amount(fund))
            .await
            .unwrap();
        state
    }

    #[test]
    fn test_win_pays_winner_once() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, bob) = create_account_keypair(2);
            let state = finished_session(Some(bob.clone()), 2_000).await;
            let rules = FiveInRow::default();
            let mut layer = Layer::new(&state, MatchConfig::default(), &rules, 5);
            let caller = create_account_keypair(9).1;

            let events = layer.handle_win(&caller, 1).await.unwrap();
            assert_eq!(
                events,
                vec![Event::SessionSettled {
                    session_id: 1,
                    recipient: Holder::Player(bob.clone()),
                    amount: 2_000
                }]
            );
            layer.close_call(true);
            let bob = Holder::Player(bob);
            assert_eq!(layer.balance(&bob).await.unwrap(), 2_000);
            assert_eq!(layer.balance(&Holder::Null).await.unwrap(), 0);

            assert!(matches!(
                layer.handle_win(&caller, 1).await,
                Err(CallError::Rejected(MatchError::AlreadySettled))
            ));
            layer.close_call(false);
            assert_eq!(layer.balance(&bob).await.unwrap(), 2_000);
            assert_eq!(query::query_game_fund(&layer, 1).await.unwrap(), 0);
        });
    }

    #[test]
    fn test_win_requires_winner() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = finished_session(None, 2_000).await;
            let rules = FiveInRow::default();
            let mut layer = Layer::new(&state, MatchConfig::default(), &rules, 5);
            let caller = create_account_keypair(1).1;

            assert!(matches!(
                layer.handle_win(&caller, 1).await,
                Err(CallError::Rejected(MatchError::NoWinnerYet))
            ));
            assert!(matches!(
                layer.handle_win(&caller, 2).await,
                Err(CallError::Rejected(MatchError::InvalidSessionId))
            ));
        });
    }

    #[test]
    fn test_distribute_fund_splits_by_share() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = finished_session(None, 1_000).await;
            let rules = FiveInRow::default();
            let mut layer = Layer::new(&state, MatchConfig::default(), &rules, 5);
            let (_, alice) = create_account_keypair(1);
            let (_, bob) = create_account_keypair(2);
            let carol = create_account_keypair(3).1;
            let shares = [
                (Holder::Player(alice.clone()), 1),
                (Holder::Player(bob.clone()), 1),
                (Holder::Player(carol.clone()), 1),
            ];

            let events = layer.distribute_fund(1, &shares).await.unwrap();
            assert_eq!(events.len(), 3);
            for (holder, _) in &shares {
                assert_eq!(layer.balance(holder).await.unwrap(), 333);
            }
            assert!(query::query_game_finished(&layer, 1).await.unwrap());
        });
    }
}
