use super::super::*;

impl<'a, S: State, R: GameRules> Layer<'a, S, R> {
    // === Timeout Resolver ===

    /// Award a stalled session to the waiting player once the mover has been idle for
    /// more than `move_timeout` blocks. Funds are paid out by a later `Win` call.
    pub(in crate::layer) async fn handle_claim_timeout(
        &mut self,
        public: &PublicKey,
        session_id: u64,
    ) -> CallResult {
        let claimant = self.resolve_caller(public).await?;
        let mut session = self.load_session(session_id).await?;
        if *session.waiting_player() != claimant {
            return Err(MatchError::NotYourMove.into());
        }
        if session.is_finished() {
            return Err(MatchError::GameFinished.into());
        }
        let idle = self.height.saturating_sub(session.last_move_height);
        if idle <= self.config.move_timeout {
            return Err(MatchError::TimeoutNotReached.into());
        }

        session.winner = Some(claimant.clone());
        session.last_move_height = self.height;
        self.release_players(&session).await?;
        self.store_session(session).await?;
        info!(session_id, winner = ?claimant, idle, "timeout claimed");

        Ok(vec![Event::TimeoutClaimed {
            session_id,
            winner: claimant,
        }])
    }
}
