use super::super::*;
use crate::rules::decode_exact;
use commonware_codec::Encode;
use commonware_cryptography::{sha256::Sha256, Hasher};

impl<'a, S: State, R: GameRules> Layer<'a, S, R> {
    // === Game Session moves ===

    pub(in crate::layer) async fn handle_make_move(
        &mut self,
        public: &PublicKey,
        session_id: u64,
        proposed_state: &[u8],
        claim: &[u8],
    ) -> CallResult {
        let mover = self.resolve_caller(public).await?;
        let mut session = self.load_session(session_id).await?;
        if session.current_move_user != mover {
            return Err(MatchError::NotYourMove.into());
        }
        if session.is_finished() {
            return Err(MatchError::GameFinished.into());
        }

        let current = decode_exact::<R::State>(&session.state_blob)
            .map_err(|_| anyhow::anyhow!("session {session_id} holds undecodable state"))?;
        let proposed = decode_exact::<R::State>(proposed_state)?;
        let claim = decode_exact::<R::Claim>(claim)?;

        let seat = session.current_seat();
        let outcome = self.rules.apply_move(&current, proposed, &claim, seat)?;

        session.state_blob = outcome.state.encode().to_vec();
        session.winner = outcome.won.then(|| mover.clone());
        session.current_move_user = session.player(seat.other()).clone();
        session.last_move_height = self.height;
        session.move_count = session.move_count.saturating_add(1);

        let board_digest = Sha256::hash(&session.state_blob);
        let move_number = session.move_count;
        let winner = session.winner.clone();
        if outcome.won {
            self.release_players(&session).await?;
            info!(session_id, winner = ?mover, move_number, "win proved");
        } else {
            debug!(session_id, player = ?mover, move_number, "move applied");
        }
        self.store_session(session).await?;

        Ok(vec![Event::MoveApplied {
            session_id,
            player: mover,
            move_number,
            board_digest,
            winner,
        }])
    }
}
