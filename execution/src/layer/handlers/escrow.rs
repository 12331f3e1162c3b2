use super::super::*;

impl<'a, S: State, R: GameRules> Layer<'a, S, R> {
    // === Escrow Ledger ===

    pub(in crate::layer) async fn balance(&self, holder: &Holder) -> Result<u64> {
        query::query_balance(self, self.config.token_id, holder).await
    }

    async fn set_balance(&mut self, holder: &Holder, amount: u64) -> Result<()> {
        self.insert(
            Key::Balance(self.config.token_id, holder.clone()),
            Value::Amount(amount),
        )
        .await
    }

    /// Move `amount` between holders; fails when `from` cannot cover it.
    pub(in crate::layer) async fn transfer(
        &mut self,
        from: &Holder,
        to: &Holder,
        amount: u64,
    ) -> CallResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let remaining = self
            .balance(from)
            .await?
            .checked_sub(amount)
            .ok_or(MatchError::InsufficientBalance)?;
        self.set_balance(from, remaining).await?;
        let credited = self.balance(to).await?.saturating_add(amount);
        self.set_balance(to, credited).await?;
        Ok(())
    }

    /// Unconditional credit.
    pub(in crate::layer) async fn mint(&mut self, to: &Holder, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let credited = self.balance(to).await?.saturating_add(amount);
        self.set_balance(to, credited).await
    }
}
