//! Apply a block's transactions to state.
//!
//! Blocks are applied strictly in height order. Re-submitting a block at or below the
//! committed height is a no-op, so replays after a crash converge to the same state.

use crate::{query::query_height, rules::GameRules, Layer, State};
use anyhow::{anyhow, Context as _};
use arena_types::{
    arena::MatchConfig,
    execution::{Key, Output, Transaction, Value, MAX_BLOCK_TRANSACTIONS},
};
use tracing::debug;

/// Result of executing a block's state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransitionResult {
    /// Height committed after this call.
    pub height: u64,
    /// Events and transactions in execution order, ending with `Output::Commit`.
    /// Empty when the block was already applied.
    pub outputs: Vec<Output>,
    pub executed_transactions: usize,
}

/// Execute state transition for a block
///
/// Only the next expected height (`committed + 1`) is executed; a height gap is an error,
/// and so are `rules` built for different game parameters than `config`. On success the accepted writes and a `Commit` marker are applied to `state`.
pub async fn execute_block<S: State, R: GameRules>(
    state: &mut S,
    config: &MatchConfig,
    rules: &R,
    height: u64,
    transactions: Vec<Transaction>,
) -> anyhow::Result<StateTransitionResult> {
    let state_height = query_height(state).await.context("read committed height")?;

    if height <= state_height {
        debug!(height, state_height, "block already applied");
        return Ok(StateTransitionResult {
            height: state_height,
            outputs: Vec::new(),
            executed_transactions: 0,
        });
    }

    let expected_next_height = state_height.saturating_add(1);
    if height != expected_next_height {
        return Err(anyhow!(
            "non-sequential height: state_height={state_height}, expected={expected_next_height}, requested={height}"
        ));
    }
    if transactions.len() > MAX_BLOCK_TRANSACTIONS {
        return Err(anyhow!(
            "block {height} carries {} transactions (max {MAX_BLOCK_TRANSACTIONS})",
            transactions.len()
        ));
    }
    if !rules.matches_config(config) {
        return Err(anyhow!(
            "game rules do not match config: board_size={}, line_length={}",
            config.board_size,
            config.line_length
        ));
    }

    let executed_transactions = transactions.len();
    let (mut outputs, changes) = {
        let mut layer = Layer::new(&*state, config.clone(), rules, height);
        let outputs = layer
            .execute(transactions)
            .await
            .with_context(|| format!("execute layer (height={height})"))?;
        (outputs, layer.commit())
    };

    state
        .apply(changes)
        .await
        .with_context(|| format!("apply state changes (height={height})"))?;
    state
        .insert(Key::Commit, Value::Commit { height })
        .await
        .with_context(|| format!("commit state (height={height})"))?;
    outputs.push(Output::Commit { height });

    Ok(StateTransitionResult {
        height,
        outputs,
        executed_transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_account_keypair, fund};
    use crate::rules::FiveInRow;
    use crate::Memory;
    use arena_types::{arena::ENTRY_FEE, execution::Instruction};
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    fn register(seed: u64) -> Transaction {
        let (_, public) = create_account_keypair(seed);
        Transaction::new(
            public.clone(),
            Instruction::Register {
                session_key: public,
                timestamp: 0,
            },
        )
    }

    #[test]
    fn test_height_equal_to_state_height_is_noop() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            fund(&mut state, &create_account_keypair(1).1, ENTRY_FEE)
                .await
                .unwrap();
            let config = MatchConfig::default();
            let rules = FiveInRow::default();

            let first = execute_block(&mut state, &config, &rules, 1, vec![register(1)])
                .await
                .unwrap();
            assert_eq!(first.executed_transactions, 1);
            assert_eq!(first.outputs.last(), Some(&Output::Commit { height: 1 }));
            let snapshot = state.clone();

            let second = execute_block(&mut state, &config, &rules, 1, vec![register(1)])
                .await
                .unwrap();
            assert_eq!(second.executed_transactions, 0);
            assert!(second.outputs.is_empty());
            assert_eq!(second.height, 1);
            assert!(state.entries().eq(snapshot.entries()));
        });
    }

    #[test]
    fn test_height_gap_rejected() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let config = MatchConfig::default();
            let rules = FiveInRow::default();

            execute_block(&mut state, &config, &rules, 1, vec![])
                .await
                .unwrap();
            let err = execute_block(&mut state, &config, &rules, 3, vec![])
                .await
                .unwrap_err();
            assert!(err.to_string().contains("non-sequential height"));
            assert_eq!(query_height(&state).await.unwrap(), 1);

            execute_block(&mut state, &config, &rules, 2, vec![])
                .await
                .unwrap();
            assert_eq!(query_height(&state).await.unwrap(), 2);
        });
    }

    #[test]
    fn test_first_block_must_be_height_one() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let config = MatchConfig::default();
            let rules = FiveInRow::default();
            assert!(execute_block(&mut state, &config, &rules, 2, vec![])
                .await
                .is_err());
            assert!(state.is_empty());
        });
    }

    #[test]
    fn test_oversized_block_rejected() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let config = MatchConfig::default();
            let rules = FiveInRow::default();
            let txs = vec![register(1); MAX_BLOCK_TRANSACTIONS + 1];
            assert!(execute_block(&mut state, &config, &rules, 1, txs)
                .await
                .is_err());
            assert!(state.is_empty());
        });
    }

    #[test]
    fn test_rules_must_match_config() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            let config = MatchConfig::default();
            let rules = FiveInRow::new(9, 5);
            let err = execute_block(&mut state, &config, &rules, 1, vec![])
                .await
                .unwrap_err();
            assert!(err.to_string().contains("game rules do not match config"));
            assert!(state.is_empty());
        });
    }
}
