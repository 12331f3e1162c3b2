//! Arena execution layer.
//!
//! This crate contains the deterministic matchmaking and settlement state machine
//! (`Layer`), the pluggable game rules it drives, and the block-level state transition.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution; "now" is the block height.
//! - Do not use randomness; pairing order and win detection are fully determined by state.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Atomicity
//! Every call either commits all of its writes or none of them. A rejected call is
//! reported with `Event::Rejected` and the next call applies against the unchanged state.
//!
//! The primary entrypoint is [`state_transition::execute_block`].
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use arena_execution::{rules::FiveInRow, state_transition::execute_block, Memory};
//! use arena_types::MatchConfig;
//!
//! # async fn example(transactions: Vec<arena_types::Transaction>) -> anyhow::Result<()> {
//! let config = MatchConfig::default().validate()?;
//! let rules = FiveInRow::from_config(&config);
//! let mut state = Memory::default();
//! let result = execute_block(&mut state, &config, &rules, 1, transactions).await?;
//! # Ok(())
//! # }
//! ```

pub mod query;
pub mod rules;
pub mod state_transition;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


mod layer;

mod state;

pub use layer::Layer;
pub use rules::{detect_win, FiveInRow, GameRules, MoveOutcome};
pub use state::{Memory, State, Status};
