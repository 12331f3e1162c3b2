//! Common types used throughout the arena.
//!
//! `arena` holds the domain records (sessions, queue entries, boards, configuration and
//! rejection codes); `execution` holds the wire-level transaction, state key/value and
//! output encodings consumed by the execution layer.

pub mod arena;
pub mod execution;

pub use arena::{MatchConfig, MatchError};
pub use execution::{Event, Instruction, Key, Output, Transaction, Value};
