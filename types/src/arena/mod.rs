//! Matchmaking domain types.
//!
//! Defines the session/queue/escrow records, the five-in-a-row board, the rejection
//! taxonomy, and the engine configuration used by the execution layer and tooling.

mod board;
mod codec;
mod config;
mod constants;
mod error;
mod session;

pub use board::*;
pub use codec::{bytes_encode_size, read_bytes, write_bytes};
pub use config::*;
pub use constants::*;
pub use error::*;
pub use session::*;

#[cfg(test)]
mod tests;
