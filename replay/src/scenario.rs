//! YAML scenario format.
//!
//! ```yaml
//! config:
//!   move_timeout: 3
//! players:
//!   alice: 1
//!   bob: 2
//! balances:
//!   alice: 5000000000
//!   bob: 5000000000
//! blocks:
//!   - - register: alice
//!     - register: bob
//!   - - place: { player: alice, session: 1, x: 7, y: 7 }
//!   - []
//!   - - claim_timeout: { player: bob, session: 1 }
//! ```

use anyhow::{bail, Context, Result};
use arena_execution::mocks::create_account_keypair;
use arena_types::arena::{MatchConfig, WinWitness};
use commonware_cryptography::ed25519::PublicKey;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Overrides of the default match parameters.
    #[serde(default)]
    pub config: MatchConfig,
    /// Player name to key seed.
    pub players: BTreeMap<String, u64>,
    /// Starting escrow balance per player name.
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,
    /// Ordered blocks; block `i` executes at height `i + 1`.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub blocks: Vec<Vec<Step>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Register(String),
    Collect(String),
    Place(Place),
    ClaimTimeout(SessionCall),
    Win(SessionCall),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Place {
    pub player: String,
    pub session: u64,
    pub x: i64,
    pub y: i64,
    /// Explicit win claim submitted with the move.
    #[serde(default)]
    pub claim: Option<Claim>,
    /// Attach the first winning line found on the new board, if any.
    #[serde(default)]
    pub auto_claim: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claim {
    pub x: u8,
    pub y: u8,
    pub direction_x: i8,
    pub direction_y: i8,
}

impl From<Claim> for WinWitness {
    fn from(claim: Claim) -> Self {
        Self {
            x: claim.x,
            y: claim.y,
            direction_x: claim.direction_x,
            direction_y: claim.direction_y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionCall {
    pub player: String,
    pub session: u64,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read scenario file {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut scenario: Self =
            serde_yaml::from_str(contents).context("Could not parse scenario file")?;
        scenario.config = scenario
            .config
            .validate()
            .context("Invalid match config")?;
        for name in scenario.balances.keys() {
            if !scenario.players.contains_key(name) {
                bail!("balance given for unknown player {name}");
            }
        }
        Ok(scenario)
    }

    /// Public keys of every named player.
    pub fn keys(&self) -> BTreeMap<String, PublicKey> {
        self.players
            .iter()
            .map(|(name, seed)| (name.clone(), create_account_keypair(*seed).1))
            .collect()
    }
}
