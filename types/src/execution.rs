use crate::arena::{
    bytes_encode_size, read_bytes, write_bytes, GameSession, Holder, MatchError, QueueEntry,
    MAX_CLAIM_LENGTH, MAX_STATE_LENGTH,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};

/// Maximum number of transactions applied in one block.
pub const MAX_BLOCK_TRANSACTIONS: usize = 500;

/// One ordered call against the ledger: the caller address plus its arguments.
///
/// Signatures are verified by the ordering layer before a transaction reaches execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub public: PublicKey,
    pub instruction: Instruction,
}

impl Transaction {
    pub fn new(public: PublicKey, instruction: Instruction) -> Self {
        Self {
            public,
            instruction,
        }
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.public.write(writer);
        self.instruction.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            public: PublicKey::read(reader)?,
            instruction: Instruction::read(reader)?,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.public.encode_size() + self.instruction.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Bind a session key and join (or pair within) the current round's queue.
    /// Binary: [0] [sessionKey:32] [timestamp:u64 BE]
    Register {
        session_key: PublicKey,
        timestamp: u64,
    },

    /// Mint the caller's withheld pending balance back to them.
    /// Binary: [1]
    CollectPendingBalance,

    /// Submit the next game state with an optional win claim.
    /// Binary: [2] [sessionId:u64 BE] [stateLen:u32 BE] [state...] [claimLen:u32 BE] [claim...]
    MakeMove {
        session_id: u64,
        proposed_state: Vec<u8>,
        claim: Vec<u8>,
    },

    /// Win a session whose opponent stalled past the move timeout.
    /// Binary: [3] [sessionId:u64 BE]
    ClaimTimeout { session_id: u64 },

    /// Pay out the fund of a session that has a winner.
    /// Binary: [4] [sessionId:u64 BE]
    Win { session_id: u64 },
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Register {
                session_key,
                timestamp,
            } => {
                0u8.write(writer);
                session_key.write(writer);
                timestamp.write(writer);
            }
            Self::CollectPendingBalance => 1u8.write(writer),
            Self::MakeMove {
                session_id,
                proposed_state,
                claim,
            } => {
                2u8.write(writer);
                session_id.write(writer);
                write_bytes(proposed_state, writer);
                write_bytes(claim, writer);
            }
            Self::ClaimTimeout { session_id } => {
                3u8.write(writer);
                session_id.write(writer);
            }
            Self::Win { session_id } => {
                4u8.write(writer);
                session_id.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            0 => Self::Register {
                session_key: PublicKey::read(reader)?,
                timestamp: u64::read(reader)?,
            },
            1 => Self::CollectPendingBalance,
            2 => Self::MakeMove {
                session_id: u64::read(reader)?,
                proposed_state: read_bytes(reader, MAX_STATE_LENGTH, "Instruction")?,
                claim: read_bytes(reader, MAX_CLAIM_LENGTH, "Instruction")?,
            },
            3 => Self::ClaimTimeout {
                session_id: u64::read(reader)?,
            },
            4 => Self::Win {
                session_id: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Register { .. } => PublicKey::SIZE + u64::SIZE,
                Self::CollectPendingBalance => 0,
                Self::MakeMove {
                    proposed_state,
                    claim,
                    ..
                } => u64::SIZE + bytes_encode_size(proposed_state) + bytes_encode_size(claim),
                Self::ClaimTimeout { .. } | Self::Win { .. } => u64::SIZE,
            }
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Escrow balance of a holder for a token (tag 0)
    Balance(u64, Holder),

    // Registrar keys (tags 10-15)
    SessionKey(PublicKey),
    ActiveGame(PublicKey),
    PendingBalance(PublicKey),
    QueueLength(u64),
    QueueEntry { round: u64, index: u64 },
    QueueRegistered { round: u64, player: PublicKey },

    // Session keys (tags 20-23)
    Session(u64),
    SessionCount,
    GameFund(u64),
    GameFinished(u64),

    /// Last executed block (tag 30)
    Commit,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Balance(token, holder) => {
                0u8.write(writer);
                token.write(writer);
                holder.write(writer);
            }

            Self::SessionKey(pk) => {
                10u8.write(writer);
                pk.write(writer);
            }
            Self::ActiveGame(pk) => {
                11u8.write(writer);
                pk.write(writer);
            }
            Self::PendingBalance(pk) => {
                12u8.write(writer);
                pk.write(writer);
            }
            Self::QueueLength(round) => {
                13u8.write(writer);
                round.write(writer);
            }
            Self::QueueEntry { round, index } => {
                14u8.write(writer);
                round.write(writer);
                index.write(writer);
            }
            Self::QueueRegistered { round, player } => {
                15u8.write(writer);
                round.write(writer);
                player.write(writer);
            }

            Self::Session(id) => {
                20u8.write(writer);
                id.write(writer);
            }
            Self::SessionCount => 21u8.write(writer),
            Self::GameFund(id) => {
                22u8.write(writer);
                id.write(writer);
            }
            Self::GameFinished(id) => {
                23u8.write(writer);
                id.write(writer);
            }

            Self::Commit => 30u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Balance(u64::read(reader)?, Holder::read(reader)?),

            10 => Self::SessionKey(PublicKey::read(reader)?),
            11 => Self::ActiveGame(PublicKey::read(reader)?),
            12 => Self::PendingBalance(PublicKey::read(reader)?),
            13 => Self::QueueLength(u64::read(reader)?),
            14 => Self::QueueEntry {
                round: u64::read(reader)?,
                index: u64::read(reader)?,
            },
            15 => Self::QueueRegistered {
                round: u64::read(reader)?,
                player: PublicKey::read(reader)?,
            },

            20 => Self::Session(u64::read(reader)?),
            21 => Self::SessionCount,
            22 => Self::GameFund(u64::read(reader)?),
            23 => Self::GameFinished(u64::read(reader)?),

            30 => Self::Commit,

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Balance(_, holder) => u64::SIZE + holder.encode_size(),

                Self::SessionKey(_) | Self::ActiveGame(_) | Self::PendingBalance(_) => {
                    PublicKey::SIZE
                }
                Self::QueueLength(_) => u64::SIZE,
                Self::QueueEntry { .. } => u64::SIZE + u64::SIZE,
                Self::QueueRegistered { .. } => u64::SIZE + PublicKey::SIZE,

                Self::Session(_) | Self::GameFund(_) | Self::GameFinished(_) => u64::SIZE,
                Self::SessionCount => 0,

                Self::Commit => 0,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    /// Token amount: escrow balances, pending balances and game funds (tag 0)
    Amount(u64),
    /// Counters: queue lengths and the session counter (tag 1)
    Count(u64),
    /// Registration and finished flags (tag 2)
    Flag(bool),

    // Registrar values (tags 10-12)
    SessionOwner(PublicKey),
    ActiveGame(u64),
    QueueEntry(QueueEntry),

    // Session values (tag 20)
    Session(GameSession),

    // System values (tag 30)
    Commit { height: u64 },
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Amount(amount) => {
                0u8.write(writer);
                amount.write(writer);
            }
            Self::Count(count) => {
                1u8.write(writer);
                count.write(writer);
            }
            Self::Flag(flag) => {
                2u8.write(writer);
                flag.write(writer);
            }

            Self::SessionOwner(owner) => {
                10u8.write(writer);
                owner.write(writer);
            }
            Self::ActiveGame(id) => {
                11u8.write(writer);
                id.write(writer);
            }
            Self::QueueEntry(entry) => {
                12u8.write(writer);
                entry.write(writer);
            }

            Self::Session(session) => {
                20u8.write(writer);
                session.write(writer);
            }

            Self::Commit { height } => {
                30u8.write(writer);
                height.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Amount(u64::read(reader)?),
            1 => Self::Count(u64::read(reader)?),
            2 => Self::Flag(bool::read(reader)?),

            10 => Self::SessionOwner(PublicKey::read(reader)?),
            11 => Self::ActiveGame(u64::read(reader)?),
            12 => Self::QueueEntry(QueueEntry::read(reader)?),

            20 => Self::Session(GameSession::read(reader)?),

            30 => Self::Commit {
                height: u64::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Amount(_) | Self::Count(_) | Self::ActiveGame(_) => u64::SIZE,
                Self::Flag(_) => bool::SIZE,
                Self::SessionOwner(_) => PublicKey::SIZE,
                Self::QueueEntry(_) => QueueEntry::SIZE,
                Self::Session(session) => session.encode_size(),
                Self::Commit { .. } => u64::SIZE,
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Registrar events (tags 0-2)
    PlayerQueued {
        player: PublicKey,
        round: u64,
        index: u64,
    },
    SessionCreated {
        session_id: u64,
        player1: PublicKey,
        player2: PublicKey,
        fund: u64,
    },
    PendingBalanceCollected {
        player: PublicKey,
        amount: u64,
    },

    // Session events (tags 10-12)
    MoveApplied {
        session_id: u64,
        player: PublicKey,
        move_number: u32,
        board_digest: Digest,
        winner: Option<PublicKey>,
    },
    TimeoutClaimed {
        session_id: u64,
        winner: PublicKey,
    },
    SessionSettled {
        session_id: u64,
        recipient: Holder,
        amount: u64,
    },

    /// A call was dropped without touching state (tag 20)
    Rejected {
        caller: PublicKey,
        session_id: Option<u64>,
        error: MatchError,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::PlayerQueued {
                player,
                round,
                index,
            } => {
                0u8.write(writer);
                player.write(writer);
                round.write(writer);
                index.write(writer);
            }
            Self::SessionCreated {
                session_id,
                player1,
                player2,
                fund,
            } => {
                1u8.write(writer);
                session_id.write(writer);
                player1.write(writer);
                player2.write(writer);
                fund.write(writer);
            }
            Self::PendingBalanceCollected { player, amount } => {
                2u8.write(writer);
                player.write(writer);
                amount.write(writer);
            }

            Self::MoveApplied {
                session_id,
                player,
                move_number,
                board_digest,
                winner,
            } => {
                10u8.write(writer);
                session_id.write(writer);
                player.write(writer);
                move_number.write(writer);
                board_digest.write(writer);
                winner.write(writer);
            }
            Self::TimeoutClaimed { session_id, winner } => {
                11u8.write(writer);
                session_id.write(writer);
                winner.write(writer);
            }
            Self::SessionSettled {
                session_id,
                recipient,
                amount,
            } => {
                12u8.write(writer);
                session_id.write(writer);
                recipient.write(writer);
                amount.write(writer);
            }

            Self::Rejected {
                caller,
                session_id,
                error,
            } => {
                20u8.write(writer);
                caller.write(writer);
                session_id.write(writer);
                error.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            0 => Self::PlayerQueued {
                player: PublicKey::read(reader)?,
                round: u64::read(reader)?,
                index: u64::read(reader)?,
            },
            1 => Self::SessionCreated {
                session_id: u64::read(reader)?,
                player1: PublicKey::read(reader)?,
                player2: PublicKey::read(reader)?,
                fund: u64::read(reader)?,
            },
            2 => Self::PendingBalanceCollected {
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },

            10 => Self::MoveApplied {
                session_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                move_number: u32::read(reader)?,
                board_digest: Digest::read(reader)?,
                winner: Option::<PublicKey>::read(reader)?,
            },
            11 => Self::TimeoutClaimed {
                session_id: u64::read(reader)?,
                winner: PublicKey::read(reader)?,
            },
            12 => Self::SessionSettled {
                session_id: u64::read(reader)?,
                recipient: Holder::read(reader)?,
                amount: u64::read(reader)?,
            },

            20 => Self::Rejected {
                caller: PublicKey::read(reader)?,
                session_id: Option::<u64>::read(reader)?,
                error: MatchError::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::PlayerQueued { .. } => PublicKey::SIZE + u64::SIZE + u64::SIZE,
                Self::SessionCreated { .. } => {
                    u64::SIZE + PublicKey::SIZE + PublicKey::SIZE + u64::SIZE
                }
                Self::PendingBalanceCollected { .. } => PublicKey::SIZE + u64::SIZE,

                Self::MoveApplied { winner, .. } => {
                    u64::SIZE + PublicKey::SIZE + u32::SIZE + Digest::SIZE + winner.encode_size()
                }
                Self::TimeoutClaimed { .. } => u64::SIZE + PublicKey::SIZE,
                Self::SessionSettled { recipient, .. } => {
                    u64::SIZE + recipient.encode_size() + u64::SIZE
                }

                Self::Rejected { session_id, .. } => {
                    PublicKey::SIZE + session_id.encode_size() + MatchError::SIZE
                }
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
    Commit { height: u64 },
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
            Self::Commit { height } => {
                2u8.write(writer);
                height.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            2 => Ok(Self::Commit {
                height: u64::read(reader)?,
            }),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Event(event) => event.encode_size(),
            Self::Transaction(transaction) => transaction.encode_size(),
            Self::Commit { .. } => u64::SIZE,
        }
    }
}
