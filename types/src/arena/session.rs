use super::board::Seat;
use super::codec::{bytes_encode_size, read_bytes, write_bytes};
use super::constants::MAX_STATE_LENGTH;
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

/// Owner of an escrow balance. `Null` is the sink fees are withheld into and the
/// recipient of forfeited shares.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Holder {
    Null,
    Player(PublicKey),
}

impl From<PublicKey> for Holder {
    fn from(public: PublicKey) -> Self {
        Self::Player(public)
    }
}

impl Write for Holder {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Null => 0u8.write(writer),
            Self::Player(public) => {
                1u8.write(writer);
                public.write(writer);
            }
        }
    }
}

impl Read for Holder {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Null),
            1 => Ok(Self::Player(PublicKey::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Holder {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Null => 0,
                Self::Player(_) => PublicKey::SIZE,
            }
    }
}

/// A player waiting in a round's queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub player: PublicKey,
    /// Client-supplied timestamp; informational only, never used for ordering.
    pub registration_timestamp: u64,
}

impl Write for QueueEntry {
    fn write(&self, writer: &mut impl BufMut) {
        self.player.write(writer);
        self.registration_timestamp.write(writer);
    }
}

impl Read for QueueEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            player: PublicKey::read(reader)?,
            registration_timestamp: u64::read(reader)?,
        })
    }
}

impl FixedSize for QueueEntry {
    const SIZE: usize = PublicKey::SIZE + u64::SIZE;
}

/// Header of a two-player session plus the game-specific state blob.
///
/// While `winner` is `None`, `current_move_user` is always one of the two players.
/// Once a winner is recorded the session is terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    pub id: u64,
    pub player1: PublicKey,
    pub player2: PublicKey,
    pub current_move_user: PublicKey,
    pub last_move_height: u64,
    pub winner: Option<PublicKey>,
    pub move_count: u32,
    pub state_blob: Vec<u8>,
}

impl GameSession {
    pub fn seat_of(&self, player: &PublicKey) -> Option<Seat> {
        if *player == self.player1 {
            Some(Seat::First)
        } else if *player == self.player2 {
            Some(Seat::Second)
        } else {
            None
        }
    }

    pub fn player(&self, seat: Seat) -> &PublicKey {
        match seat {
            Seat::First => &self.player1,
            Seat::Second => &self.player2,
        }
    }

    /// Seat due to move next.
    pub fn current_seat(&self) -> Seat {
        if self.current_move_user == self.player1 {
            Seat::First
        } else {
            Seat::Second
        }
    }

    /// The player who is not due to move (the only one allowed to claim a timeout).
    pub fn waiting_player(&self) -> &PublicKey {
        self.player(self.current_seat().other())
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }
}

impl Write for GameSession {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player1.write(writer);
        self.player2.write(writer);
        self.current_move_user.write(writer);
        self.last_move_height.write(writer);
        self.winner.write(writer);
        self.move_count.write(writer);
        write_bytes(&self.state_blob, writer);
    }
}

impl Read for GameSession {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            player1: PublicKey::read(reader)?,
            player2: PublicKey::read(reader)?,
            current_move_user: PublicKey::read(reader)?,
            last_move_height: u64::read(reader)?,
            winner: Option::<PublicKey>::read(reader)?,
            move_count: u32::read(reader)?,
            state_blob: read_bytes(reader, MAX_STATE_LENGTH, "GameSession")?,
        })
    }
}

impl EncodeSize for GameSession {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.player1.encode_size()
            + self.player2.encode_size()
            + self.current_move_user.encode_size()
            + self.last_move_height.encode_size()
            + self.winner.encode_size()
            + self.move_count.encode_size()
            + bytes_encode_size(&self.state_blob)
    }
}
