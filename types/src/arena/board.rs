use super::constants::MAX_BOARD_SIZE;
use super::error::MatchError;
use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};

/// Value of a cell nobody has marked.
pub const EMPTY_CELL: u8 = 0;

/// Which side of a session a player sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// Mark this seat writes on the board (1 for player1, 2 for player2).
    pub const fn mark(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Square grid of cells stored row-major. `(x, y)` addresses row `x`, column `y`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: u8,
    cells: Vec<u8>,
}

impl Board {
    pub fn empty(size: u8) -> Self {
        let side = size as usize;
        Self {
            size,
            cells: vec![EMPTY_CELL; side * side],
        }
    }

    /// Build a board from explicit rows. Returns `None` unless the rows form a square.
    pub fn from_rows(rows: &[Vec<u8>]) -> Option<Self> {
        let size = u8::try_from(rows.len()).ok()?;
        if size > MAX_BOARD_SIZE || rows.iter().any(|row| row.len() != rows.len()) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let side = self.size as i64;
        if x < 0 || y < 0 || x >= side || y >= side {
            return None;
        }
        Some((x * side + y) as usize)
    }

    /// Cell at `(x, y)`, or `None` when off the board.
    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Overwrite the cell at `(x, y)`. Returns `false` when off the board.
    pub fn set(&mut self, x: i64, y: i64, value: u8) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    /// SHA-256 over the canonical encoding; published with every applied move.
    pub fn digest(&self) -> Digest {
        Sha256::hash(&self.encode())
    }
}

impl Write for Board {
    fn write(&self, writer: &mut impl BufMut) {
        self.size.write(writer);
        writer.put_slice(&self.cells);
    }
}

impl Read for Board {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let size = u8::read(reader)?;
        if size > MAX_BOARD_SIZE {
            return Err(Error::Invalid("Board", "board too large"));
        }
        let len = size as usize * size as usize;
        if reader.remaining() < len {
            return Err(Error::EndOfBuffer);
        }
        let mut cells = vec![EMPTY_CELL; len];
        reader.copy_to_slice(&mut cells);
        Ok(Self { size, cells })
    }
}

impl EncodeSize for Board {
    fn encode_size(&self) -> usize {
        u8::SIZE + self.cells.len()
    }
}

/// Mover-asserted winning line: `line_length` cells starting at `(x, y)`, stepping by
/// `(direction_x, direction_y)`. A zero direction means "no win claimed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WinWitness {
    pub x: u8,
    pub y: u8,
    pub direction_x: i8,
    pub direction_y: i8,
}

impl WinWitness {
    /// The trivial claim attached to ordinary moves.
    pub const NONE: Self = Self {
        x: 0,
        y: 0,
        direction_x: 0,
        direction_y: 0,
    };

    pub fn is_claim(&self) -> bool {
        self.direction_x != 0 || self.direction_y != 0
    }

    /// Direction components must each be -1, 0 or 1.
    pub fn assert_correct(&self) -> Result<(), MatchError> {
        if !(-1..=1).contains(&self.direction_x) || !(-1..=1).contains(&self.direction_y) {
            return Err(MatchError::InvalidDirection);
        }
        Ok(())
    }
}

impl Write for WinWitness {
    fn write(&self, writer: &mut impl BufMut) {
        self.x.write(writer);
        self.y.write(writer);
        (self.direction_x as u8).write(writer);
        (self.direction_y as u8).write(writer);
    }
}

impl Read for WinWitness {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            x: u8::read(reader)?,
            y: u8::read(reader)?,
            direction_x: u8::read(reader)? as i8,
            direction_y: u8::read(reader)? as i8,
        })
    }
}

impl FixedSize for WinWitness {
    const SIZE: usize = 4 * u8::SIZE;
}
