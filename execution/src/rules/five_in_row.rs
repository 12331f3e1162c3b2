use super::{GameRules, MoveOutcome};
use arena_types::arena::{Board, MatchConfig, MatchError, Seat, WinWitness, EMPTY_CELL};

/// Scan order for win detection.
const DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Five-in-a-row on a square board: players alternately mark one empty cell and win by
/// proving `line_length` consecutive marks in a row, column or diagonal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiveInRow {
    board_size: u8,
    line_length: u8,
}

impl FiveInRow {
    pub fn new(board_size: u8, line_length: u8) -> Self {
        Self {
            board_size,
            line_length,
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.board_size, config.line_length)
    }

    pub fn line_length(&self) -> u8 {
        self.line_length
    }

    fn line_holds(&self, board: &Board, witness: &WinWitness, mark: u8) -> bool {
        line_holds(board, witness, self.line_length, mark)
    }
}

impl Default for FiveInRow {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default())
    }
}

fn line_holds(board: &Board, witness: &WinWitness, line_length: u8, mark: u8) -> bool {
    // An empty line proves nothing.
    line_length > 0
        && (0..line_length as i64).all(|k| {
            let x = witness.x as i64 + witness.direction_x as i64 * k;
            let y = witness.y as i64 + witness.direction_y as i64 * k;
            board.get(x, y) == Some(mark)
        })
}

/// First run of `line_length` cells holding `mark`, scanning directions in order, then
/// rows, then columns. Returns `None` when no such run exists.
pub fn detect_win(board: &Board, mark: u8, line_length: u8) -> Option<WinWitness> {
    if line_length == 0 {
        return None;
    }
    for (direction_x, direction_y) in DIRECTIONS {
        for x in 0..board.size() {
            for y in 0..board.size() {
                let witness = WinWitness {
                    x,
                    y,
                    direction_x,
                    direction_y,
                };
                if line_holds(board, &witness, line_length, mark) {
                    return Some(witness);
                }
            }
        }
    }
    None
}

impl GameRules for FiveInRow {
    type State = Board;
    type Claim = WinWitness;

    fn init_session(&self) -> Board {
        Board::empty(self.board_size)
    }

    fn apply_move(
        &self,
        current: &Board,
        proposed: Board,
        claim: &WinWitness,
        seat: Seat,
    ) -> Result<MoveOutcome<Board>, MatchError> {
        claim.assert_correct()?;
        if proposed.size() != current.size() {
            return Err(MatchError::IllegalBoardEdit);
        }

        // At most one cell may change: an empty cell taking the mover's mark.
        let mark = seat.mark();
        let mut changed = 0usize;
        for (before, after) in current.cells().iter().zip(proposed.cells()) {
            if before == after {
                continue;
            }
            changed += 1;
            if changed > 1 || *before != EMPTY_CELL || *after != mark {
                return Err(MatchError::IllegalBoardEdit);
            }
        }

        let won = claim.is_claim();
        if won && !self.line_holds(&proposed, claim, mark) {
            return Err(MatchError::WinNotProved);
        }

        Ok(MoveOutcome {
            state: proposed,
            won,
        })
    }

    fn check_win(&self, state: &Board, seat: Seat) -> Option<WinWitness> {
        detect_win(state, seat.mark(), self.line_length)
    }

    fn matches_config(&self, config: &MatchConfig) -> bool {
        self.board_size == config.board_size && self.line_length == config.line_length
    }
}
