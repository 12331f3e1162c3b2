/// Ordering-counter units (blocks) grouped into one matchmaking round.
pub const ROUND_SIZE: u64 = 20;

/// Entry fee withheld at registration (minimal token units).
pub const ENTRY_FEE: u64 = 1_000_000_000;

/// Block production interval the move timeout is derived from.
pub const BLOCK_PRODUCTION_SECONDS: u64 = 5;

/// Blocks a player may stall before the opponent can claim the session (60s of blocks).
pub const MOVE_TIMEOUT_UNITS: u64 = 60 / BLOCK_PRODUCTION_SECONDS;

/// Side length of the five-in-a-row board.
pub const BOARD_SIZE: u8 = 15;

/// Consecutive marks needed to win.
pub const CELLS_LINE_TO_WIN: u8 = 5;

/// Largest board the wire format accepts.
pub const MAX_BOARD_SIZE: u8 = 32;

/// Token used for entry fees and prize funds.
pub const ARENA_TOKEN_ID: u64 = 0;

/// Players in a session; the game fund is `entry_fee * PLAYERS_PER_SESSION`.
pub const PLAYERS_PER_SESSION: u64 = 2;

/// Maximum encoded length of a proposed game state carried by a move.
pub const MAX_STATE_LENGTH: usize = 2 + MAX_BOARD_SIZE as usize * MAX_BOARD_SIZE as usize;

/// Maximum encoded length of a win claim carried by a move.
pub const MAX_CLAIM_LENGTH: usize = 64;

/// Error codes carried by `Event::Rejected`.
pub const ERROR_ALREADY_IN_GAME: u8 = 1;
pub const ERROR_ALREADY_QUEUED: u8 = 2;
pub const ERROR_INVALID_SESSION_ID: u8 = 3;
pub const ERROR_NOT_YOUR_MOVE: u8 = 4;
pub const ERROR_GAME_FINISHED: u8 = 5;
pub const ERROR_TIMEOUT_NOT_REACHED: u8 = 6;
pub const ERROR_INVALID_DIRECTION: u8 = 7;
pub const ERROR_ILLEGAL_BOARD_EDIT: u8 = 8;
pub const ERROR_WIN_NOT_PROVED: u8 = 9;
pub const ERROR_NO_WINNER_YET: u8 = 10;
pub const ERROR_ALREADY_SETTLED: u8 = 11;
pub const ERROR_INSUFFICIENT_BALANCE: u8 = 12;
/// Move arguments that do not decode as the game's state/claim encoding.
pub const ERROR_INVALID_PAYLOAD: u8 = 13;
