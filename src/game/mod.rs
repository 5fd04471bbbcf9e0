//! 井字棋核心逻辑（棋盘、胜负判定、对局状态）。

pub mod board;
pub mod rules;
pub mod session;

pub use board::{Board, BoardError, Cell, IntegrityError, Mark, BOARD_SIDE, CELL_COUNT};
pub use rules::{evaluate, winning_line, MoveError, MoveResolution, Outcome, WIN_LINES};
pub use session::Session;
