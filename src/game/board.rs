use serde::{Deserialize, Serialize};
use std::fmt;

use super::rules::MoveError;

/// 棋盘格子数量（3×3，按行优先编号 0..=8）。
pub const CELL_COUNT: usize = 9;
/// 棋盘边长。
pub const BOARD_SIDE: usize = 3;

/// 玩家棋子。`X` 为人类玩家，`O` 为 AI。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 单个格子，`None` 表示空位。
pub type Cell = Option<Mark>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BoardError {
    InvalidLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    MarkImbalance { x_count: usize, o_count: usize },
    TurnOrder {
        first_player: Mark,
        x_count: usize,
        o_count: usize,
    },
}

/// 3×3 棋盘。
///
/// 棋盘是 `Copy` 的小值类型，搜索时按值传递，调用方持有的棋盘不会被修改。
/// 序列化为长度为 9 的数组，元素为 `null`、`"X"` 或 `"O"`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    /// 所有空位的下标，按升序排列。
    pub fn available_moves(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(mark)).count()
    }

    /// 返回在 `index` 落子后的新棋盘，原棋盘保持不变。
    ///
    /// 调用方需保证 `index < CELL_COUNT`，格子是否为空不做检查。
    pub fn with_mark(mut self, index: usize, mark: Mark) -> Self {
        debug_assert!(index < CELL_COUNT, "cell index {index} out of range");
        self.cells[index] = Some(mark);
        self
    }

    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), MoveError> {
        match self.cells.get(index) {
            None => Err(MoveError::IndexOutOfRange { index }),
            Some(Some(occupant)) => Err(MoveError::CellOccupied {
                index,
                occupant: *occupant,
            }),
            Some(None) => {
                self.cells[index] = Some(mark);
                Ok(())
            }
        }
    }

    /// 根据先手方和双方棋子数推导下一个落子方。
    pub fn next_to_move(&self, first: Mark) -> Mark {
        if self.count(first) > self.count(first.opponent()) {
            first.opponent()
        } else {
            first
        }
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let x_count = self.count(Mark::X);
        let o_count = self.count(Mark::O);
        if x_count.abs_diff(o_count) > 1 {
            return Err(IntegrityError::MarkImbalance { x_count, o_count });
        }
        Ok(())
    }

    /// 先手方的棋子数只能与对手相等或多一枚。
    pub fn turn_order_check(&self, first: Mark) -> Result<(), IntegrityError> {
        let lead = self.count(first) as isize - self.count(first.opponent()) as isize;
        if !(0..=1).contains(&lead) {
            return Err(IntegrityError::TurnOrder {
                first_player: first,
                x_count: self.count(Mark::X),
                o_count: self.count(Mark::O),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Cell>> for Board {
    type Error = BoardError;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        let actual = cells.len();
        let cells: [Cell; CELL_COUNT] = cells.try_into().map_err(|_| BoardError::InvalidLength {
            expected: CELL_COUNT,
            actual,
        })?;
        Ok(Self { cells })
    }
}

impl From<Board> for Vec<Cell> {
    fn from(board: Board) -> Self {
        board.cells.to_vec()
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidLength { expected, actual } => {
                write!(f, "board must have {expected} cells, got {actual}")
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(BOARD_SIDE).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in cells {
                write!(f, "{}", cell.map_or('.', Mark::symbol))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_moves_are_ascending_empty_cells() {
        let board = Board::new().with_mark(4, Mark::X).with_mark(0, Mark::O);
        assert_eq!(board.available_moves(), vec![1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn with_mark_leaves_original_untouched() {
        let board = Board::new();
        let next = board.with_mark(3, Mark::X);
        assert!(board.is_blank());
        assert_eq!(next.get(3), Some(Some(Mark::X)));
    }

    #[test]
    fn place_rejects_occupied_and_out_of_range() {
        let mut board = Board::new();
        board.place(2, Mark::X).expect("empty cell should accept a mark");
        assert_eq!(
            board.place(2, Mark::O),
            Err(MoveError::CellOccupied {
                index: 2,
                occupant: Mark::X
            })
        );
        assert_eq!(
            board.place(9, Mark::O),
            Err(MoveError::IndexOutOfRange { index: 9 })
        );
    }

    #[test]
    fn next_to_move_follows_parity() {
        let board = Board::new();
        assert_eq!(board.next_to_move(Mark::X), Mark::X);
        assert_eq!(board.next_to_move(Mark::O), Mark::O);

        let board = board.with_mark(0, Mark::O);
        assert_eq!(board.next_to_move(Mark::O), Mark::X);

        let board = board.with_mark(1, Mark::X);
        assert_eq!(board.next_to_move(Mark::O), Mark::O);
    }

    #[test]
    fn board_json_matches_front_end_shape() {
        let board = Board::new().with_mark(0, Mark::X).with_mark(8, Mark::O);
        let json = serde_json::to_string(&board).expect("board should serialize");
        assert_eq!(json, r#"["X",null,null,null,null,null,null,null,"O"]"#);

        let parsed: Board = serde_json::from_str(&json).expect("board should parse");
        assert_eq!(parsed, board);
    }

    #[test]
    fn malformed_boards_are_rejected() {
        let short = serde_json::from_str::<Board>(r#"["X",null,"O"]"#);
        assert!(short.is_err(), "short board must not parse");

        let bad_value = serde_json::from_str::<Board>(
            r#"["Z",null,null,null,null,null,null,null,null]"#,
        );
        assert!(bad_value.is_err(), "unknown mark must not parse");

        assert_eq!(
            Board::try_from(vec![None; 10]),
            Err(BoardError::InvalidLength {
                expected: 9,
                actual: 10
            })
        );
    }

    #[test]
    fn integrity_check_flags_imbalance() {
        let board = Board::new().with_mark(0, Mark::X).with_mark(1, Mark::X);
        assert_eq!(
            board.integrity_check(),
            Err(IntegrityError::MarkImbalance {
                x_count: 2,
                o_count: 0
            })
        );
        assert!(board.with_mark(4, Mark::O).integrity_check().is_ok());
    }

    #[test]
    fn turn_order_check_respects_first_player() {
        let board = Board::new().with_mark(0, Mark::O);
        assert!(board.turn_order_check(Mark::O).is_ok());
        assert_eq!(
            board.turn_order_check(Mark::X),
            Err(IntegrityError::TurnOrder {
                first_player: Mark::X,
                x_count: 0,
                o_count: 1
            })
        );
        assert!(board.with_mark(1, Mark::X).turn_order_check(Mark::X).is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn with_mark_rejects_index_past_board() {
        let _ = Board::new().with_mark(CELL_COUNT, Mark::X);
    }

    #[test]
    fn display_renders_rows() {
        let board = Board::new().with_mark(0, Mark::X).with_mark(4, Mark::O);
        assert_eq!(board.to_string(), "X..\n.O.\n...");
    }
}
