use serde::{Deserialize, Serialize};

use super::board::{Board, IntegrityError, Mark};

/// 全部 8 条获胜线：3 行、3 列、2 条对角线，按此顺序扫描。
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 棋局结果，由棋盘实时推导，从不单独存储。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Outcome {
    Ongoing,
    Won { winner: Mark },
    Draw,
}

impl Outcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Won { winner } => Some(*winner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MoveError {
    GameFinished { outcome: Outcome },
    IndexOutOfRange { index: usize },
    CellOccupied { index: usize, occupant: Mark },
    NotPlayerTurn { expected: Mark, actual: Mark },
    NotAiTurn,
    IntegrityViolation { error: IntegrityError },
}

/// 一次落子后的结算结果，直接序列化给前端。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub index: usize,
    pub mark: Mark,
    pub board: Board,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<[usize; 3]>,
}

impl MoveResolution {
    pub fn new(index: usize, mark: Mark, board: Board) -> Self {
        Self {
            index,
            mark,
            board,
            outcome: evaluate(&board),
            winning_line: winning_line(&board),
        }
    }
}

fn line_owner(board: &Board, line: [usize; 3]) -> Option<Mark> {
    let cells = board.cells();
    let [a, b, c] = line;
    match cells[a] {
        Some(mark) if cells[b] == Some(mark) && cells[c] == Some(mark) => Some(mark),
        _ => None,
    }
}

/// 返回第一条被占满的获胜线。
pub fn winning_line(board: &Board) -> Option<[usize; 3]> {
    WIN_LINES
        .into_iter()
        .find(|line| line_owner(board, *line).is_some())
}

/// 判定棋局：胜、平或进行中。纯函数，无副作用。
pub fn evaluate(board: &Board) -> Outcome {
    let mut winner = None;
    for line in WIN_LINES {
        if let Some(mark) = line_owner(board, line) {
            match winner {
                None => winner = Some(mark),
                Some(first) => debug_assert_eq!(
                    first, mark,
                    "both marks own a winning line, board is unreachable:\n{board}"
                ),
            }
        }
    }

    match winner {
        Some(winner) => Outcome::Won { winner },
        None if board.is_full() => Outcome::Draw,
        None => Outcome::Ongoing,
    }
}
