use serde::{Deserialize, Serialize};

use super::board::{Board, Mark};
use super::rules::{evaluate, MoveError, MoveResolution, Outcome};
use crate::ai::{AiAgent, AiConfig, AiDecision, Difficulty, AI_MARK, HUMAN_MARK};

/// 一局对战的状态：棋盘、先手方与难度。
///
/// 轮到谁由棋盘上的棋子数与先手方推导，不单独记录。每次 [`Session::reset`]
/// 都会交换先手。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub board: Board,
    pub first_player: Mark,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub round: u32,
}

impl Session {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            board: Board::new(),
            first_player: HUMAN_MARK,
            difficulty,
            round: 1,
        }
    }

    pub fn outcome(&self) -> Outcome {
        evaluate(&self.board)
    }

    pub fn next_mark(&self) -> Mark {
        self.board.next_to_move(self.first_player)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.next_mark() == AI_MARK && !self.outcome().is_finished()
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig::from_difficulty(self.difficulty)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    fn ensure_playable(&self) -> Result<(), MoveError> {
        let outcome = self.outcome();
        if outcome.is_finished() {
            return Err(MoveError::GameFinished { outcome });
        }
        self.board
            .integrity_check()
            .and_then(|()| self.board.turn_order_check(self.first_player))
            .map_err(|error| MoveError::IntegrityViolation { error })
    }

    /// 轮到 AI 时返回当前棋盘，供 AI 计算落子。
    pub fn ai_board(&self) -> Result<Board, MoveError> {
        self.ensure_playable()?;
        if self.next_mark() != AI_MARK {
            return Err(MoveError::NotAiTurn);
        }
        Ok(self.board)
    }

    /// 人类玩家落子。
    pub fn play(&mut self, index: usize) -> Result<MoveResolution, MoveError> {
        self.ensure_playable()?;
        let actual = self.next_mark();
        if actual != HUMAN_MARK {
            return Err(MoveError::NotPlayerTurn {
                expected: HUMAN_MARK,
                actual,
            });
        }
        self.apply(index, HUMAN_MARK)
    }

    /// 让 AI 走一步，返回 AI 的决策以及实际落子的结算。
    pub fn play_ai(
        &mut self,
        agent: &mut AiAgent,
    ) -> Result<(AiDecision, Option<MoveResolution>), MoveError> {
        let board = self.ai_board()?;
        let decision = agent.decide(&board);
        let applied = match decision.cell {
            Some(index) => Some(self.apply(index, AI_MARK)?),
            None => None,
        };
        Ok((decision, applied))
    }

    fn apply(&mut self, index: usize, mark: Mark) -> Result<MoveResolution, MoveError> {
        self.board.place(index, mark)?;
        Ok(MoveResolution::new(index, mark, self.board))
    }

    /// 开始新一局，先手方交换。
    pub fn reset(&mut self) {
        self.first_player = self.first_player.opponent();
        self.board = Board::new();
        self.round += 1;
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Difficulty::default())
    }
}
