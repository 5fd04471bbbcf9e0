//! AI 算法模块（minimax 搜索与难度控制）。

pub mod minimax;

pub use minimax::{
    best_move, random_move, select_move, AiAgent, AiConfig, AiDecision, Difficulty, MovePlan,
    AI_MARK, HUMAN_MARK, NORMAL_RANDOM_MOVE_CHANCE, WIN_SCORE,
};
