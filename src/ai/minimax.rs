use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{evaluate, Board, Mark, Outcome};

/// AI 使用的棋子。
pub const AI_MARK: Mark = Mark::O;
/// 人类玩家使用的棋子。
pub const HUMAN_MARK: Mark = Mark::X;

/// 终局基础分，实际得分为 `WIN_SCORE - depth`，越早获胜分数越高。
pub const WIN_SCORE: i32 = 10;
/// “普通”难度下直接随机落子的概率。
pub const NORMAL_RANDOM_MOVE_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Perfect,
    Normal,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perfect" => Ok(Difficulty::Perfect),
            "normal" => Ok(Difficulty::Normal),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiConfig {
    pub random_move_chance: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Perfect => Self {
                random_move_chance: 0.0,
            },
            Difficulty::Normal => Self {
                random_move_chance: NORMAL_RANDOM_MOVE_CHANCE,
            },
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(Difficulty::default())
    }
}

/// 本次落子走的是哪条路径：随机弱化或完整搜索。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MovePlan {
    Random,
    Search,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<usize>,
    pub plan: MovePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<i32>,
    pub nodes: u64,
}

impl AiDecision {
    fn pass(plan: MovePlan) -> Self {
        Self {
            cell: None,
            plan,
            evaluation: None,
            nodes: 0,
        }
    }
}

#[derive(Debug, Default)]
struct SearchStats {
    nodes: u64,
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn set_config(&mut self, config: AiConfig) {
        self.config = config;
    }

    /// 为 AI 选择下一步。
    ///
    /// 先抽签决定 [`MovePlan`]，再执行对应的独立路径。棋盘已满或已分胜负时
    /// 返回 `cell: None`。
    pub fn decide(&mut self, board: &Board) -> AiDecision {
        let plan = self.draw_plan();
        if evaluate(board).is_finished() {
            return AiDecision::pass(plan);
        }

        match plan {
            MovePlan::Random => self.random_decision(board),
            MovePlan::Search => search_decision(board),
        }
    }

    fn draw_plan(&mut self) -> MovePlan {
        if self.config.random_move_chance > 0.0
            && self.rng.gen::<f64>() < self.config.random_move_chance
        {
            MovePlan::Random
        } else {
            MovePlan::Search
        }
    }

    fn random_decision(&mut self, board: &Board) -> AiDecision {
        match random_move(board, &mut self.rng) {
            Some(cell) => AiDecision {
                cell: Some(cell),
                plan: MovePlan::Random,
                evaluation: None,
                nodes: 1,
            },
            None => AiDecision::pass(MovePlan::Random),
        }
    }
}

impl Default for AiAgent {
    fn default() -> Self {
        AiAgent::new(AiConfig::default())
    }
}

fn search_decision(board: &Board) -> AiDecision {
    let mut stats = SearchStats::default();
    match best_move_with_stats(board, &mut stats) {
        Some((cell, score)) => AiDecision {
            cell: Some(cell),
            plan: MovePlan::Search,
            evaluation: Some(score),
            nodes: stats.nodes,
        },
        None => AiDecision::pass(MovePlan::Search),
    }
}

/// 在所有空位中均匀随机选择一个。
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    board.available_moves().choose(rng).copied()
}

/// 完整 minimax 搜索得到的最佳落子及其分数。
///
/// 按下标升序扫描，分数相同时保留下标最小的格子。
pub fn best_move(board: &Board) -> Option<(usize, i32)> {
    best_move_with_stats(board, &mut SearchStats::default())
}

fn best_move_with_stats(board: &Board, stats: &mut SearchStats) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;
    for cell in board.available_moves() {
        let score = minimax(board.with_mark(cell, AI_MARK), 0, false, stats);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((cell, score));
        }
    }
    best
}

fn minimax(board: Board, depth: i32, maximizing: bool, stats: &mut SearchStats) -> i32 {
    stats.nodes += 1;

    match evaluate(&board) {
        Outcome::Won { winner } if winner == AI_MARK => return WIN_SCORE - depth,
        Outcome::Won { .. } => return depth - WIN_SCORE,
        Outcome::Draw => return 0,
        Outcome::Ongoing => {}
    }

    let mark = if maximizing { AI_MARK } else { HUMAN_MARK };
    let scores = board
        .available_moves()
        .into_iter()
        .map(|cell| minimax(board.with_mark(cell, mark), depth + 1, !maximizing, stats));

    let best = if maximizing { scores.max() } else { scores.min() };
    best.unwrap_or(0)
}

/// 按难度为 AI 选择落子，随机源取自系统熵。
pub fn select_move(board: &Board, difficulty: Difficulty) -> Option<usize> {
    AiAgent::new(AiConfig::from_difficulty(difficulty))
        .decide(board)
        .cell
}
