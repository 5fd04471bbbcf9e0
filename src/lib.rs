pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    best_move, random_move, select_move, AiAgent, AiConfig, AiDecision, Difficulty, MovePlan,
    AI_MARK, HUMAN_MARK,
};
pub use game::{
    evaluate, winning_line, Board, BoardError, Cell, IntegrityError, Mark, MoveError,
    MoveResolution, Outcome, Session, WIN_LINES,
};

use utils::{log, set_panic_hook, warn};

/// AI 落子前的默认等待时间，与前端动画节奏保持一致。
pub const DEFAULT_AI_DELAY_MS: u32 = 600;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: MoveError) -> JsValue {
    warn(&format!("move rejected: {error:?}"));
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_difficulty(difficulty: Option<&str>) -> Difficulty {
    difficulty
        .and_then(|value| Difficulty::from_str(value).ok())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<MoveResolution>,
}

#[wasm_bindgen]
pub struct GameEngine {
    session: Session,
    agent: AiAgent,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: Option<String>) -> GameEngine {
        let session = Session::new(parse_difficulty(difficulty.as_deref()));
        let agent = AiAgent::new(session.ai_config());
        GameEngine { session, agent }
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let session: Session = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.agent.set_config(session.ai_config());
        self.session = session;
        Ok(())
    }

    pub fn outcome_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.outcome()).map_err(serde_to_js_error)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.session.is_ai_turn()
    }

    pub fn set_difficulty(&mut self, difficulty: &str) {
        let difficulty = parse_difficulty(Some(difficulty));
        self.session.set_difficulty(difficulty);
        self.agent.set_config(self.session.ai_config());
    }

    pub fn play(&mut self, index: usize) -> Result<String, JsValue> {
        let resolution = self.session.play(index).map_err(to_js_error)?;
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }

    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let (decision, applied) = self
            .session
            .play_ai(&mut self.agent)
            .map_err(to_js_error)?;
        log(&format!(
            "ai move: cell={:?} plan={:?} nodes={}",
            decision.cell, decision.plan, decision.nodes
        ));

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 延迟后计算 AI 决策（不落子），返回 JSON 字符串的 Promise。
    /// 未轮到 AI 时 Promise 以 `NotAiTurn` 等错误拒绝。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let board = match self.session.ai_board() {
            Ok(board) => board,
            Err(error) => return Promise::reject(&to_js_error(error)),
        };
        let config = self.session.ai_config();
        let delay = delay_ms.unwrap_or(DEFAULT_AI_DELAY_MS);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.decide(&board);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.session.reset();
        log(&format!(
            "round {} started, first player {}",
            self.session.round, self.session.first_player
        ));
        self.state_json()
    }
}

/// 判定棋盘状态，返回 `Outcome` 对象。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&evaluate(&board)).map_err(JsValue::from)
}

/// 为 AI（O）选择落子；棋盘已满或已结束时返回 `undefined`。
#[wasm_bindgen(js_name = "selectMove")]
pub fn select_move_js(board: JsValue, difficulty: Option<String>) -> Result<Option<u32>, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let difficulty = parse_difficulty(difficulty.as_deref());
    Ok(select_move(&board, difficulty).map(|cell| cell as u32))
}

#[wasm_bindgen(js_name = "winningLine")]
pub fn winning_line_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&winning_line(&board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateBoard")]
pub fn validate_board(board: JsValue) -> Result<(), JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    board
        .integrity_check()
        .map_err(|error| to_js_error(MoveError::IntegrityViolation { error }))
}
