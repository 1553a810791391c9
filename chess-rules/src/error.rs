//! 错误类型定义

use thiserror::Error;

use crate::moves::Move;
use crate::piece::Color;
use crate::square::Square;

/// 走棋被拒绝的原因
///
/// 这些都是正常的业务结果，调用方可据此决定提示文案或状态码。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidMove {
    /// 起点没有棋子
    #[error("No piece at {square}")]
    NoPieceAtSource { square: Square },

    /// 起点棋子不属于当前走子方
    #[error("Not {found}'s turn, {expected} to move")]
    WrongSideToMove { expected: Color, found: Color },

    /// 不在合法走法集合中（包括走后被将军、非法易位、错误的升变类型等）
    #[error("Illegal move: {mv}")]
    NotALegalMove { mv: Move },

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,
}

/// 棋盘不变量被破坏
///
/// 表示调用方的编程错误，不应重试。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// 缺少某方的王
    #[error("No {color} king on the board")]
    MissingKing { color: Color },

    /// 某方有多个王
    #[error("{count} {color} kings on the board")]
    MultipleKings { color: Color, count: usize },
}

/// 坐标或走法记号错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// 无效的格子记号
    #[error("Invalid square: {text:?}")]
    InvalidSquare { text: String },

    /// 无效的走法记号
    #[error("Invalid move notation: {text:?}")]
    InvalidMove { text: String },
}

/// 引擎对外入口（编解码、FEN）的错误类型
#[derive(Error, Debug)]
pub enum ChessError {
    /// 走棋错误
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),

    /// 棋盘不变量错误
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// 记号错误
    #[error("Notation error: {0}")]
    Notation(#[from] NotationError),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 格式版本不匹配
    #[error("Format version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u32, actual: u32 },
}

/// 引擎操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
