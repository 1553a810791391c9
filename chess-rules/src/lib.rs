//! 国际象棋规则引擎
//!
//! 包含:
//! - 格子、棋子、棋盘等核心数据结构
//! - 伪合法走法生成和威胁格计算
//! - 对局状态机（合法性过滤、将军、将死、逼和判断）
//! - 棋盘与对局的 JSON 编解码
//! - FEN 棋盘部分与坐标表示法
//!
//! 引擎本身不安装日志订阅者，日志通过 `tracing` 交给调用方处理。

mod board;
pub mod codec;
mod constants;
mod error;
mod fen;
mod game;
mod moves;
mod notation;
mod piece;
mod square;


pub use board::{Board, MoveKind, Undo};
pub use codec::BoardRecord;
pub use constants::*;
pub use error::{BoardError, ChessError, InvalidMove, NotationError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use game::{DrawReason, Game, GameResult, WinReason};
pub use moves::{Move, MoveGenerator};
pub use notation::Notation;
pub use piece::{Color, Piece, PieceKind};
pub use square::Square;
