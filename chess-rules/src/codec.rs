//! 棋盘与对局的 JSON 编解码
//!
//! 棋盘编码为 FEN 棋盘部分加完整走法记录，易位权和吃过路兵资格
//! 因此可以在解码后原样恢复，`deserialize(serialize(b)) == b`。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::FORMAT_VERSION;
use crate::error::{ChessError, Result};
use crate::fen::Fen;
use crate::game::Game;
use crate::moves::Move;

/// 棋盘的持久化形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    /// 格式版本
    pub version: u32,
    /// FEN 棋盘部分
    pub placement: String,
    /// 已提交的走法
    #[serde(default)]
    pub history: Vec<Move>,
}

impl From<Board> for BoardRecord {
    fn from(board: Board) -> Self {
        Self {
            version: FORMAT_VERSION,
            placement: Fen::board_to_string(&board),
            history: board.history().to_vec(),
        }
    }
}

impl TryFrom<BoardRecord> for Board {
    type Error = ChessError;

    fn try_from(record: BoardRecord) -> Result<Self> {
        if record.version != FORMAT_VERSION {
            tracing::warn!(
                expected = FORMAT_VERSION,
                actual = record.version,
                "棋盘格式版本不匹配"
            );
            return Err(ChessError::VersionMismatch {
                expected: FORMAT_VERSION,
                actual: record.version,
            });
        }

        let mut board = Fen::parse_board(&record.placement).inspect_err(|err| {
            tracing::warn!(placement = %record.placement, %err, "棋盘布局无效");
        })?;
        board.validate().inspect_err(|err| {
            tracing::warn!(placement = %record.placement, %err, "棋盘缺少王或王不唯一");
        })?;
        for mv in record.history {
            board.log_move(mv);
        }
        Ok(board)
    }
}

/// 将棋盘编码为 JSON
pub fn serialize(board: &Board) -> Result<String> {
    Ok(serde_json::to_string(board)?)
}

/// 从 JSON 解码棋盘
///
/// 双方必须各有且只有一个王，否则返回 [`ChessError::Board`]。
pub fn deserialize(text: &str) -> Result<Board> {
    let record: BoardRecord = serde_json::from_str(text).inspect_err(|err| {
        tracing::warn!(%err, "棋盘 JSON 无法解析");
    })?;
    Board::try_from(record)
}

/// 将整个对局（棋盘、走子方、结束标志）编码为 JSON
pub fn serialize_game(game: &Game) -> Result<String> {
    Ok(serde_json::to_string(game)?)
}

/// 从 JSON 解码对局
///
/// 内嵌棋盘的版本、布局或王的数量错误以 [`ChessError::Json`] 返回。
pub fn deserialize_game(text: &str) -> Result<Game> {
    Ok(serde_json::from_str::<Game>(text).inspect_err(|err| {
        tracing::warn!(%err, "对局 JSON 无法解析");
    })?)
}
