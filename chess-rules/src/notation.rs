//! 坐标表示法
//!
//! 走法写作起点格加终点格，升变时追加小写棋子字母：
//! `e2e4`、`e7e8q`。起点和终点之间允许一个 `-` 或空格。
//!
//! 另外提供给观战方的文字通知，如 `white pawn e2 to e4`。

use crate::board::{Board, MoveKind};
use crate::error::NotationError;
use crate::moves::Move;
use crate::piece::PieceKind;
use crate::square::Square;

/// 坐标表示法
pub struct Notation;

impl Notation {
    /// 解析坐标表示法
    pub fn parse_move(text: &str) -> Result<Move, NotationError> {
        let invalid = || NotationError::InvalidMove {
            text: text.to_string(),
        };

        let compact: String = text
            .trim()
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();
        if !compact.is_ascii() || !(4..=5).contains(&compact.len()) {
            return Err(invalid());
        }

        let from: Square = compact[0..2].parse().map_err(|_| invalid())?;
        let to: Square = compact[2..4].parse().map_err(|_| invalid())?;

        match compact[4..].chars().next() {
            None => Ok(Move::new(from, to)),
            Some(c) => match PieceKind::from_fen_char(c) {
                Some((kind, _)) if kind.is_promotable() => Ok(Move::with_promotion(from, to, kind)),
                _ => Err(invalid()),
            },
        }
    }

    /// 生成走法的文字描述，需在走法提交前调用（起点为空时返回 `None`）
    ///
    /// 在棋盘副本上执行走法，吃过路兵和易位按实际效果描述。
    pub fn describe(board: &Board, mv: &Move) -> Option<String> {
        let piece = board.piece_at(mv.from)?;
        let undo = board.clone().apply_move(mv);

        let mut text = format!("{} {} to {}", piece, mv.from, mv.to);
        match undo.kind {
            MoveKind::Castling => {
                let wing = if mv.to.col > mv.from.col { "kingside" } else { "queenside" };
                text.push_str(&format!(", castling {}", wing));
            }
            MoveKind::EnPassant => {
                if let Some(captured) = undo.captured {
                    text.push_str(&format!(", capturing {} en passant", captured));
                }
            }
            _ => {
                if let Some(captured) = undo.captured {
                    text.push_str(&format!(", capturing {}", captured));
                }
            }
        }
        if let Some(kind) = mv.promotion {
            text.push_str(&format!(", promoting to {}", kind.name()));
        }
        Some(text)
    }
}
