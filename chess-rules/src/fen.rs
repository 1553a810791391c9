//! FEN 格式解析和生成
//!
//! 只处理前两段：
//! `<棋盘> <走子方>`
//!
//! 易位权和吃过路兵资格由棋盘的走法记录推导，解析时忽略其余字段，
//! 生成时也不输出。
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w`

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::error::ChessError;
use crate::game::Game;
use crate::piece::{Color, Piece};
use crate::square::Square;

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为对局（走法记录为空）
    pub fn parse(fen: &str) -> Result<Game, ChessError> {
        let mut parts = fen.split_whitespace();
        let Some(placement) = parts.next() else {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        };

        let board = Self::parse_board(placement)?;

        // 解析走子方（默认白方）
        let side = match parts.next() {
            None => Color::White,
            Some(field) => {
                let mut chars = field.chars();
                match (chars.next().and_then(Color::from_fen_char), chars.next()) {
                    (Some(color), None) => color,
                    _ => {
                        return Err(ChessError::InvalidFen {
                            reason: format!("Invalid side to move: {}", field),
                        })
                    }
                }
            }
        };

        Ok(Game::with_board(board, side))
    }

    /// 解析棋盘部分
    pub fn parse_board(board_str: &str) -> Result<Board, ChessError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_SIZE as usize {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected {} rows, got {}", BOARD_SIZE, rows.len()),
            });
        }

        // FEN 从上到下是第 8 行到第 1 行
        for (row_idx, row_str) in rows.iter().enumerate() {
            let row = BOARD_SIZE - row_idx as u8;
            let mut col = 1u8;

            for c in row_str.chars() {
                if col > BOARD_SIZE {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row),
                    });
                }

                if let Some(empty_count) = c.to_digit(10) {
                    // 空格数量
                    if empty_count == 0 {
                        return Err(ChessError::InvalidFen {
                            reason: format!("Zero empty count in row {}", row),
                        });
                    }
                    col += empty_count as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.place(Square::new_unchecked(row, col), piece);
                    col += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if col != BOARD_SIZE + 1 {
                return Err(ChessError::InvalidFen {
                    reason: format!(
                        "Row {} has {} columns, expected {}",
                        row,
                        col - 1,
                        BOARD_SIZE
                    ),
                });
            }
        }

        Ok(board)
    }

    /// 将对局转换为 FEN 字符串
    pub fn to_string(game: &Game) -> String {
        format!(
            "{} {}",
            Self::board_to_string(game.board()),
            game.side_to_move().to_fen_char()
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_SIZE as usize);

        // 从第 8 行到第 1 行
        for row in (1..=BOARD_SIZE).rev() {
            let mut line = String::new();
            let mut empty_count = 0;

            for col in 1..=BOARD_SIZE {
                if let Some(piece) = board.piece_at(Square::new_unchecked(row, col)) {
                    if empty_count > 0 {
                        line.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    line.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                line.push_str(&empty_count.to_string());
            }

            rows.push(line);
        }

        rows.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_initial_fen() {
        let game = Fen::parse(INITIAL_FEN).unwrap();

        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.board(), &Board::initial());

        // 检查白王
        let king = game.board().piece_at(sq("e1"));
        assert_eq!(king, Some(Piece::new(PieceKind::King, Color::White)));

        // 检查黑后
        let queen = game.board().piece_at(sq("d8"));
        assert_eq!(queen, Some(Piece::new(PieceKind::Queen, Color::Black)));
    }

    #[test]
    fn test_fen_roundtrip() {
        let game = Game::new();
        let fen = Fen::to_string(&game);
        assert_eq!(fen, INITIAL_FEN);

        let game2 = Fen::parse(&fen).unwrap();
        assert_eq!(game.board(), game2.board());
        assert_eq!(game.side_to_move(), game2.side_to_move());
    }

    #[test]
    fn test_parse_custom_fen() {
        // 忽略易位权等额外字段
        let fen = "7k/6pp/8/8/8/8/8/4K2R b KQkq - 0 1";
        let game = Fen::parse(fen).unwrap();

        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.board().king_square(Color::White), Ok(sq("e1")));
        assert_eq!(game.board().king_square(Color::Black), Ok(sq("h8")));
        assert_eq!(game.board().all_pieces().len(), 5);
        assert!(game.board().history().is_empty());
    }

    #[test]
    fn test_side_defaults_to_white() {
        let game = Fen::parse("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(game.side_to_move(), Color::White);
    }

    #[test]
    fn test_board_to_string() {
        let board = Fen::parse_board("8/8/8/3pP3/8/8/8/8").unwrap();
        assert_eq!(Fen::board_to_string(&board), "8/8/8/3pP3/8/8/8/8");
    }

    #[test]
    fn test_invalid_fen() {
        // 空字符串
        assert!(Fen::parse("").is_err());

        // 行数不对
        assert!(Fen::parse("8/8/8").is_err());

        // 列数不对
        assert!(Fen::parse("9/8/8/8/8/8/8/4K3 w").is_err());
        assert!(Fen::parse("7/8/8/8/8/8/8/4K3 w").is_err());

        // 无效字符
        assert!(Fen::parse("4x3/8/8/8/8/8/8/4K3 w").is_err());

        // 无效走子方
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 x").is_err());
    }
}
