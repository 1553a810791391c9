//! 走法生成
//!
//! 这里只产生伪合法走法（不考虑走后己方是否被将军），
//! 合法性过滤由 [`crate::Game`] 完成。

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::{KINGSIDE_ROOK_COL, KING_START_COL, PROMOTION_KINDS, QUEENSIDE_ROOK_COL};
use crate::error::BoardError;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// 横竖四个方向 (行增量, 列增量)
const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 斜线四个方向
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 马的八个跳法
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
    /// 升变类型，仅兵走到对方底线时存在
    #[serde(default)]
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建带升变的走法
    pub fn with_promotion(from: Square, to: Square, kind: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_fen_char(Color::Black))?;
        }
        Ok(())
    }
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定格子上棋子的所有伪合法走法（格子为空时返回空）
    pub fn pseudo_legal_moves(board: &Board, at: Square) -> Vec<Move> {
        let mut moves = Vec::with_capacity(32);

        if let Some(piece) = board.piece_at(at) {
            Self::generate_piece_moves(board, at, piece, &mut moves);
        }

        moves
    }

    /// 生成指定阵营的所有伪合法走法
    pub fn pseudo_legal_for(board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);

        for (pos, piece) in board.pieces(color) {
            Self::generate_piece_moves(board, pos, piece, &mut moves);
        }

        moves
    }

    /// 生成指定棋子的所有伪合法走法
    fn generate_piece_moves(board: &Board, pos: Square, piece: Piece, moves: &mut Vec<Move>) {
        match piece.kind {
            PieceKind::King => {
                Self::generate_step_moves(board, pos, piece.color, &ORTHOGONAL, moves);
                Self::generate_step_moves(board, pos, piece.color, &DIAGONAL, moves);
                Self::generate_castling_moves(board, pos, piece.color, moves);
            }
            PieceKind::Queen => {
                Self::generate_slide_moves(board, pos, piece.color, &ORTHOGONAL, moves);
                Self::generate_slide_moves(board, pos, piece.color, &DIAGONAL, moves);
            }
            PieceKind::Rook => Self::generate_slide_moves(board, pos, piece.color, &ORTHOGONAL, moves),
            PieceKind::Bishop => Self::generate_slide_moves(board, pos, piece.color, &DIAGONAL, moves),
            PieceKind::Knight => Self::generate_step_moves(board, pos, piece.color, &KNIGHT_JUMPS, moves),
            PieceKind::Pawn => Self::generate_pawn_moves(board, pos, piece.color, moves),
        }
    }

    /// 单步走法（王、马）：目标为空或敌方棋子即可
    fn generate_step_moves(
        board: &Board,
        pos: Square,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in offsets {
            if let Some(to) = pos.offset(dr, dc) {
                Self::try_add_move(board, pos, to, color, moves);
            }
        }
    }

    /// 滑动走法（后、车、象）
    fn generate_slide_moves(
        board: &Board,
        pos: Square,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(dr, dc) in directions {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.piece_at(to) {
                    // 遇到棋子
                    if target.color != color {
                        moves.push(Move::new(pos, to));
                    }
                    break;
                }
                moves.push(Move::new(pos, to));
                current = to;
            }
        }
    }

    /// 生成兵的走法（含双步、吃子、吃过路兵、升变）
    fn generate_pawn_moves(board: &Board, pos: Square, color: Color, moves: &mut Vec<Move>) {
        let forward = color.forward();

        // 前进
        if let Some(one) = pos.offset(forward, 0) {
            if board.piece_at(one).is_none() {
                Self::add_pawn_move(pos, one, color, moves);

                // 初始行可以走两步
                if pos.row == color.pawn_rank() {
                    if let Some(two) = one.offset(forward, 0) {
                        if board.piece_at(two).is_none() {
                            moves.push(Move::new(pos, two));
                        }
                    }
                }
            }
        }

        // 斜前方吃子
        for dc in [-1i8, 1i8] {
            if let Some(to) = pos.offset(forward, dc) {
                if matches!(board.piece_at(to), Some(target) if target.color != color) {
                    Self::add_pawn_move(pos, to, color, moves);
                }
            }
        }

        if let Some(to) = Self::en_passant_target(board, pos, color) {
            moves.push(Move::new(pos, to));
        }
    }

    /// 兵走到升变行时按每种升变类型各生成一个走法
    fn add_pawn_move(from: Square, to: Square, color: Color, moves: &mut Vec<Move>) {
        if to.row == color.promotion_rank() {
            for kind in PROMOTION_KINDS {
                moves.push(Move::with_promotion(from, to, kind));
            }
        } else {
            moves.push(Move::new(from, to));
        }
    }

    /// 吃过路兵的目标格
    ///
    /// 仅当上一步是对方兵从初始行走两步、落在本兵左右相邻格时存在。
    fn en_passant_target(board: &Board, pos: Square, color: Color) -> Option<Square> {
        let last = board.last_move()?;
        let moved = board.piece_at(last.to)?;

        let double_step = last.from.col == last.to.col
            && (last.to.row as i8 - last.from.row as i8).abs() == 2;
        let adjacent = last.to.row == pos.row && (last.to.col as i8 - pos.col as i8).abs() == 1;

        if moved.kind != PieceKind::Pawn || moved.color == color || !double_step || !adjacent {
            return None;
        }

        last.to.offset(color.forward(), 0)
    }

    /// 生成易位候选走法
    ///
    /// 这里只检查王车从未离开初始格、中间格子为空；
    /// 王是否被将军、是否经过被攻击的格子由合法性过滤负责。
    fn generate_castling_moves(board: &Board, pos: Square, color: Color, moves: &mut Vec<Move>) {
        let home = Square::new_unchecked(color.back_rank(), KING_START_COL);
        if pos != home || board.has_moved(home) {
            return;
        }

        let rook = Piece::new(PieceKind::Rook, color);
        for rook_col in [KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL] {
            let rook_pos = Square::new_unchecked(home.row, rook_col);
            if board.piece_at(rook_pos) != Some(rook) || board.has_moved(rook_pos) {
                continue;
            }

            let (low, high) = if rook_col > home.col {
                (home.col + 1, rook_col - 1)
            } else {
                (rook_col + 1, home.col - 1)
            };
            let path_clear = (low..=high)
                .all(|col| board.piece_at(Square::new_unchecked(home.row, col)).is_none());

            if path_clear {
                let step = if rook_col > home.col { 2 } else { -2 };
                if let Some(to) = home.offset(0, step) {
                    moves.push(Move::new(home, to));
                }
            }
        }
    }

    /// 尝试添加走法（检查目标格是否可以移动）
    fn try_add_move(board: &Board, from: Square, to: Square, color: Color, moves: &mut Vec<Move>) {
        match board.piece_at(to) {
            Some(target) if target.color == color => {}
            _ => moves.push(Move::new(from, to)),
        }
    }

    /// 指定格子上棋子威胁的格子
    ///
    /// 即对方棋子站在那里时可以被吃掉的格子。滑动线包含第一个挡路的棋子
    /// （无论颜色），兵只威胁斜前方，王不包含易位格。
    pub fn threatened_squares(board: &Board, at: Square) -> Vec<Square> {
        let Some(piece) = board.piece_at(at) else {
            return Vec::new();
        };

        let mut squares = Vec::with_capacity(16);
        match piece.kind {
            PieceKind::King => {
                Self::collect_steps(at, &ORTHOGONAL, &mut squares);
                Self::collect_steps(at, &DIAGONAL, &mut squares);
            }
            PieceKind::Queen => {
                Self::collect_rays(board, at, &ORTHOGONAL, &mut squares);
                Self::collect_rays(board, at, &DIAGONAL, &mut squares);
            }
            PieceKind::Rook => Self::collect_rays(board, at, &ORTHOGONAL, &mut squares),
            PieceKind::Bishop => Self::collect_rays(board, at, &DIAGONAL, &mut squares),
            PieceKind::Knight => Self::collect_steps(at, &KNIGHT_JUMPS, &mut squares),
            PieceKind::Pawn => {
                let forward = piece.color.forward();
                Self::collect_steps(at, &[(forward, -1), (forward, 1)], &mut squares);
            }
        }
        squares
    }

    fn collect_steps(at: Square, offsets: &[(i8, i8)], squares: &mut Vec<Square>) {
        squares.extend(offsets.iter().filter_map(|&(dr, dc)| at.offset(dr, dc)));
    }

    fn collect_rays(board: &Board, at: Square, directions: &[(i8, i8)], squares: &mut Vec<Square>) {
        for &(dr, dc) in directions {
            let mut current = at;
            while let Some(next) = current.offset(dr, dc) {
                squares.push(next);
                if board.piece_at(next).is_some() {
                    break;
                }
                current = next;
            }
        }
    }

    /// 指定阵营所有棋子威胁的格子的并集
    pub fn attacked_squares(board: &Board, by: Color) -> HashSet<Square> {
        board
            .pieces(by)
            .into_iter()
            .flat_map(|(pos, _)| Self::threatened_squares(board, pos))
            .collect()
    }

    /// 格子是否被指定阵营威胁
    pub fn is_attacked(board: &Board, square: Square, by: Color) -> bool {
        board
            .pieces(by)
            .into_iter()
            .any(|(pos, _)| Self::threatened_squares(board, pos).contains(&square))
    }

    /// 检查指定阵营是否被将军
    ///
    /// 棋盘上该阵营的王不是恰好一个时返回 [`BoardError`]。
    pub fn is_in_check(board: &Board, color: Color) -> Result<bool, BoardError> {
        let king = board.king_square(color)?;
        Ok(Self::is_attacked(board, king, color.opponent()))
    }
}
