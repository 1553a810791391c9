//! 棋盘状态与走法记录

use serde::{Deserialize, Serialize};

use crate::codec::BoardRecord;
use crate::constants::{KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL, SQUARE_COUNT};
use crate::error::BoardError;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// 底线棋子排列（a 列到 h 列）
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 棋盘
///
/// 除了 64 个格子外还保存已提交走法的记录，易位权和吃过路兵资格都由
/// 这份记录推导，不另存权利标志。相等性比较覆盖格子和记录。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoardRecord", into = "BoardRecord")]
pub struct Board {
    /// 8x8 棋盘，索引为 (row - 1) * 8 + (col - 1)，使用 Vec 以支持 serde
    squares: Vec<Option<Piece>>,
    /// 已提交的走法，只追加
    history: Vec<Move>,
}

/// 落子的种类（用于日志与通知）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// 普通移动
    Quiet,
    /// 吃子
    Capture,
    /// 易位
    Castling,
    /// 吃过路兵
    EnPassant,
    /// 升变（可能同时吃子）
    Promotion,
}

/// 一次落子改动过的格子及其原内容，交给 [`Board::undo`] 可完全恢复
#[derive(Debug, Clone)]
pub struct Undo {
    saved: Vec<(Square, Option<Piece>)>,
    /// 被吃掉的棋子
    pub captured: Option<Piece>,
    /// 落子种类
    pub kind: MoveKind,
}

impl Undo {
    fn new() -> Self {
        Self {
            saved: Vec::with_capacity(4),
            captured: None,
            kind: MoveKind::Quiet,
        }
    }

    fn save(&mut self, board: &Board, square: Square) {
        self.saved.push((square, board.piece_at(square)));
    }
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; SQUARE_COUNT],
            history: Vec::new(),
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        board.reset_to_standard_setup();
        board
    }

    /// 恢复为标准开局的 32 个棋子，并清空走法记录
    pub fn reset_to_standard_setup(&mut self) {
        self.squares = vec![None; SQUARE_COUNT];
        self.history.clear();

        for color in [Color::White, Color::Black] {
            for (i, kind) in BACK_RANK.iter().enumerate() {
                let col = i as u8 + 1;
                self.place(
                    Square::new_unchecked(color.back_rank(), col),
                    Piece::new(*kind, color),
                );
                self.place(
                    Square::new_unchecked(color.pawn_rank(), col),
                    Piece::new(PieceKind::Pawn, color),
                );
            }
        }
    }

    /// 获取指定格子的棋子
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        if square.is_valid() {
            self.squares[square.to_index()]
        } else {
            None
        }
    }

    /// 设置指定格子的内容
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        if square.is_valid() {
            self.squares[square.to_index()] = piece;
        }
    }

    /// 放置棋子（覆盖原有棋子）
    pub fn place(&mut self, square: Square, piece: Piece) {
        self.set(square, Some(piece));
    }

    /// 清空格子
    pub fn clear(&mut self, square: Square) {
        self.set(square, None);
    }

    /// 追加一条已提交的走法
    pub fn log_move(&mut self, mv: Move) {
        self.history.push(mv);
    }

    /// 最近一次提交的走法
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// 是否有已提交的走法从该格子出发
    pub fn has_moved(&self, square: Square) -> bool {
        self.history.iter().any(|mv| mv.from == square)
    }

    /// 全部走法记录
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// 查找指定阵营的王
    pub fn king_square(&self, color: Color) -> Result<Square, BoardError> {
        let king = Piece::new(PieceKind::King, color);
        let mut found = Square::all().filter(|sq| self.piece_at(*sq) == Some(king));

        match (found.next(), found.next()) {
            (Some(square), None) => Ok(square),
            (None, _) => Err(BoardError::MissingKing { color }),
            (Some(_), Some(_)) => Err(BoardError::MultipleKings {
                color,
                count: 2 + found.count(),
            }),
        }
    }

    /// 检查双方各有且只有一个王
    pub fn validate(&self) -> Result<(), BoardError> {
        self.king_square(Color::White)?;
        self.king_square(Color::Black)?;
        Ok(())
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.piece_at(sq).map(|piece| (sq, piece)))
            .collect()
    }

    /// 执行走法的全部棋盘效果（不检查规则，不写记录）
    ///
    /// 易位时同时移动车，吃过路兵时移除对方兵，带升变类型时替换棋子。
    /// 返回值交给 [`Board::undo`] 可恢复原状。
    pub fn apply_move(&mut self, mv: &Move) -> Undo {
        let mut undo = Undo::new();
        let Some(piece) = self.piece_at(mv.from) else {
            return undo;
        };

        let dc = mv.to.col as i8 - mv.from.col as i8;
        if piece.kind == PieceKind::King && dc.abs() == 2 {
            let (rook_col, rook_to_col) = if dc > 0 {
                (KINGSIDE_ROOK_COL, mv.to.col - 1)
            } else {
                (QUEENSIDE_ROOK_COL, mv.to.col + 1)
            };
            let rook_from = Square::new_unchecked(mv.from.row, rook_col);
            let rook_to = Square::new_unchecked(mv.from.row, rook_to_col);
            let rook = self.piece_at(rook_from);

            undo.save(self, rook_from);
            undo.save(self, rook_to);
            self.set(rook_from, None);
            self.set(rook_to, rook);
            undo.kind = MoveKind::Castling;
        } else if piece.kind == PieceKind::Pawn && dc != 0 && self.piece_at(mv.to).is_none() {
            // 斜走到空格只可能是吃过路兵
            let victim = Square::new_unchecked(mv.from.row, mv.to.col);
            undo.save(self, victim);
            undo.captured = self.piece_at(victim);
            self.set(victim, None);
            undo.kind = MoveKind::EnPassant;
        }

        undo.save(self, mv.from);
        undo.save(self, mv.to);
        if let Some(target) = self.piece_at(mv.to) {
            undo.captured = Some(target);
            undo.kind = MoveKind::Capture;
        }

        let placed = match mv.promotion {
            Some(kind) => {
                undo.kind = MoveKind::Promotion;
                Piece::new(kind, piece.color)
            }
            None => piece,
        };
        self.set(mv.from, None);
        self.set(mv.to, Some(placed));

        undo
    }

    /// 撤销 [`Board::apply_move`] 的效果
    pub fn undo(&mut self, undo: Undo) {
        for (square, piece) in undo.saved.into_iter().rev() {
            self.set(square, piece);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
