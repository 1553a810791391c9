//! 规则常量定义

use crate::piece::PieceKind;

/// 棋盘边长（行数与列数相同）
pub const BOARD_SIZE: u8 = 8;

/// 格子总数
pub const SQUARE_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// 兵升变可选的棋子类型（按常用程度排列）
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// 后翼车所在列
pub const QUEENSIDE_ROOK_COL: u8 = 1;

/// 王的初始列
pub const KING_START_COL: u8 = 5;

/// 王翼车所在列
pub const KINGSIDE_ROOK_COL: u8 = 8;

/// 序列化格式版本号
pub const FORMAT_VERSION: u32 = 1;
