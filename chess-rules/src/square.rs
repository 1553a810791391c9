//! 棋盘坐标
//!
//! 行列均从 1 开始计数：列 1-8 对应 `a`-`h`，行 1-8 对应 `1`-`8`，
//! 数据模型中不做行翻转。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::error::NotationError;

/// 棋盘格子
///
/// 序列化为代数记号字符串（如 `"e4"`）。外部只能通过 [`Square::new`]、
/// [`Square::from_index`] 或解析记号得到格子，因此总在棋盘内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    /// 行 (1-8)
    pub(crate) row: u8,
    /// 列 (1-8)
    pub(crate) col: u8,
}

impl Square {
    /// 创建新格子
    pub fn new(row: u8, col: u8) -> Option<Self> {
        let square = Self { row, col };
        square.is_valid().then_some(square)
    }

    /// 创建新格子（不检查边界，内部使用）
    pub(crate) const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 行 (1-8)
    pub fn row(&self) -> u8 {
        self.row
    }

    /// 列 (1-8)
    pub fn col(&self) -> u8 {
        self.col
    }

    /// 检查格子是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (1..=BOARD_SIZE).contains(&self.row) && (1..=BOARD_SIZE).contains(&self.col)
    }

    /// 获取偏移后的格子
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Square> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row < 1 || col < 1 {
            return None;
        }
        Square::new(row as u8, col as u8)
    }

    /// 转换为数组索引（a1 = 0, h8 = 63）
    pub fn to_index(&self) -> usize {
        (self.row as usize - 1) * BOARD_SIZE as usize + (self.col as usize - 1)
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        let size = BOARD_SIZE as usize;
        if index < size * size {
            Some(Self {
                row: (index / size) as u8 + 1,
                col: (index % size) as u8 + 1,
            })
        } else {
            None
        }
    }

    /// 按 a1, b1, ..., h8 的顺序遍历所有格子
    pub fn all() -> impl Iterator<Item = Square> {
        (1..=BOARD_SIZE)
            .flat_map(|row| (1..=BOARD_SIZE).map(move |col| Square::new_unchecked(row, col)))
    }

    /// 列字母 `a`-`h`
    pub fn file_char(&self) -> char {
        (b'a' + self.col - 1) as char
    }

    /// 行数字 `1`-`8`
    pub fn rank_char(&self) -> char {
        (b'0' + self.row) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NotationError::InvalidSquare { text: s.to_string() };

        let mut chars = s.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file.to_ascii_lowercase(), rank),
            _ => return Err(invalid()),
        };

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(invalid());
        }

        Ok(Square::new_unchecked(
            rank as u8 - b'0',
            file as u8 - b'a' + 1,
        ))
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

impl TryFrom<String> for Square {
    type Error = NotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
