//! 对局状态机
//!
//! [`Game`] 持有棋盘、走子方和结束标志，负责把伪合法走法过滤为合法走法，
//! 提交走法，并判断将军、将死和逼和。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::InvalidMove;
use crate::moves::{Move, MoveGenerator};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// 游戏结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// 白方胜
    WhiteWins(WinReason),
    /// 黑方胜
    BlackWins(WinReason),
    /// 和棋
    Draw(DrawReason),
}

impl GameResult {
    /// 指定阵营获胜
    pub fn win_for(color: Color, reason: WinReason) -> Self {
        match color {
            Color::White => GameResult::WhiteWins(reason),
            Color::Black => GameResult::BlackWins(reason),
        }
    }
}

/// 胜利原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// 将死
    Checkmate,
    /// 对方认输
    Resign,
}

/// 和棋原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// 无子可动（逼和）
    Stalemate,
}

/// 对局
///
/// 查询方法都只读，模拟走法在棋盘副本上进行；只有 [`Game::make_move`]、
/// [`Game::resign`] 和 [`Game::set_over`] 会修改状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    is_over: bool,
    /// 认输的一方
    #[serde(default)]
    resigned: Option<Color>,
}

impl Game {
    /// 标准开局，白方先走
    pub fn new() -> Self {
        Self::with_board(Board::initial(), Color::White)
    }

    /// 从指定局面创建对局
    pub fn with_board(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            is_over: false,
            resigned: None,
        }
    }

    /// 当前棋盘
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 当前走子方
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 游戏是否已结束
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// 标记游戏结束（由调用方在判定将死、逼和后设置）
    pub fn set_over(&mut self) {
        self.is_over = true;
    }

    /// 认输
    pub fn resign(&mut self, color: Color) -> Result<(), InvalidMove> {
        if self.is_over {
            return Err(InvalidMove::GameOver);
        }

        tracing::debug!(side = %color, "认输");
        self.resigned = Some(color);
        self.is_over = true;
        Ok(())
    }

    /// 指定格子上棋子的所有合法走法（格子为空时返回空）
    pub fn legal_moves(&self, square: Square) -> Vec<Move> {
        let mut scratch = self.board.clone();
        let mut moves = Vec::new();
        Self::collect_legal_moves(&mut scratch, square, &mut moves);
        moves
    }

    /// 指定阵营所有棋子的合法走法
    pub fn all_legal_moves(&self, color: Color) -> Vec<Move> {
        let mut scratch = self.board.clone();
        let mut moves = Vec::new();
        for (square, _) in self.board.pieces(color) {
            Self::collect_legal_moves(&mut scratch, square, &mut moves);
        }
        moves
    }

    /// 指定阵营是否还有合法走法（找到一个即返回）
    fn has_legal_move(&self, color: Color) -> bool {
        let mut scratch = self.board.clone();
        self.board.pieces(color).into_iter().any(|(square, piece)| {
            MoveGenerator::pseudo_legal_moves(&self.board, square)
                .iter()
                .any(|mv| Self::is_safe(&mut scratch, mv, piece))
        })
    }

    fn collect_legal_moves(scratch: &mut Board, square: Square, moves: &mut Vec<Move>) {
        let Some(piece) = scratch.piece_at(square) else {
            return;
        };

        for mv in MoveGenerator::pseudo_legal_moves(scratch, square) {
            if Self::is_safe(scratch, &mv, piece) {
                moves.push(mv);
            }
        }
    }

    /// 模拟走法，检查走后己方王是否安全
    ///
    /// 调用前后 `scratch` 内容一致。
    fn is_safe(scratch: &mut Board, mv: &Move, piece: Piece) -> bool {
        let color = piece.color;
        let dc = mv.to.col as i8 - mv.from.col as i8;

        if piece.kind == PieceKind::King && dc.abs() == 2 {
            // 易位：不能在被将军时进行，王经过的格子也不能被攻击
            if Self::king_in_check(scratch, color) {
                return false;
            }
            let Some(passing) = mv.from.offset(0, dc.signum()) else {
                return false;
            };
            let undo = scratch.apply_move(&Move::new(mv.from, passing));
            let attacked = Self::king_in_check(scratch, color);
            scratch.undo(undo);
            if attacked {
                return false;
            }
        }

        let undo = scratch.apply_move(mv);
        let in_check = Self::king_in_check(scratch, color);
        scratch.undo(undo);
        !in_check
    }

    /// 提交走法
    ///
    /// 失败时棋盘和走子方都不变。
    pub fn make_move(&mut self, mv: Move) -> Result<(), InvalidMove> {
        if let Err(err) = self.check_move(&mv) {
            tracing::trace!(%mv, %err, "走法被拒绝");
            return Err(err);
        }

        let undo = self.board.apply_move(&mv);
        self.board.log_move(mv);
        tracing::debug!(
            side = %self.side_to_move,
            %mv,
            kind = ?undo.kind,
            captured = ?undo.captured,
            "走法已提交"
        );

        self.side_to_move = self.side_to_move.opponent();
        Ok(())
    }

    fn check_move(&self, mv: &Move) -> Result<(), InvalidMove> {
        if self.is_over {
            return Err(InvalidMove::GameOver);
        }

        let piece = self
            .board
            .piece_at(mv.from)
            .ok_or(InvalidMove::NoPieceAtSource { square: mv.from })?;

        if piece.color != self.side_to_move {
            return Err(InvalidMove::WrongSideToMove {
                expected: self.side_to_move,
                found: piece.color,
            });
        }

        if !self.legal_moves(mv.from).contains(mv) {
            return Err(InvalidMove::NotALegalMove { mv: *mv });
        }

        Ok(())
    }

    /// 指定阵营是否被将军
    ///
    /// # Panics
    ///
    /// 棋盘上该阵营的王不是恰好一个时 panic（调用方的编程错误）。
    pub fn is_in_check(&self, color: Color) -> bool {
        Self::king_in_check(&self.board, color)
    }

    /// 指定阵营是否被将死：被将军且没有任何合法走法
    ///
    /// # Panics
    ///
    /// 同 [`Game::is_in_check`]。
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// 指定阵营是否被逼和：未被将军且没有任何合法走法
    ///
    /// # Panics
    ///
    /// 同 [`Game::is_in_check`]。
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// 当前结果，对局仍可继续时返回 `None`
    ///
    /// 认输优先；否则按走子方是否被将死或逼和判断。
    pub fn outcome(&self) -> Option<GameResult> {
        if let Some(loser) = self.resigned {
            return Some(GameResult::win_for(loser.opponent(), WinReason::Resign));
        }

        let side = self.side_to_move;
        if self.is_in_checkmate(side) {
            Some(GameResult::win_for(side.opponent(), WinReason::Checkmate))
        } else if self.is_in_stalemate(side) {
            Some(GameResult::Draw(DrawReason::Stalemate))
        } else {
            None
        }
    }

    fn king_in_check(board: &Board, color: Color) -> bool {
        match MoveGenerator::is_in_check(board, color) {
            Ok(in_check) => in_check,
            Err(err) => panic!("{}", err),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn game_from(placement: &str, side: Color) -> Game {
        Game::with_board(Fen::parse_board(placement).unwrap(), side)
    }

    fn sorted(mut moves: Vec<Move>) -> Vec<Move> {
        moves.sort();
        moves
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();

        assert_eq!(game.side_to_move(), Color::White);
        assert!(!game.is_over());
        assert_eq!(game.board(), &Board::initial());
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn test_initial_pawn_moves() {
        let game = Game::new();

        assert_eq!(
            sorted(game.legal_moves(sq("e2"))),
            vec![mv("e2", "e3"), mv("e2", "e4")]
        );
        assert!(game.legal_moves(sq("e4")).is_empty());
        assert_eq!(game.all_legal_moves(Color::White).len(), 20);
    }

    #[test]
    fn test_pawn_capture_available() {
        let mut game = Game::new();
        game.make_move(mv("e2", "e4")).unwrap();
        game.make_move(mv("d7", "d5")).unwrap();

        let moves = game.legal_moves(sq("e4"));
        assert!(moves.contains(&mv("e4", "d5")));
        assert!(moves.contains(&mv("e4", "e5")));
    }

    #[test]
    fn test_kingside_castling() {
        let mut game = game_from("4k3/8/8/8/8/8/8/4K2R", Color::White);

        assert!(game.legal_moves(sq("e1")).contains(&mv("e1", "g1")));
        game.make_move(mv("e1", "g1")).unwrap();

        let board = game.board();
        assert_eq!(
            board.piece_at(sq("g1")),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("f1")),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert_eq!(board.piece_at(sq("h1")), None);
        assert_eq!(board.piece_at(sq("e1")), None);
    }

    #[test]
    fn test_queenside_castling() {
        let mut game = game_from("r3k3/8/8/8/8/8/8/4K3", Color::Black);

        game.make_move(mv("e8", "c8")).unwrap();
        assert_eq!(
            game.board().piece_at(sq("d8")),
            Some(Piece::new(PieceKind::Rook, Color::Black))
        );
        assert_eq!(game.board().piece_at(sq("a8")), None);
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let game = game_from("4k3/8/8/4r3/8/8/8/R3K2R", Color::White);
        let moves = game.legal_moves(sq("e1"));

        assert!(!moves.contains(&mv("e1", "g1")));
        assert!(!moves.contains(&mv("e1", "c1")));
    }

    #[test]
    fn test_no_castling_through_attacked_square() {
        // f1 被黑车控制
        let game = game_from("4kr2/8/8/8/8/8/8/4K2R", Color::White);
        assert!(!game.legal_moves(sq("e1")).contains(&mv("e1", "g1")));
    }

    #[test]
    fn test_no_castling_into_check() {
        let game = game_from("4k1r1/8/8/8/8/8/8/4K2R", Color::White);
        assert!(!game.legal_moves(sq("e1")).contains(&mv("e1", "g1")));
    }

    #[test]
    fn test_queenside_castling_with_attacked_b_file() {
        // 只有车经过 b1，王不经过，仍可易位
        let game = game_from("1r2k3/8/8/8/8/8/8/R3K3", Color::White);
        assert!(game.legal_moves(sq("e1")).contains(&mv("e1", "c1")));
    }

    #[test]
    fn test_castling_lost_after_king_moves() {
        let mut game = game_from("4k3/8/8/8/8/8/8/4K2R", Color::White);
        game.make_move(mv("e1", "f2")).unwrap();
        game.make_move(mv("e8", "d8")).unwrap();
        game.make_move(mv("f2", "e1")).unwrap();
        game.make_move(mv("d8", "e8")).unwrap();

        assert!(!game.legal_moves(sq("e1")).contains(&mv("e1", "g1")));
    }

    #[test]
    fn test_en_passant_capture() {
        let mut game = Game::new();
        game.make_move(mv("e2", "e4")).unwrap();
        game.make_move(mv("a7", "a6")).unwrap();
        game.make_move(mv("e4", "e5")).unwrap();
        game.make_move(mv("d7", "d5")).unwrap();

        assert!(game.legal_moves(sq("e5")).contains(&mv("e5", "d6")));
        game.make_move(mv("e5", "d6")).unwrap();

        assert_eq!(game.board().piece_at(sq("d5")), None);
        assert_eq!(
            game.board().piece_at(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
        assert_eq!(game.board().pieces(Color::Black).len(), 15);
    }

    #[test]
    fn test_en_passant_expires() {
        let mut game = Game::new();
        game.make_move(mv("e2", "e4")).unwrap();
        game.make_move(mv("a7", "a6")).unwrap();
        game.make_move(mv("e4", "e5")).unwrap();
        game.make_move(mv("d7", "d5")).unwrap();
        game.make_move(mv("h2", "h3")).unwrap();
        game.make_move(mv("h7", "h6")).unwrap();

        assert!(!game.legal_moves(sq("e5")).contains(&mv("e5", "d6")));
    }

    #[test]
    fn test_en_passant_exposing_king_rejected() {
        // 吃过路兵同时移走 d5、e5 两个兵，a5 的王会暴露给 h5 的车
        let mut game = game_from("4k3/4p3/8/K2P3r/8/8/8/8", Color::Black);
        game.make_move(mv("e7", "e5")).unwrap();

        let moves = game.legal_moves(sq("d5"));
        assert_eq!(moves, vec![mv("d5", "d6")]);
        assert_eq!(
            game.make_move(mv("d5", "e6")),
            Err(InvalidMove::NotALegalMove { mv: mv("d5", "e6") })
        );
    }

    #[test]
    fn test_promotion_requires_kind() {
        let mut game = game_from("4k3/P7/8/8/8/8/8/4K3", Color::White);

        assert_eq!(game.legal_moves(sq("a7")).len(), 4);
        assert_eq!(
            game.make_move(mv("a7", "a8")),
            Err(InvalidMove::NotALegalMove { mv: mv("a7", "a8") })
        );

        game.make_move(Move::with_promotion(sq("a7"), sq("a8"), PieceKind::Knight))
            .unwrap();
        assert_eq!(
            game.board().piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // e2 的马被 e8 的车牵制
        let game = game_from("4r1k1/8/8/8/8/8/4N3/4K3", Color::White);

        assert!(game.legal_moves(sq("e2")).is_empty());
    }

    #[test]
    fn test_king_cannot_walk_into_check() {
        let game = game_from("4k3/8/8/8/8/8/r7/4K3", Color::White);
        let moves = game.legal_moves(sq("e1"));

        assert_eq!(sorted(moves), vec![mv("e1", "d1"), mv("e1", "f1")]);
    }

    #[test]
    fn test_king_cannot_retreat_along_check_ray() {
        // 王身后的格子不在威胁集合里，但走过去仍被将军
        let game = game_from("R5k1/8/8/8/8/8/8/4K3", Color::Black);
        let moves = game.legal_moves(sq("g8"));

        assert!(!moves.contains(&mv("g8", "h8")));
        assert!(!moves.contains(&mv("g8", "f8")));
        assert!(moves.contains(&mv("g8", "g7")));
    }

    #[test]
    fn test_back_rank_mate() {
        let mut game = game_from("7k/6pp/8/8/8/8/8/3QK3", Color::White);
        game.make_move(mv("d1", "d8")).unwrap();

        assert!(game.is_in_check(Color::Black));
        assert!(game.is_in_checkmate(Color::Black));
        assert!(!game.is_in_stalemate(Color::Black));
        for (square, _) in game.board().pieces(Color::Black) {
            assert!(game.legal_moves(square).is_empty());
        }
        assert_eq!(
            game.outcome(),
            Some(GameResult::WhiteWins(WinReason::Checkmate))
        );
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            game.make_move(mv(from, to)).unwrap();
        }

        assert!(game.is_in_checkmate(Color::White));
        assert_eq!(
            game.outcome(),
            Some(GameResult::BlackWins(WinReason::Checkmate))
        );
        // 将死不会自动结束对局
        assert!(!game.is_over());
    }

    #[test]
    fn test_stalemate() {
        let game = game_from("7k/8/6Q1/8/8/8/8/K7", Color::Black);

        assert!(!game.is_in_check(Color::Black));
        assert!(game.is_in_stalemate(Color::Black));
        assert!(!game.is_in_checkmate(Color::Black));
        assert!(game.all_legal_moves(Color::Black).is_empty());
        assert_eq!(game.outcome(), Some(GameResult::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn test_checkmate_considers_interposition_on_sliding_check() {
        // 王无路可走，但 e7 的象可以挡在 d8 或 f8
        let game = game_from("R5k1/4bppp/8/8/8/8/8/4K3", Color::Black);

        assert!(game.is_in_check(Color::Black));
        assert!(game.legal_moves(sq("g8")).is_empty());
        assert!(!game.is_in_checkmate(Color::Black));
        assert_eq!(
            sorted(game.all_legal_moves(Color::Black)),
            vec![mv("e7", "d8"), mv("e7", "f8")]
        );
    }

    #[test]
    fn test_stalemate_with_only_pinned_pieces() {
        // a7 的马被 a1 的车牵制，王的去路都被白王控制
        let game = game_from("k7/n1K5/8/8/8/8/8/R7", Color::Black);

        assert!(!game.is_in_check(Color::Black));
        assert!(game.legal_moves(sq("a7")).is_empty());
        assert!(game.is_in_stalemate(Color::Black));
    }

    #[test]
    fn test_not_stalemate_with_mobile_piece() {
        let game = game_from("k7/8/2K5/8/8/8/7p/8", Color::Black);

        assert!(!game.is_in_stalemate(Color::Black));
    }

    #[test]
    fn test_turn_alternates() {
        let mut game = Game::new();
        game.make_move(mv("g1", "f3")).unwrap();
        assert_eq!(game.side_to_move(), Color::Black);
        game.make_move(mv("g8", "f6")).unwrap();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.board().history().len(), 2);
    }

    #[test]
    fn test_make_move_errors() {
        let mut game = Game::new();
        let before = game.clone();

        assert_eq!(
            game.make_move(mv("e4", "e5")),
            Err(InvalidMove::NoPieceAtSource { square: sq("e4") })
        );
        assert_eq!(
            game.make_move(mv("e7", "e5")),
            Err(InvalidMove::WrongSideToMove {
                expected: Color::White,
                found: Color::Black,
            })
        );
        assert_eq!(
            game.make_move(mv("e2", "e5")),
            Err(InvalidMove::NotALegalMove { mv: mv("e2", "e5") })
        );
        assert_eq!(
            game.make_move(mv("e1", "e2")),
            Err(InvalidMove::NotALegalMove { mv: mv("e1", "e2") })
        );

        // 失败不改变任何状态
        assert_eq!(game, before);
    }

    #[test]
    fn test_move_leaving_king_in_check_rejected() {
        let mut game = game_from("4r1k1/8/8/8/8/8/4N3/4K3", Color::White);
        let before = game.clone();

        assert_eq!(
            game.make_move(mv("e2", "c3")),
            Err(InvalidMove::NotALegalMove { mv: mv("e2", "c3") })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let mut game = Game::new();
        game.make_move(mv("e2", "e4")).unwrap();
        let before = game.clone();

        let first = game.all_legal_moves(Color::Black);
        let second = game.all_legal_moves(Color::Black);
        assert_eq!(first, second);
        assert_eq!(game.is_in_check(Color::White), game.is_in_check(Color::White));
        assert!(!game.is_in_checkmate(Color::Black));
        assert!(!game.is_in_stalemate(Color::Black));
        assert_eq!(game, before);
    }

    #[test]
    fn test_game_over_rejects_moves() {
        let mut game = Game::new();
        game.set_over();

        assert!(game.is_over());
        assert_eq!(game.make_move(mv("e2", "e4")), Err(InvalidMove::GameOver));
        assert_eq!(game.board(), &Board::initial());
    }

    #[test]
    fn test_resign() {
        let mut game = Game::new();
        game.resign(Color::Black).unwrap();

        assert!(game.is_over());
        assert_eq!(game.outcome(), Some(GameResult::WhiteWins(WinReason::Resign)));
        assert_eq!(game.resign(Color::White), Err(InvalidMove::GameOver));
        assert_eq!(game.make_move(mv("e2", "e4")), Err(InvalidMove::GameOver));
    }

    #[test]
    #[should_panic(expected = "No black king")]
    fn test_check_without_king_panics() {
        let game = game_from("8/8/8/8/8/8/8/4K3", Color::White);
        game.is_in_check(Color::Black);
    }

    #[test]
    fn test_game_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Game>();
    }
}
