//! Board projection and SVG output
//!
//! [`BoardView`] is a pure projection of the rules engine plus the transient
//! visual state (orientation, size, selection, last move). It holds no state of
//! its own and is rebuilt on every render, so rendering twice in a row gives
//! the same view.

use crate::game::engine::ChessEngine;
use crate::game::selection::Selection;
use crate::game::status::GameStatus;
use crate::game::types::{BoardCoord, Orientation};
use crate::rendering::svg::{Attr, SvgDocument};
use crate::rendering::theme::{BoardTheme, Rgb, UiColors};
use shakmaty::{Color, Piece, Role, Square};

/// Unicode glyph for a piece
pub fn piece_glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

/// One cell of the rendered grid
#[derive(Debug, Clone, PartialEq)]
pub struct SquareView {
    pub square: Square,
    pub coord: BoardCoord,
    pub light: bool,
    pub piece: Option<Piece>,
    pub selected: bool,
    /// Legal destination of the selected piece
    pub destination: bool,
    /// From or to square of the last move
    pub last_move: bool,
    /// King of the side to move while in check
    pub in_check: bool,
}

impl SquareView {
    /// Fill color under a theme, accents taking precedence over the base color
    pub fn fill(&self, theme: BoardTheme) -> Rgb {
        let (light, dark) = theme.colors();
        let base = if self.light { light } else { dark };
        if self.selected {
            UiColors::SELECTED
        } else if self.in_check {
            base.lerp(UiColors::DANGER, 0.6)
        } else if self.last_move {
            base.lerp(UiColors::LAST_MOVE, 0.4)
        } else {
            base
        }
    }
}

/// Complete visual state of the board for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub size: u32,
    pub orientation: Orientation,
    pub theme: BoardTheme,
    pub turn: Color,
    pub status: GameStatus,
    /// Row-major, row 0 at the top
    pub squares: Vec<SquareView>,
}

impl BoardView {
    pub fn project(
        engine: &ChessEngine,
        orientation: Orientation,
        size: u32,
        theme: BoardTheme,
        selection: &Selection,
        last_move: Option<(Square, Square)>,
    ) -> Self {
        let status = engine.status();
        let turn = engine.turn();
        let checked_side = match status {
            GameStatus::Check { side } => Some(side),
            GameStatus::Checkmate { winner } => Some(!winner),
            _ => None,
        };

        let mut squares = Vec::with_capacity(64);
        for row in 0..8u8 {
            for col in 0..8u8 {
                let coord = BoardCoord { row, col };
                let square = coord.to_square(orientation);
                let piece = engine.piece_at(square);
                let file = square.file().to_u32();
                let rank = square.rank().to_u32();

                squares.push(SquareView {
                    square,
                    coord,
                    light: (file + rank) % 2 == 1,
                    piece,
                    selected: selection.selected_square() == Some(square),
                    destination: selection.is_destination(square),
                    last_move: last_move.is_some_and(|(from, to)| square == from || square == to),
                    in_check: piece.is_some_and(|p| {
                        p.role == Role::King && Some(p.color) == checked_side
                    }),
                });
            }
        }

        Self {
            size,
            orientation,
            theme,
            turn,
            status,
            squares,
        }
    }

    pub fn square_size(&self) -> f32 {
        self.size as f32 / 8.0
    }

    pub fn square(&self, square: Square) -> Option<&SquareView> {
        self.squares.iter().find(|s| s.square == square)
    }

    pub fn at(&self, coord: BoardCoord) -> Option<&SquareView> {
        self.squares
            .get(usize::from(coord.row) * 8 + usize::from(coord.col))
    }

    /// Selected square and legal destinations
    pub fn highlighted(&self) -> Vec<Square> {
        self.squares
            .iter()
            .filter(|s| s.selected || s.destination)
            .map(|s| s.square)
            .collect()
    }

    /// Text diagram, rank 8 on top unless flipped
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in 0..8u8 {
            for col in 0..8u8 {
                let glyph = self
                    .at(BoardCoord { row, col })
                    .and_then(|s| s.piece)
                    .map(piece_glyph)
                    .unwrap_or('·');
                out.push(glyph);
                out.push(' ');
            }
            let rank_label = self
                .at(BoardCoord { row, col: 0 })
                .map(|s| s.square.rank().char())
                .unwrap_or(' ');
            out.push(rank_label);
            out.push('\n');
        }
        for col in 0..8u8 {
            if let Some(s) = self.at(BoardCoord { row: 7, col }) {
                out.push(s.square.file().char());
                out.push(' ');
            }
        }
        out.trim_end().to_string()
    }

    pub fn to_svg(&self) -> String {
        let cell = self.square_size();
        let mut doc = SvgDocument::new(self.size as f32, self.size as f32);

        doc.begin_group(&[("class", "squares".into())]);
        for s in &self.squares {
            let x = f32::from(s.coord.col) * cell;
            let y = f32::from(s.coord.row) * cell;
            doc.element(
                "rect",
                &[
                    ("x", x.into()),
                    ("y", y.into()),
                    ("width", cell.into()),
                    ("height", cell.into()),
                    ("fill", s.fill(self.theme).hex().into()),
                    ("data-square", s.square.to_string().into()),
                ],
            );
            if s.destination {
                doc.element(
                    "circle",
                    &[
                        ("cx", Attr::Num(x + cell / 2.0)),
                        ("cy", Attr::Num(y + cell / 2.0)),
                        ("r", Attr::Num(cell / 6.0)),
                        ("fill", UiColors::HINT.hex().into()),
                        ("fill-opacity", Attr::Num(0.6)),
                    ],
                );
            }
        }
        doc.end_group();

        doc.begin_group(&[
            ("class", "coordinates".into()),
            ("font-family", "sans-serif".into()),
            ("font-size", Attr::Num(cell * 0.2)),
        ]);
        for s in &self.squares {
            let x = f32::from(s.coord.col) * cell;
            let y = f32::from(s.coord.row) * cell;
            let label = self.theme.label_color(s.light).hex();
            if s.coord.col == 0 {
                doc.text_element(
                    "text",
                    &[
                        ("x", Attr::Num(x + 2.0)),
                        ("y", Attr::Num(y + cell * 0.22)),
                        ("fill", label.clone().into()),
                    ],
                    &s.square.rank().char().to_string(),
                );
            }
            if s.coord.row == 7 {
                doc.text_element(
                    "text",
                    &[
                        ("x", Attr::Num(x + cell - cell * 0.18)),
                        ("y", Attr::Num(y + cell - 3.0)),
                        ("fill", label.into()),
                    ],
                    &s.square.file().char().to_string(),
                );
            }
        }
        doc.end_group();

        doc.begin_group(&[
            ("class", "pieces".into()),
            ("font-size", Attr::Num(cell * 0.75)),
            ("text-anchor", "middle".into()),
            ("dominant-baseline", "central".into()),
        ]);
        for s in &self.squares {
            let Some(piece) = s.piece else { continue };
            let fill = match piece.color {
                Color::White => UiColors::PIECE_WHITE,
                Color::Black => UiColors::PIECE_BLACK,
            };
            doc.text_element(
                "text",
                &[
                    ("x", Attr::Num(f32::from(s.coord.col) * cell + cell / 2.0)),
                    ("y", Attr::Num(f32::from(s.coord.row) * cell + cell / 2.0)),
                    ("fill", fill.hex().into()),
                    ("stroke", UiColors::PIECE_BLACK.hex().into()),
                    ("stroke-width", Attr::Num(0.5)),
                ],
                &piece_glyph(piece).to_string(),
            );
        }
        doc.end_group();

        doc.finish()
    }
}
