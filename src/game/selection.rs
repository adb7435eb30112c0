//! Selection state for click-to-move interaction
//!
//! ```text
//! Idle ──(own piece clicked)──▶ Selected(square, destinations)
//!   ▲                                 │
//!   └──(any second click: move attempt, same square, invalid target)
//! ```
//!
//! At most one square is selected. The highlight set (source plus legal
//! destinations) is non-empty only while a square is selected.

use shakmaty::Square;

/// Currently selected square, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Selected {
        square: Square,
        destinations: Vec<Square>,
    },
}

impl Selection {
    pub fn select(&mut self, square: Square, destinations: Vec<Square>) {
        *self = Selection::Selected {
            square,
            destinations,
        };
    }

    pub fn clear(&mut self) {
        *self = Selection::Idle;
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected { .. })
    }

    pub fn selected_square(&self) -> Option<Square> {
        match self {
            Selection::Selected { square, .. } => Some(*square),
            Selection::Idle => None,
        }
    }

    /// Squares to highlight: the selected square followed by its destinations
    pub fn highlighted(&self) -> Vec<Square> {
        match self {
            Selection::Idle => Vec::new(),
            Selection::Selected {
                square,
                destinations,
            } => std::iter::once(*square)
                .chain(destinations.iter().copied())
                .collect(),
        }
    }

    pub fn is_destination(&self, target: Square) -> bool {
        match self {
            Selection::Selected { destinations, .. } => destinations.contains(&target),
            Selection::Idle => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_default_is_idle() {
        let selection = Selection::default();
        assert!(!selection.is_selected());
        assert!(selection.highlighted().is_empty());
    }

    #[test]
    fn test_select_highlights_source_and_destinations() {
        let mut selection = Selection::default();
        selection.select(Square::E2, vec![Square::E3, Square::E4]);

        assert_eq!(selection.selected_square(), Some(Square::E2));
        assert_eq!(
            selection.highlighted(),
            vec![Square::E2, Square::E3, Square::E4]
        );
        assert!(selection.is_destination(Square::E4));
        assert!(!selection.is_destination(Square::E5));
    }

    #[test]
    fn test_clear_returns_to_idle() {
        let mut selection = Selection::default();
        selection.select(Square::G1, vec![Square::F3]);
        selection.clear();

        assert_eq!(selection, Selection::Idle);
        assert!(selection.highlighted().is_empty());
    }
}
