//! Fiducial-board geometry.
//!
//! The calibration target is a planar chessboard with bolts threaded through
//! the centres of some of its black squares; the bolts are the sonar targets.
//! Black squares are numbered in row-major order starting from the top-left
//! corner (which is assumed black), and the sonar targets carry stable
//! human-facing labels (`A1`..`D5`) mapping to square indices.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::math::{Real, Vec2};

/// Errors constructing a board description.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A target label refers to a black-square index the board does not have.
    #[error("label {label} refers to square {square}, but the board has {count} black squares")]
    LabelOutOfRange {
        label: String,
        square: usize,
        count: usize,
    },
}

/// Planar chessboard with labelled sonar-target squares.
#[derive(Debug, Clone)]
pub struct BoardGeometry {
    /// Chessboard columns.
    pub cols: usize,
    /// Chessboard rows.
    pub rows: usize,
    /// Square edge length in metres.
    pub square_len: Real,
    targets: BTreeMap<String, usize>,
}

impl BoardGeometry {
    /// Build a board, checking every target label against the square count.
    pub fn new(
        cols: usize,
        rows: usize,
        square_len: Real,
        targets: BTreeMap<String, usize>,
    ) -> Result<Self, BoardError> {
        let board = Self {
            cols,
            rows,
            square_len,
            targets: BTreeMap::new(),
        };
        let count = board.square_centers().len();
        for (label, &square) in &targets {
            if square >= count {
                return Err(BoardError::LabelOutOfRange {
                    label: label.clone(),
                    square,
                    count,
                });
            }
        }
        Ok(Self { targets, ..board })
    }

    /// The 11×8, 26 mm board used with the 20-bolt sonar-target layout.
    pub fn standard() -> Self {
        let targets: BTreeMap<String, usize> = [
            ("A1", 0),
            ("A2", 1),
            ("A3", 6),
            ("A4", 11),
            ("A5", 12),
            ("B1", 4),
            ("B2", 5),
            ("B3", 10),
            ("B4", 15),
            ("B5", 16),
            ("C1", 28),
            ("C2", 33),
            ("C3", 34),
            ("C4", 39),
            ("C5", 40),
            ("D1", 32),
            ("D2", 37),
            ("D3", 38),
            ("D4", 42),
            ("D5", 43),
        ]
        .into_iter()
        .map(|(label, square)| (label.to_owned(), square))
        .collect();

        Self::new(11, 8, 0.026, targets).expect("standard board layout is valid")
    }

    /// Centres (metres, board frame) of every black square, numbered in
    /// row-major order from the top-left corner.
    pub fn square_centers(&self) -> BTreeMap<usize, Vec2> {
        let mut centers = BTreeMap::new();
        let mut idx = 0;
        for row in 0..self.rows {
            // Top-left square is black, so black columns alternate phase
            // row by row.
            let start = row % 2;
            for col in (start..self.cols).step_by(2) {
                let x = (col as Real + 0.5) * self.square_len;
                let y = (row as Real + 0.5) * self.square_len;
                centers.insert(idx, Vec2::new(x, y));
                idx += 1;
            }
        }
        centers
    }

    /// Board-frame coordinates (metres) of every labelled sonar target.
    pub fn target_coords(&self) -> BTreeMap<String, Vec2> {
        let centers = self.square_centers();
        self.targets
            .iter()
            .map(|(label, square)| (label.clone(), centers[square]))
            .collect()
    }
}
