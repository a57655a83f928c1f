//! Click capture surface.
//!
//! A square canvas of side `size` split into a 5x5 grid. A click is mapped to
//! the cell it falls in and to its distance from each edge in percent.

use ratatui::layout::Rect;

use crate::models::{Answer, Percentages};

/// Side length of the canvas in canvas units.
pub const DEFAULT_SIZE: f64 = 300.0;

/// Cells per row and per column.
pub const GRID_CELLS: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct GridCanvas {
    size: f64,
    marker: Option<(f64, f64)>,
}

impl GridCanvas {
    pub fn new(size: f64) -> Self {
        Self { size, marker: None }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Position of the last click, in canvas coordinates with y growing down.
    pub fn marker(&self) -> Option<(f64, f64)> {
        self.marker
    }

    /// Record a click and map it to an answer.
    pub fn click(&mut self, x: f64, y: f64) -> Answer {
        let x = x.clamp(0.0, self.size);
        let y = y.clamp(0.0, self.size);
        self.marker = Some((x, y));
        map_click(x, y, self.size)
    }

    /// Clear the marker, leaving only the base cross.
    pub fn reset(&mut self) {
        self.marker = None;
    }

    /// The two diagonals drawn on an empty canvas, as `(x1, y1, x2, y2)`.
    pub fn diagonals(&self) -> [(f64, f64, f64, f64); 2] {
        [
            (0.0, 0.0, self.size, self.size),
            (self.size, 0.0, 0.0, self.size),
        ]
    }

    /// Convert a terminal cell inside `area` to canvas coordinates.
    ///
    /// The centre of the cell is used. Returns `None` when the cell lies
    /// outside the rendered canvas.
    pub fn project(&self, area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }

        let x = (f64::from(column - area.x) + 0.5) * self.size / f64::from(area.width);
        let y = (f64::from(row - area.y) + 0.5) * self.size / f64::from(area.height);
        Some((x, y))
    }
}

impl Default for GridCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

/// Map a point on a canvas of side `size` to a quadrant and edge percentages.
pub fn map_click(x: f64, y: f64, size: f64) -> Answer {
    let cell = size / f64::from(GRID_CELLS);
    let last = f64::from(GRID_CELLS - 1);

    let col = (x / cell).floor().clamp(0.0, last) as u8;
    let row = (y / cell).floor().clamp(0.0, last) as u8;

    Answer {
        quadrant_number: row * GRID_CELLS + col + 1,
        percentages: Percentages {
            top: percent(1.0 - y / size),
            bottom: percent(y / size),
            left: percent(1.0 - x / size),
            right: percent(x / size),
        },
    }
}

fn percent(ratio: f64) -> u8 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
