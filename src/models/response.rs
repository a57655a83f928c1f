//! Answers and the per-user document written to the response store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Distance of a click from each edge of the canvas, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    pub top: u8,
    pub bottom: u8,
    pub left: u8,
    pub right: u8,
}

impl Percentages {
    /// Mean of the four absolute per-edge differences.
    pub fn mean_difference(&self, other: &Percentages) -> f64 {
        let diffs = [
            self.top.abs_diff(other.top),
            self.bottom.abs_diff(other.bottom),
            self.left.abs_diff(other.left),
            self.right.abs_diff(other.right),
        ];

        diffs.iter().map(|d| f64::from(*d)).sum::<f64>() / 4.0
    }
}

/// One answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Row-major cell number on the 5x5 grid, 1..=25.
    pub quadrant_number: u8,
    pub percentages: Percentages,
}

impl Answer {
    /// Whether the cell lies on the 5x5 grid and every percentage is at
    /// most 100.
    pub fn is_valid(&self) -> bool {
        let p = self.percentages;
        (1..=25).contains(&self.quadrant_number)
            && [p.top, p.bottom, p.left, p.right].iter().all(|v| *v <= 100)
    }
}

/// A completed quiz as stored under `quizResponses/{group}/{user}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub user_name: String,
    pub group_code: String,
    pub responses: Vec<Answer>,
    pub timestamp: DateTime<Utc>,
}
