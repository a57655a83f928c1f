//! Similarity between two users' answers.

use thiserror::Error;

use crate::models::{Answer, QuizResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("cannot compare empty response sets")]
    Empty,

    #[error("response sets differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// Score two answer sequences from 0 (opposite) to 100 (identical).
///
/// Both sequences must cover the same questions in the same order.
pub fn compatibility(a: &[Answer], b: &[Answer]) -> Result<u8, ScoreError> {
    if a.len() != b.len() {
        return Err(ScoreError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(ScoreError::Empty);
    }

    let total: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| x.percentages.mean_difference(&y.percentages))
        .sum();
    let mean = total / a.len() as f64;

    Ok((100.0 - mean.round()).clamp(0.0, 100.0) as u8)
}

/// A peer and how closely their answers match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch {
    pub user_name: String,
    pub compatibility: u8,
}

/// Score every peer against `me`, best match first.
///
/// Peers whose answers cannot be compared (different question count) are
/// left out.
pub fn rank_by_compatibility(me: &QuizResponse, others: &[QuizResponse]) -> Vec<RankedMatch> {
    let mut ranked: Vec<RankedMatch> = others
        .iter()
        .filter_map(|other| {
            let compatibility = compatibility(&me.responses, &other.responses).ok()?;
            Some(RankedMatch {
                user_name: other.user_name.clone(),
                compatibility,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.compatibility
            .cmp(&a.compatibility)
            .then_with(|| a.user_name.cmp(&b.user_name))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Percentages;

    fn answer(top: u8, left: u8) -> Answer {
        Answer {
            quadrant_number: 1,
            percentages: Percentages {
                top,
                bottom: 100 - top,
                left,
                right: 100 - left,
            },
        }
    }

    fn raw(value: u8) -> Answer {
        Answer {
            quadrant_number: 1,
            percentages: Percentages {
                top: value,
                bottom: value,
                left: value,
                right: value,
            },
        }
    }

    fn response(user: &str, responses: Vec<Answer>) -> QuizResponse {
        QuizResponse {
            user_name: user.to_string(),
            group_code: "g".to_string(),
            responses,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_identical_is_hundred() {
        let a = vec![answer(30, 70), answer(90, 10)];
        assert_eq!(compatibility(&a, &a), Ok(100));
    }

    #[test]
    fn test_opposite_is_zero() {
        let a = vec![raw(0), raw(0)];
        let b = vec![raw(100), raw(100)];
        assert_eq!(compatibility(&a, &b), Ok(0));
    }

    #[test]
    fn test_symmetric() {
        let a = vec![answer(30, 70), answer(55, 12)];
        let b = vec![answer(80, 20), answer(40, 40)];
        assert_eq!(compatibility(&a, &b), compatibility(&b, &a));
    }

    #[test]
    fn test_partial_difference() {
        // Each edge is off by 20 on the first question, 0 on the second.
        let a = vec![answer(40, 40), answer(50, 50)];
        let b = vec![answer(60, 60), answer(50, 50)];
        assert_eq!(compatibility(&a, &b), Ok(90));
    }

    #[test]
    fn test_length_policy() {
        let a = vec![answer(10, 10)];
        assert_eq!(
            compatibility(&a, &[]),
            Err(ScoreError::LengthMismatch { left: 1, right: 0 })
        );
        assert_eq!(compatibility(&[], &[]), Err(ScoreError::Empty));
    }

    #[test]
    fn test_rank_best_first() {
        let me = response("alice", vec![answer(50, 50)]);
        let others = vec![
            response("far", vec![answer(0, 0)]),
            response("near", vec![answer(45, 55)]),
            response("short", Vec::new()),
        ];

        let ranked = rank_by_compatibility(&me, &others);
        assert_eq!(
            ranked,
            vec![
                RankedMatch {
                    user_name: "near".to_string(),
                    compatibility: 95,
                },
                RankedMatch {
                    user_name: "far".to_string(),
                    compatibility: 50,
                },
            ]
        );
    }
}
