use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Question;

/// Error loading a question file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must contain at least one question", path.display())]
    Empty { path: PathBuf },
}

/// The question set used when no file is given.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question {
            title: "Put a dot on the graph where you feel like your core self".to_string(),
            top_text: "I am most energized when I'm around people".to_string(),
            left_text: "I am most comfortable observing and listening".to_string(),
            right_text: "I am most comfortable expressing my thoughts".to_string(),
            bottom_text: "I am most refreshed when I have time alone".to_string(),
        },
        Question {
            title: "How do you work best?".to_string(),
            top_text: "Do you prefer structured environments?".to_string(),
            left_text: "Do you focus on details?".to_string(),
            right_text: "Do you see the big picture?".to_string(),
            bottom_text: "Do you like flexible schedules?".to_string(),
        },
    ]
}

pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions: Vec<Question> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if questions.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(questions)
}
