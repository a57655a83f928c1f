use serde::{Deserialize, Serialize};

/// A grid question: a title and one prompt per edge of the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub title: String,
    pub top_text: String,
    pub left_text: String,
    pub right_text: String,
    pub bottom_text: String,
}
