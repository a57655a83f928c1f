mod question;
mod response;

pub use question::Question;
pub use response::{Answer, Percentages, QuizResponse};
