use kb_answer::{AnswerOutcome, AnswerSource};
use serde::{Deserialize, Serialize};

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub source: AnswerSource,
    /// Set only for knowledge-base answers.
    pub matched_question: Option<String>,
    /// Set only for knowledge-base answers.
    pub score: Option<f32>,
    pub trace: Vec<String>,
}

impl From<AnswerOutcome> for AskResponse {
    fn from(o: AnswerOutcome) -> Self {
        Self {
            answer: o.answer,
            source: o.source,
            matched_question: o.matched_question,
            score: o.score,
            trace: o.trace,
        }
    }
}
