use serde::{Deserialize, Serialize};

/// Which path produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerSource {
    #[serde(rename = "kb")]
    KnowledgeBase,
    #[serde(rename = "llm")]
    Fallback,
}

impl AnswerSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerSource::KnowledgeBase => "kb",
            AnswerSource::Fallback => "llm",
        }
    }
}

impl std::fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one `ask`.
///
/// `matched_question` and `score` are set only when `source` is
/// [`AnswerSource::KnowledgeBase`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub answer: String,
    pub source: AnswerSource,
    pub matched_question: Option<String>,
    pub score: Option<f32>,
    pub trace: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_wire_names() {
        assert_eq!(serde_json::to_string(&AnswerSource::KnowledgeBase).unwrap(), "\"kb\"");
        assert_eq!(serde_json::to_string(&AnswerSource::Fallback).unwrap(), "\"llm\"");
        let back: AnswerSource = serde_json::from_str("\"llm\"").unwrap();
        assert_eq!(back, AnswerSource::Fallback);
    }
}
