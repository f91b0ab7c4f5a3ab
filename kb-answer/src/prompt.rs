//! Prompt builders for the two answering paths.

/// System instruction for the grounded path: the model may only rephrase the
/// matched entry.
pub const KB_SYSTEM: &str = "You are Mini, a friendly, professional assistant. \
Answer using ONLY the provided knowledge base entry. Be concise, clear, and helpful. \
Do not invent facts.";

/// System instruction for the fallback path.
pub const FALLBACK_SYSTEM: &str = "You are Mini, a concise professional and friendly assistant";

/// Answer returned when no generation provider is configured.
pub const DEFAULT_ANSWER: &str = "I'm not sure about that yet, but I can look it up!";

/// User prompt carrying the matched entry and the original question.
pub fn build_kb_prompt(entry_question: &str, entry_answer: &str, question: &str) -> String {
    format!(
        "Knowledge entry:\nQ: {entry_question}\nA: {entry_answer}\n\n\
         User question: {question}\n\n\
         Write a human-friendly answer grounded in the knowledge entry."
    )
}

pub fn build_fallback_prompt(question: &str) -> String {
    format!("Answer the question clearly. Question: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_prompt_carries_entry_and_question() {
        let p = build_kb_prompt("What are your hours?", "We are open 9-5 Mon-Fri.", "when open?");
        assert!(p.starts_with("Knowledge entry:\nQ: What are your hours?\nA: We are open 9-5 Mon-Fri."));
        assert!(p.contains("User question: when open?"));
    }

    #[test]
    fn kb_system_forbids_invention() {
        assert!(KB_SYSTEM.contains("ONLY"));
        assert!(KB_SYSTEM.contains("Do not invent facts."));
    }
}
