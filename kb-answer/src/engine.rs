//! The answering engine: embed, look up, compare against the threshold,
//! then either polish the matched entry or fall back to the chat model.

use std::{future::Future, sync::Arc, time::Duration};

use ai_llm_service::capabilities::{GenerationParams, TextEmbedder, TextGenerator};
use kb_index::index::KnowledgeIndex;
use kb_index::structs::knowledge::KbMatch;
use tracing::{debug, info};

use crate::api_types::{AnswerOutcome, AnswerSource};
use crate::cfg::EngineConfig;
use crate::error::AnswerError;
use crate::prompt::{
    DEFAULT_ANSWER, FALLBACK_SYSTEM, KB_SYSTEM, build_fallback_prompt, build_kb_prompt,
};

/// Holds immutable client handles and configuration; cheap to share behind
/// an `Arc`, no internal locking.
pub struct AnswerEngine {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn KnowledgeIndex>,
    generator: Option<Arc<dyn TextGenerator>>,
    cfg: EngineConfig,
}

impl AnswerEngine {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        index: Arc<dyn KnowledgeIndex>,
        generator: Option<Arc<dyn TextGenerator>>,
        cfg: EngineConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
            cfg,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Answer `question` from the knowledge base when a strong enough match
    /// exists, otherwise from the chat model.
    ///
    /// # Errors
    /// Embedding, index and generation failures propagate unchanged (no
    /// retry); each call is bounded by `cfg.call_timeout`.
    pub async fn ask(&self, question: &str) -> Result<AnswerOutcome, AnswerError> {
        let mut trace = vec!["Checking knowledge base...".to_string()];

        let vector = self
            .bounded("embedding", self.embedder.embed(question))
            .await?
            .map_err(AnswerError::Embedding)?;

        let matches = self
            .bounded("index query", self.index.query(vector, self.cfg.top_k))
            .await??;
        trace.push(format!("Found {} candidate(s) from KB", matches.len()));

        match best_match(&matches) {
            Some(top) => {
                trace.push(format!("Top similarity score: {:.4}", top.score));
                let threshold = self.cfg.threshold;

                match top.payload.usable_answer() {
                    Some(stored) if top.score >= threshold => {
                        trace.push(format!(
                            "Score >= threshold ({threshold}); generating polished answer from KB"
                        ));
                        return self.answer_from_kb(question, top, stored, trace).await;
                    }
                    Some(_) => trace.push(format!(
                        "Score < threshold ({threshold}); will fallback to LLM if available"
                    )),
                    None if top.score >= threshold => trace.push(
                        "Top match has no stored answer; will fallback to LLM if available".into(),
                    ),
                    None => trace.push(format!(
                        "Score < threshold ({threshold}); will fallback to LLM if available"
                    )),
                }
            }
            None => trace.push("No KB matches; will fallback to LLM if available".into()),
        }

        self.answer_from_fallback(question, trace).await
    }

    async fn answer_from_kb(
        &self,
        question: &str,
        top: &KbMatch,
        stored: &str,
        mut trace: Vec<String>,
    ) -> Result<AnswerOutcome, AnswerError> {
        let matched = top.payload.question.clone().unwrap_or_default();

        let answer = match &self.generator {
            Some(generator) => {
                let user = build_kb_prompt(&matched, stored, question);
                let params = GenerationParams::new(self.cfg.kb_temperature, self.cfg.max_tokens);
                let polished = self
                    .bounded("generation", generator.generate(KB_SYSTEM, &user, params))
                    .await?
                    .map_err(AnswerError::Generation)?;
                trace.push(format!("Polished KB answer with {}", generator.provider_name()));
                polished
            }
            None => {
                trace.push(
                    "No generation provider configured; returning stored KB answer".into(),
                );
                stored.to_string()
            }
        };

        info!(
            target: "kb_answer::engine",
            source = "kb",
            key = %top.id,
            score = top.score,
            "answered from knowledge base"
        );

        Ok(AnswerOutcome {
            answer,
            source: AnswerSource::KnowledgeBase,
            matched_question: Some(matched),
            score: Some(top.score),
            trace,
        })
    }

    async fn answer_from_fallback(
        &self,
        question: &str,
        mut trace: Vec<String>,
    ) -> Result<AnswerOutcome, AnswerError> {
        let answer = match &self.generator {
            Some(generator) => {
                let user = build_fallback_prompt(question);
                let params =
                    GenerationParams::new(self.cfg.fallback_temperature, self.cfg.max_tokens);
                let text = self
                    .bounded("generation", generator.generate(FALLBACK_SYSTEM, &user, params))
                    .await?
                    .map_err(AnswerError::Generation)?;
                trace.push(format!(
                    "Used {} fallback to generate answer",
                    generator.provider_name()
                ));
                text
            }
            None => {
                trace.push("No generation provider configured; returning default answer".into());
                DEFAULT_ANSWER.to_string()
            }
        };

        info!(target: "kb_answer::engine", source = "llm", "answered via fallback");

        Ok(AnswerOutcome {
            answer,
            source: AnswerSource::Fallback,
            matched_question: None,
            score: None,
            trace,
        })
    }

    async fn bounded<T>(
        &self,
        stage: &'static str,
        fut: impl Future<Output = T>,
    ) -> Result<T, AnswerError> {
        let limit: Duration = self.cfg.call_timeout;
        debug!(target: "kb_answer::engine", stage, timeout_ms = limit.as_millis() as u64, "provider call");
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| AnswerError::Timeout {
                stage,
                secs: limit.as_secs(),
            })
    }
}

/// Highest-similarity candidate; index ordering is not relied upon.
fn best_match(matches: &[KbMatch]) -> Option<&KbMatch> {
    matches.iter().max_by(|a, b| a.score.total_cmp(&b.score))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ai_llm_service::capabilities::BoxFuture;
    use ai_llm_service::error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind};
    use kb_index::errors::kb_index_error::KbIndexError;
    use kb_index::structs::knowledge::KbPayload;

    use super::*;

    struct FakeEmbedder {
        fail: bool,
        delay: Option<Duration>,
    }

    impl TextEmbedder for FakeEmbedder {
        fn embed<'a>(&'a self, _input: &'a str) -> BoxFuture<'a, Result<Vec<f32>, AiLlmError>> {
            Box::pin(async move {
                if let Some(d) = self.delay {
                    tokio::time::sleep(d).await;
                }
                if self.fail {
                    return Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into());
                }
                Ok(vec![0.1, 0.2, 0.3])
            })
        }

        fn provider_name(&self) -> &'static str {
            "FakeEmbed"
        }
    }

    struct FakeIndex(Vec<KbMatch>);

    impl KnowledgeIndex for FakeIndex {
        fn query<'a>(
            &'a self,
            _vector: Vec<f32>,
            top_k: u64,
        ) -> BoxFuture<'a, Result<Vec<KbMatch>, KbIndexError>> {
            let hits = self.0.iter().take(top_k as usize).cloned().collect();
            Box::pin(async move { Ok(hits) })
        }
    }

    struct DownIndex;

    impl KnowledgeIndex for DownIndex {
        fn query<'a>(
            &'a self,
            _vector: Vec<f32>,
            _top_k: u64,
        ) -> BoxFuture<'a, Result<Vec<KbMatch>, KbIndexError>> {
            Box::pin(async { Err(KbIndexError::Qdrant("search_points: unavailable".into())) })
        }
    }

    struct DownGenerator;

    impl TextGenerator for DownGenerator {
        fn generate<'a>(
            &'a self,
            _system: &'a str,
            _user: &'a str,
            _params: GenerationParams,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            Box::pin(async {
                Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into())
            })
        }

        fn provider_name(&self) -> &'static str {
            "DownChat"
        }
    }

    #[derive(Default)]
    struct FakeGenerator {
        calls: Mutex<Vec<(String, String, GenerationParams)>>,
    }

    impl TextGenerator for FakeGenerator {
        fn generate<'a>(
            &'a self,
            system: &'a str,
            user: &'a str,
            params: GenerationParams,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string(), params));
            Box::pin(async move { Ok(format!("generated[{}]", params.temperature.unwrap_or(-1.0))) })
        }

        fn provider_name(&self) -> &'static str {
            "FakeChat"
        }
    }

    fn hit(key: &str, q: &str, a: Option<&str>, score: f32) -> KbMatch {
        KbMatch {
            id: key.into(),
            score,
            payload: KbPayload {
                key: Some(key.into()),
                question: Some(q.into()),
                answer: a.map(str::to_string),
                topic: None,
                tags: vec![],
            },
        }
    }

    fn engine(
        matches: Vec<KbMatch>,
        generator: Option<Arc<FakeGenerator>>,
    ) -> AnswerEngine {
        AnswerEngine::new(
            Arc::new(FakeEmbedder {
                fail: false,
                delay: None,
            }),
            Arc::new(FakeIndex(matches)),
            generator.map(|g| g as Arc<dyn TextGenerator>),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn strong_match_is_polished_from_kb() {
        let generator = Arc::new(FakeGenerator::default());
        let eng = engine(
            vec![hit("kb-000", "What are your hours?", Some("We are open 9-5 Mon-Fri."), 0.92)],
            Some(generator.clone()),
        );

        let out = eng.ask("when are you open?").await.unwrap();
        assert_eq!(out.source, AnswerSource::KnowledgeBase);
        assert_eq!(out.matched_question.as_deref(), Some("What are your hours?"));
        assert_eq!(out.score, Some(0.92));
        assert_eq!(out.answer, "generated[0.2]");
        assert_eq!(
            out.trace,
            vec![
                "Checking knowledge base...",
                "Found 1 candidate(s) from KB",
                "Top similarity score: 0.9200",
                "Score >= threshold (0.7); generating polished answer from KB",
                "Polished KB answer with FakeChat",
            ]
        );

        let calls = generator.calls.lock().unwrap();
        let (system, user, params) = &calls[0];
        assert_eq!(system, KB_SYSTEM);
        assert!(user.contains("A: We are open 9-5 Mon-Fri."));
        assert!(user.contains("User question: when are you open?"));
        assert_eq!(params.max_tokens, Some(512));
    }

    #[tokio::test]
    async fn best_score_wins_regardless_of_order() {
        let eng = engine(
            vec![
                hit("kb-001", "Where are you?", Some("Main St."), 0.71),
                hit("kb-000", "What are your hours?", Some("9-5"), 0.95),
            ],
            Some(Arc::new(FakeGenerator::default())),
        );
        let out = eng.ask("hours?").await.unwrap();
        assert_eq!(out.matched_question.as_deref(), Some("What are your hours?"));
        assert_eq!(out.score, Some(0.95));
    }

    #[tokio::test]
    async fn no_matches_falls_back() {
        let generator = Arc::new(FakeGenerator::default());
        let eng = engine(vec![], Some(generator.clone()));

        let out = eng.ask("meaning of life?").await.unwrap();
        assert_eq!(out.source, AnswerSource::Fallback);
        assert_eq!(out.matched_question, None);
        assert_eq!(out.score, None);
        assert_eq!(out.answer, "generated[0.3]");
        assert!(out.trace.contains(&"No KB matches; will fallback to LLM if available".to_string()));
        assert_eq!(out.trace.last().unwrap(), "Used FakeChat fallback to generate answer");

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls[0].0, FALLBACK_SYSTEM);
        assert_eq!(calls[0].1, "Answer the question clearly. Question: meaning of life?");
    }

    #[tokio::test]
    async fn weak_match_hides_score() {
        let eng = engine(
            vec![hit("kb-000", "What are your hours?", Some("9-5"), 0.42)],
            Some(Arc::new(FakeGenerator::default())),
        );
        let out = eng.ask("tell me a joke").await.unwrap();
        assert_eq!(out.source, AnswerSource::Fallback);
        assert_eq!(out.score, None);
        assert_eq!(out.matched_question, None);
        assert!(out.trace.contains(&"Top similarity score: 0.4200".to_string()));
        assert!(out.trace.contains(
            &"Score < threshold (0.7); will fallback to LLM if available".to_string()
        ));
    }

    #[tokio::test]
    async fn strong_match_without_answer_falls_back() {
        let eng = engine(
            vec![hit("kb-000", "What are your hours?", Some("  "), 0.99)],
            Some(Arc::new(FakeGenerator::default())),
        );
        let out = eng.ask("hours?").await.unwrap();
        assert_eq!(out.source, AnswerSource::Fallback);
        assert!(out.trace.contains(
            &"Top match has no stored answer; will fallback to LLM if available".to_string()
        ));
    }

    #[tokio::test]
    async fn no_generator_uses_default_answer() {
        let eng = engine(vec![], None);
        let out = eng.ask("anything").await.unwrap();
        assert_eq!(out.answer, "I'm not sure about that yet, but I can look it up!");
        assert_eq!(out.source, AnswerSource::Fallback);
        assert_eq!(
            out.trace.last().unwrap(),
            "No generation provider configured; returning default answer"
        );
    }

    #[tokio::test]
    async fn no_generator_returns_stored_kb_answer() {
        let eng = engine(
            vec![hit("kb-000", "What are your hours?", Some("We are open 9-5 Mon-Fri."), 0.8)],
            None,
        );
        let out = eng.ask("hours?").await.unwrap();
        assert_eq!(out.source, AnswerSource::KnowledgeBase);
        assert_eq!(out.answer, "We are open 9-5 Mon-Fri.");
        assert_eq!(out.score, Some(0.8));
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let eng = engine(
            vec![hit("kb-000", "Q", Some("A"), 0.7)],
            Some(Arc::new(FakeGenerator::default())),
        );
        assert_eq!(eng.ask("q").await.unwrap().source, AnswerSource::KnowledgeBase);
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let eng = AnswerEngine::new(
            Arc::new(FakeEmbedder {
                fail: true,
                delay: None,
            }),
            Arc::new(FakeIndex(vec![])),
            None,
            EngineConfig::default(),
        );
        assert!(matches!(eng.ask("q").await, Err(AnswerError::Embedding(_))));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let cfg = EngineConfig {
            call_timeout: Duration::from_millis(20),
            ..EngineConfig::default()
        };
        let eng = AnswerEngine::new(
            Arc::new(FakeEmbedder {
                fail: false,
                delay: Some(Duration::from_secs(5)),
            }),
            Arc::new(FakeIndex(vec![])),
            None,
            cfg,
        );
        assert!(matches!(
            eng.ask("q").await,
            Err(AnswerError::Timeout {
                stage: "embedding",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn index_failure_propagates() {
        let eng = AnswerEngine::new(
            Arc::new(FakeEmbedder {
                fail: false,
                delay: None,
            }),
            Arc::new(DownIndex),
            Some(Arc::new(FakeGenerator::default()) as Arc<dyn TextGenerator>),
            EngineConfig::default(),
        );
        assert!(matches!(eng.ask("q").await, Err(AnswerError::Index(_))));
    }

    #[tokio::test]
    async fn generation_failure_propagates_on_both_paths() {
        let strong = vec![hit("kb-000", "What are your hours?", Some("9-5"), 0.95)];
        for matches in [strong, vec![]] {
            let eng = AnswerEngine::new(
                Arc::new(FakeEmbedder {
                    fail: false,
                    delay: None,
                }),
                Arc::new(FakeIndex(matches)),
                Some(Arc::new(DownGenerator) as Arc<dyn TextGenerator>),
                EngineConfig::default(),
            );
            assert!(matches!(eng.ask("q").await, Err(AnswerError::Generation(_))));
        }
    }
}
