//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::error::AnswerError;

/// Knobs for [`crate::AnswerEngine`]. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Minimum similarity for a KB match to be trusted.
    pub threshold: f32,
    /// Candidates requested from the index.
    pub top_k: u64,

    pub kb_temperature: f32,
    pub fallback_temperature: f32,
    pub max_tokens: u32,

    /// Upper bound for each provider call (embed, query, generate).
    pub call_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            top_k: 3,
            kb_temperature: 0.2,
            fallback_temperature: 0.3,
            max_tokens: 512,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Build from `KB_MATCH_THRESHOLD` and `PROVIDER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, AnswerError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    pub fn from_vars<F>(get: F) -> Result<Self, AnswerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = get("KB_MATCH_THRESHOLD").filter(|v| !v.trim().is_empty()) {
            cfg.threshold = v.trim().parse().map_err(|_| {
                AnswerError::InvalidConfig(format!("KB_MATCH_THRESHOLD is not a number: '{v}'"))
            })?;
        }
        if let Some(v) = get("PROVIDER_TIMEOUT_SECS").filter(|v| !v.trim().is_empty()) {
            let secs: u64 = v.trim().parse().map_err(|_| {
                AnswerError::InvalidConfig(format!("PROVIDER_TIMEOUT_SECS is not an integer: '{v}'"))
            })?;
            cfg.call_timeout = Duration::from_secs(secs);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AnswerError> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(AnswerError::InvalidConfig(format!(
                "KB_MATCH_THRESHOLD must be in [-1, 1], got {}",
                self.threshold
            )));
        }
        if self.top_k == 0 {
            return Err(AnswerError::InvalidConfig("top_k must be > 0".into()));
        }
        if self.call_timeout.is_zero() {
            return Err(AnswerError::InvalidConfig(
                "PROVIDER_TIMEOUT_SECS must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = EngineConfig::from_vars(|_| None).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.top_k, 3);
    }

    #[test]
    fn threshold_range() {
        let get = |v: &'static str| move |k: &str| (k == "KB_MATCH_THRESHOLD").then(|| v.to_string());
        assert_eq!(EngineConfig::from_vars(get("0.85")).unwrap().threshold, 0.85);
        assert_eq!(EngineConfig::from_vars(get("-1")).unwrap().threshold, -1.0);
        assert!(EngineConfig::from_vars(get("1.5")).is_err());
        assert!(EngineConfig::from_vars(get("high")).is_err());
    }

    #[test]
    fn timeout_must_be_positive() {
        let get = |k: &str| (k == "PROVIDER_TIMEOUT_SECS").then(|| "0".to_string());
        assert!(EngineConfig::from_vars(get).is_err());
    }
}
