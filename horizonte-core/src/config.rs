//! Router tuning parameters.
//!
//! One immutable struct handed to [`Router::new`](crate::routing::Router::new)
//! so tests can run alternate threshold sets side by side.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::text::DEFAULT_MAX_TOKENS;

/// Blend weights of the confidence function. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Absolute evidence strength.
    pub absolute: f64,
    /// Separation from the runner-up.
    pub gap: f64,
    /// Ratio dominance over the runner-up.
    pub dominance: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self { absolute: 0.45, gap: 0.35, dominance: 0.20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Runner-up score that counts as meaningful next to a greeting.
    pub min_score_to_consider: u32,
    /// Below this top score the router asks for clarification.
    pub low_confidence_score: u32,
    /// A greeting wins outright at this score.
    pub greeting_min_score: u32,
    /// Top must reach `second * dominance_ratio` to win outright.
    pub dominance_ratio: f64,
    /// Minimum runner-up score for a composite route.
    pub composite_min_second: u32,
    /// Maximum top/second gap for a composite route.
    pub ambiguous_gap_max: u32,
    /// Cap on the repetition multiplier of token signals.
    pub max_hits_per_signal: u32,
    pub max_tokens: usize,
    /// Normalized prompts shorter than this are rejected unscored.
    pub min_normalized_len: usize,
    /// Score treated as "very strong evidence" by the confidence function.
    pub strong_evidence_score: f64,
    /// Gap at which the gap factor saturates.
    pub gap_scale: f64,
    pub confidence_weights: ConfidenceWeights,
    pub greeting_confidence: f64,
    pub empty_input_confidence: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            min_score_to_consider: 5,
            low_confidence_score: 6,
            greeting_min_score: 1,
            dominance_ratio: 1.5,
            composite_min_second: 6,
            ambiguous_gap_max: 3,
            max_hits_per_signal: 2,
            max_tokens: DEFAULT_MAX_TOKENS,
            min_normalized_len: 2,
            strong_evidence_score: 18.0,
            gap_scale: 8.0,
            confidence_weights: ConfidenceWeights::default(),
            greeting_confidence: 0.9,
            empty_input_confidence: 0.2,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!("{name} must be a positive finite number, got {v}")))
    }
}

fn unit(name: &str, v: f64) -> Result<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!("{name} must be within 0..=1, got {v}")))
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<()> {
        positive("dominance_ratio", self.dominance_ratio)?;
        positive("strong_evidence_score", self.strong_evidence_score)?;
        positive("gap_scale", self.gap_scale)?;
        unit("greeting_confidence", self.greeting_confidence)?;
        unit("empty_input_confidence", self.empty_input_confidence)?;

        if self.max_tokens == 0 {
            return Err(CoreError::InvalidConfig("max_tokens must be at least 1".into()));
        }
        if self.max_hits_per_signal == 0 {
            return Err(CoreError::InvalidConfig("max_hits_per_signal must be at least 1".into()));
        }

        let w = self.confidence_weights;
        for (name, v) in [("absolute", w.absolute), ("gap", w.gap), ("dominance", w.dominance)] {
            unit(&format!("confidence_weights.{name}"), v)?;
        }
        let sum = w.absolute + w.gap + w.dominance;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(CoreError::InvalidConfig(format!(
                "confidence_weights must sum to 1, got {sum}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        RouterConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_ratio_and_weights() {
        let cfg = RouterConfig { dominance_ratio: 0.0, ..RouterConfig::default() };
        assert!(cfg.validate().is_err());

        let cfg = RouterConfig { dominance_ratio: f64::NAN, ..RouterConfig::default() };
        assert!(cfg.validate().is_err());

        let cfg = RouterConfig {
            confidence_weights: ConfidenceWeights { absolute: 0.5, gap: 0.5, dominance: 0.5 },
            ..RouterConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = RouterConfig { max_tokens: 0, ..RouterConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: RouterConfig = serde_json::from_str(r#"{"dominance_ratio": 2.0}"#).unwrap();
        assert_eq!(cfg.dominance_ratio, 2.0);
        assert_eq!(cfg.low_confidence_score, 6);
        assert_eq!(cfg.confidence_weights, ConfidenceWeights::default());
    }
}
