//! Deterministic intent routing: normalize, score every profile, then walk an
//! ordered list of guard rules until one commits to a decision.
//!
//! Routing is pure and synchronous. A `Router` holds only read-only data, so
//! one instance can serve any number of concurrent callers.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::intent::{Intent, Strategy};
use crate::scorer::{score_profile, IntentScore};
use crate::signals::SignalTable;
use crate::text::{normalize, tokens_of};

/// Intent pairs that can be served together in one answer.
const COMPATIBLE_PAIRS: &[(Intent, Intent)] = &[(Intent::ConstructionPlan, Intent::EvnInfo)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub strategy: Strategy,
    pub primary: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Intent>,
    /// Within 0..=1.
    pub confidence: f64,
    /// Every profile's score, ranked descending.
    pub scores: Vec<IntentScore>,
    pub reason: String,
}

impl RouteDecision {
    /// Primary intent, then the secondary one if any.
    pub fn intents(&self) -> Vec<Intent> {
        std::iter::once(self.primary).chain(self.secondary).collect()
    }

    /// Whether the caller may answer without asking the user first.
    pub fn is_actionable(&self) -> bool {
        self.strategy != Strategy::Clarify
    }

    pub fn score_of(&self, intent: Intent) -> u32 {
        self.scores
            .iter()
            .find(|s| s.intent == intent)
            .map(|s| s.score)
            .unwrap_or(0)
    }
}

/// Blend of absolute strength, gap and ratio dominance, clamped to 0..=1.
pub fn confidence_from_top_two(top: u32, second: u32, config: &RouterConfig) -> f64 {
    if top == 0 {
        return 0.0;
    }
    let (top, second) = (f64::from(top), f64::from(second));

    let dominance = if second == 0.0 {
        1.0
    } else {
        (top / (second * config.dominance_ratio)).min(1.0)
    };
    let absolute = (top / config.strong_evidence_score).min(1.0);
    let gap = ((top - second) / config.gap_scale).min(1.0);

    let w = config.confidence_weights;
    (w.absolute * absolute + w.gap * gap + w.dominance * dominance).clamp(0.0, 1.0)
}

/// What the rules see: the two best scores and the default confidence.
struct Ranked<'a> {
    top: &'a IntentScore,
    second: &'a IntentScore,
    confidence: f64,
}

/// A rule's verdict, before the score list is attached.
struct Verdict {
    strategy: Strategy,
    primary: Intent,
    secondary: Option<Intent>,
    confidence: f64,
    reason: &'static str,
}

type Rule = fn(&RouterConfig, &Ranked<'_>) -> Option<Verdict>;

/// Evaluated in order; the first rule returning a verdict wins.
const RULES: &[(&str, Rule)] = &[
    ("greeting", greeting),
    ("greeting_with_intent", greeting_with_intent),
    ("weak_evidence", weak_evidence),
    ("dominant", dominant),
    ("composite", composite),
];

fn greeting(cfg: &RouterConfig, r: &Ranked<'_>) -> Option<Verdict> {
    (r.top.intent == Intent::Greeting && r.top.score >= cfg.greeting_min_score).then(|| Verdict {
        strategy: Strategy::Single,
        primary: Intent::Greeting,
        secondary: None,
        confidence: cfg.greeting_confidence,
        reason: "Greeting detected",
    })
}

fn greeting_with_intent(cfg: &RouterConfig, r: &Ranked<'_>) -> Option<Verdict> {
    // Confidence is taken with the runner-up promoted to top.
    (r.top.intent == Intent::Greeting && r.second.score >= cfg.min_score_to_consider).then(|| {
        Verdict {
            strategy: Strategy::Single,
            primary: r.second.intent,
            secondary: None,
            confidence: confidence_from_top_two(r.second.score, r.top.score, cfg),
            reason: "Greeting + meaningful intent detected; routing to intent",
        }
    })
}

fn weak_evidence(cfg: &RouterConfig, r: &Ranked<'_>) -> Option<Verdict> {
    (r.top.score < cfg.low_confidence_score).then(|| Verdict {
        strategy: Strategy::Clarify,
        primary: r.top.intent,
        secondary: None,
        confidence: r.confidence,
        reason: "Low confidence (weak total evidence)",
    })
}

fn dominant(cfg: &RouterConfig, r: &Ranked<'_>) -> Option<Verdict> {
    let dominates = r.second.score == 0
        || f64::from(r.top.score) >= f64::from(r.second.score) * cfg.dominance_ratio;
    dominates.then(|| Verdict {
        strategy: Strategy::Single,
        primary: r.top.intent,
        secondary: None,
        confidence: r.confidence,
        reason: "Dominant intent",
    })
}

fn composite(cfg: &RouterConfig, r: &Ranked<'_>) -> Option<Verdict> {
    let compatible = COMPATIBLE_PAIRS.iter().any(|&(a, b)| {
        (r.top.intent == a && r.second.intent == b) || (r.top.intent == b && r.second.intent == a)
    });
    let gap = r.top.score.saturating_sub(r.second.score);

    (compatible && r.second.score >= cfg.composite_min_second && gap <= cfg.ambiguous_gap_max)
        .then(|| Verdict {
            strategy: Strategy::Composite,
            primary: r.top.intent,
            secondary: Some(r.second.intent),
            confidence: r.confidence,
            reason: "Composite request (construction + EVN) detected",
        })
}

fn ambiguous(r: &Ranked<'_>) -> Verdict {
    Verdict {
        strategy: Strategy::Clarify,
        primary: r.top.intent,
        secondary: Some(r.second.intent),
        confidence: r.confidence,
        reason: "Multiple intents with no safe dominance",
    }
}

/// The routing engine: a validated config plus a signal table.
#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
    table: SignalTable,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            config: RouterConfig::default(),
            table: SignalTable::builtin().clone(),
        }
    }
}

static DEFAULT_ROUTER: LazyLock<Router> = LazyLock::new(Router::default);

/// Route with the built-in table and default thresholds.
pub fn route(prompt: &str) -> RouteDecision {
    DEFAULT_ROUTER.route(prompt)
}

impl Router {
    pub fn new(config: RouterConfig, table: SignalTable) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, table })
    }

    pub fn with_config(config: RouterConfig) -> Result<Self> {
        Self::new(config, SignalTable::builtin().clone())
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn table(&self) -> &SignalTable {
        &self.table
    }

    /// Score every profile against normalized text, ranked descending.
    /// Ties keep declaration order.
    pub fn rank(&self, normalized_text: &str, tokens: &[String]) -> Vec<IntentScore> {
        let mut scores: Vec<IntentScore> = self
            .table
            .profiles()
            .iter()
            .map(|p| score_profile(p, normalized_text, tokens, self.config.max_hits_per_signal))
            .collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    /// Classify a raw prompt. Never fails.
    pub fn route(&self, prompt: &str) -> RouteDecision {
        let text = normalize(prompt);
        if text.chars().count() < self.config.min_normalized_len {
            debug!(len = text.len(), "prompt too short to score");
            return RouteDecision {
                strategy: Strategy::Clarify,
                primary: Intent::Greeting,
                secondary: None,
                confidence: self.config.empty_input_confidence,
                scores: Vec::new(),
                reason: "Empty/too-short input".to_string(),
            };
        }

        let tokens = tokens_of(&text, self.config.max_tokens);
        let scores = self.rank(&text, &tokens);

        let fallback_second = IntentScore::zero(Intent::OutOfScope);
        let top = &scores[0];
        let second = scores.get(1).unwrap_or(&fallback_second);

        let ranked = Ranked {
            top,
            second,
            confidence: confidence_from_top_two(top.score, second.score, &self.config),
        };

        let (rule, verdict) = RULES
            .iter()
            .find_map(|(name, rule)| rule(&self.config, &ranked).map(|v| (*name, v)))
            .unwrap_or_else(|| ("ambiguous", ambiguous(&ranked)));

        debug!(
            rule,
            strategy = %verdict.strategy,
            primary = %verdict.primary,
            top = top.score,
            second = second.score,
            confidence = verdict.confidence,
            "routed prompt"
        );

        RouteDecision {
            strategy: verdict.strategy,
            primary: verdict.primary,
            secondary: verdict.secondary,
            confidence: verdict.confidence,
            reason: verdict.reason.to_string(),
            scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{IntentProfile, Signal};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_confidence_formula() {
        let cfg = RouterConfig::default();
        assert_eq!(confidence_from_top_two(0, 0, &cfg), 0.0);
        assert!(approx(confidence_from_top_two(19, 0, &cfg), 1.0));
        // 0.45 * 6/18 + 0.35 * 6/8 + 0.20
        assert!(approx(confidence_from_top_two(6, 0, &cfg), 0.6125));
        // 0.45 * 13/18 + 0.35 * 1/8 + 0.20 * 13/18
        assert!(approx(confidence_from_top_two(13, 12, &cfg), 0.513_194_444_444_444_5));
    }

    #[test]
    fn test_confidence_negative_gap_is_clamped_not_lifted() {
        let cfg = RouterConfig::default();
        let swapped = confidence_from_top_two(8, 11, &cfg);
        assert!(swapped > 0.0 && swapped < confidence_from_top_two(11, 8, &cfg));
        assert!(approx(swapped, 0.165_719_696_969_697));
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let router = Router::default();
        let scores = router.rank("", &[]);
        let order: Vec<Intent> = scores.iter().map(|s| s.intent).collect();
        assert_eq!(order, vec![Intent::EvnInfo, Intent::ConstructionPlan, Intent::Greeting]);
    }

    #[test]
    fn test_single_profile_table_uses_synthetic_second() {
        let table = SignalTable::new(vec![IntentProfile::new(
            Intent::ConstructionPlan,
            vec![Signal::token("shtepi", 7)],
        )])
        .unwrap();
        let router = Router::new(RouterConfig::default(), table).unwrap();
        let d = router.route("shtepi");
        assert_eq!(d.strategy, Strategy::Single);
        assert_eq!(d.primary, Intent::ConstructionPlan);
        assert_eq!(d.scores.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = RouterConfig { gap_scale: -1.0, ..RouterConfig::default() };
        assert!(Router::with_config(cfg).is_err());
    }

    #[test]
    fn test_decision_json_shape() {
        let d = route("Hello");
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["strategy"], "SINGLE");
        assert_eq!(v["primary"], "GREETING");
        assert!(v.get("secondary").is_none());
        assert_eq!(v["scores"][0]["hits"][0], "+hello");
    }

    #[test]
    fn test_intents_lists_secondary() {
        let d = route("ndertim shtepi faza evn kycje kw");
        assert_eq!(d.intents(), vec![Intent::EvnInfo, Intent::ConstructionPlan]);
        assert!(d.is_actionable());
        assert_eq!(d.score_of(Intent::ConstructionPlan), 12);
        assert_eq!(d.score_of(Intent::OutOfScope), 0);
    }
}
