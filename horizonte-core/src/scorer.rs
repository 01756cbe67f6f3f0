//! Per-profile scoring.
//!
//! Each profile is scored in isolation from the others, from nothing but the
//! normalized text and its tokens.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use crate::fuzzy::{fuzzy_token_match, phrase_in_text};
use crate::intent::Intent;
use crate::signals::{CompiledProfile, CompiledSignal, SignalKind};

/// Score of one intent for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: Intent,
    /// Never negative: anti-signals are clipped at zero.
    pub score: u32,
    /// Matched keys, prefixed `+` (signal) or `-` (anti-signal).
    pub hits: Vec<String>,
}

impl IntentScore {
    pub fn zero(intent: Intent) -> Self {
        Self { intent, score: 0, hits: Vec::new() }
    }
}

/// Exact occurrence counts of each token.
fn token_frequencies(tokens: &[String]) -> HashMap<&str, usize> {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for t in tokens {
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }
    freq
}

/// Weight multiplier for a matched signal. Token signals count repeated
/// exact tokens up to `max_hits`; a fuzzy-only match counts once.
fn multiplier(signal: &CompiledSignal, freq: &HashMap<&str, usize>, max_hits: u32) -> u32 {
    match signal.kind {
        SignalKind::Token => {
            let exact = freq.get(signal.key.as_str()).copied().unwrap_or(0).max(1);
            u32::try_from(exact).unwrap_or(u32::MAX).min(max_hits.max(1))
        }
        SignalKind::Phrase | SignalKind::Regex => 1,
    }
}

fn signal_matches(signal: &CompiledSignal, normalized_text: &str, tokens: &[String]) -> bool {
    match signal.kind {
        SignalKind::Token => tokens.iter().any(|t| fuzzy_token_match(t, &signal.key)),
        SignalKind::Phrase => phrase_in_text(&signal.key, normalized_text),
        SignalKind::Regex => signal.regex_matches(normalized_text),
    }
}

/// Score one profile: add matched signals, subtract matched anti-signals,
/// clamp at zero.
pub fn score_profile(
    profile: &CompiledProfile,
    normalized_text: &str,
    tokens: &[String],
    max_hits_per_signal: u32,
) -> IntentScore {
    let freq = token_frequencies(tokens);
    let mut score: i64 = 0;
    let mut hits = Vec::new();

    let polarities = [(&profile.signals, 1i64, '+'), (&profile.anti_signals, -1i64, '-')];
    for (signals, sign, prefix) in polarities {
        for s in signals.iter() {
            if !signal_matches(s, normalized_text, tokens) {
                continue;
            }
            let delta = i64::from(s.weight) * i64::from(multiplier(s, &freq, max_hits_per_signal));
            score += sign * delta;
            hits.push(format!("{prefix}{}", s.key));
            trace!(intent = %profile.intent, key = %s.key, delta = sign * delta, "signal hit");
        }
    }

    IntentScore {
        intent: profile.intent,
        score: u32::try_from(score.max(0)).unwrap_or(u32::MAX),
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{IntentProfile, Signal, SignalTable};
    use crate::text::{normalize, tokens_of, DEFAULT_MAX_TOKENS};

    fn score(table: &SignalTable, intent: Intent, prompt: &str) -> IntentScore {
        let text = normalize(prompt);
        let tokens = tokens_of(&text, DEFAULT_MAX_TOKENS);
        let profile = table.profiles().iter().find(|p| p.intent == intent).unwrap();
        score_profile(profile, &text, &tokens, 2)
    }

    #[test]
    fn test_construction_tokens_accumulate() {
        let s = score(
            SignalTable::builtin(),
            Intent::ConstructionPlan,
            "ndertim shtepi me themele beton faza kosto",
        );
        assert_eq!(s.score, 19);
        assert_eq!(s.hits, vec!["+ndertim", "+shtepi", "+faza", "+themele", "+beton"]);
    }

    #[test]
    fn test_repetition_capped_at_two() {
        let once = score(SignalTable::builtin(), Intent::EvnInfo, "evn");
        let twice = score(SignalTable::builtin(), Intent::EvnInfo, "evn evn");
        let thrice = score(SignalTable::builtin(), Intent::EvnInfo, "evn evn evn");
        assert_eq!(once.score, 5);
        assert_eq!(twice.score, 10);
        assert_eq!(thrice.score, 10);
        assert_eq!(thrice.hits, vec!["+evn"]);
    }

    #[test]
    fn test_fuzzy_only_match_counts_once() {
        // "rrymes" is one edit away from "rryme", "kycja" from "kycje".
        let s = score(SignalTable::builtin(), Intent::EvnInfo, "rrymes rrymes kycja");
        assert_eq!(s.score, 8);
        assert_eq!(s.hits, vec!["+rryme", "+kycje"]);
    }

    #[test]
    fn test_phrase_and_regex_signals() {
        let s = score(SignalTable::builtin(), Intent::EvnInfo, "sa kushton kycja e rrymes 11 kw evn");
        assert_eq!(s.score, 23);
        assert!(s.hits.contains(&"+sa kushton".to_string()));
        assert!(s.hits.contains(&r"+\b(3\.6|11|17\.3|24\.8)\b".to_string()));
    }

    #[test]
    fn test_anti_signals_clamp_to_zero() {
        let s = score(
            SignalTable::builtin(),
            Intent::ConstructionPlan,
            "ndertim shtepi instagram facebook",
        );
        assert_eq!(s.score, 0);
        assert_eq!(s.hits, vec!["+ndertim", "+shtepi", "-instagram", "-facebook"]);
    }

    #[test]
    fn test_anti_signal_alone_records_hit() {
        let s = score(SignalTable::builtin(), Intent::EvnInfo, "themele");
        assert_eq!(s.score, 0);
        assert_eq!(s.hits, vec!["-themele"]);
    }

    #[test]
    fn test_repeated_anti_token_uses_multiplier() {
        let table = SignalTable::new(vec![IntentProfile::new(
            Intent::ConstructionPlan,
            vec![Signal::token("shtepi", 10)],
        )
        .with_anti_signals(vec![Signal::token("instagram", 3)])])
        .unwrap();
        let s = score(&table, Intent::ConstructionPlan, "shtepi instagram instagram");
        assert_eq!(s.score, 4);
    }

    #[test]
    fn test_degenerate_input_scores_zero() {
        let inputs = ["", "   ", "\u{0}\u{1}\u{2}", "🦀🦀🦀", "instagram facebook github mur themele"];
        for input in inputs {
            for p in SignalTable::builtin().profiles() {
                let text = normalize(input);
                let tokens = tokens_of(&text, DEFAULT_MAX_TOKENS);
                let s = score_profile(p, &text, &tokens, 2);
                assert_eq!(s.score, 0, "{input:?} for {}", p.intent);
            }
        }
    }
}
