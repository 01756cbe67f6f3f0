//! Signal profile table: per-intent weighted clues.
//!
//! The table is plain data (`IntentProfile` is serde-friendly) so it can be
//! unit-tested on its own and swapped without touching the decision policy.
//! [`SignalTable::new`] validates a profile list once and compiles its regexes;
//! scoring never compiles anything.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{CoreError, Result};
use crate::intent::Intent;
use crate::text::normalize;

/// How a signal is matched against a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Fuzzy-matched against every token; repeated exact tokens count more.
    Token,
    /// Literal substring of the normalized text.
    Phrase,
    /// Regular expression over the normalized text.
    Regex,
}

/// A single weighted clue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub key: String,
    pub weight: u32,
    pub kind: SignalKind,
}

impl Signal {
    pub fn token(key: impl Into<String>, weight: u32) -> Self {
        Self { key: key.into(), weight, kind: SignalKind::Token }
    }

    pub fn phrase(key: impl Into<String>, weight: u32) -> Self {
        Self { key: key.into(), weight, kind: SignalKind::Phrase }
    }

    pub fn regex(key: impl Into<String>, weight: u32) -> Self {
        Self { key: key.into(), weight, kind: SignalKind::Regex }
    }
}

/// Signals and anti-signals for one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentProfile {
    pub intent: Intent,
    pub signals: Vec<Signal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anti_signals: Vec<Signal>,
}

impl IntentProfile {
    pub fn new(intent: Intent, signals: Vec<Signal>) -> Self {
        Self { intent, signals, anti_signals: Vec::new() }
    }

    pub fn with_anti_signals(mut self, anti_signals: Vec<Signal>) -> Self {
        self.anti_signals = anti_signals;
        self
    }
}

/// A validated signal, ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledSignal {
    /// Normalized for token/phrase kinds; the raw pattern for regex.
    pub key: String,
    pub weight: u32,
    pub kind: SignalKind,
    pub(crate) regex: Option<Regex>,
}

impl CompiledSignal {
    fn compile(intent: Intent, signal: &Signal) -> Result<Self> {
        if signal.weight == 0 {
            return Err(CoreError::InvalidWeight {
                intent: intent.to_string(),
                key: signal.key.clone(),
            });
        }

        let (key, regex) = match signal.kind {
            SignalKind::Token | SignalKind::Phrase => (normalize(&signal.key), None),
            SignalKind::Regex => {
                let re = Regex::new(&signal.key).map_err(|source| CoreError::InvalidRegex {
                    intent: intent.to_string(),
                    pattern: signal.key.clone(),
                    source,
                })?;
                (signal.key.clone(), Some(re))
            }
        };

        if key.trim().is_empty() {
            return Err(CoreError::EmptyKey {
                intent: intent.to_string(),
                key: signal.key.clone(),
            });
        }

        Ok(Self { key, weight: signal.weight, kind: signal.kind, regex })
    }

    pub(crate) fn regex_matches(&self, normalized_text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(normalized_text))
    }
}

/// A validated profile.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub intent: Intent,
    pub signals: Vec<CompiledSignal>,
    pub anti_signals: Vec<CompiledSignal>,
}

/// Process-wide, read-only set of intent profiles in declaration order.
#[derive(Debug, Clone)]
pub struct SignalTable {
    profiles: Vec<CompiledProfile>,
    source: Vec<IntentProfile>,
}

static BUILTIN: LazyLock<SignalTable> = LazyLock::new(|| {
    SignalTable::new(builtin_profiles()).expect("built-in signal table must validate")
});

impl SignalTable {
    /// Validate and compile a profile list. Declaration order is kept and
    /// later breaks score ties.
    pub fn new(profiles: Vec<IntentProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(CoreError::EmptyTable);
        }

        let mut compiled: Vec<CompiledProfile> = Vec::with_capacity(profiles.len());
        for p in &profiles {
            if compiled.iter().any(|c| c.intent == p.intent) {
                return Err(CoreError::DuplicateProfile(p.intent.to_string()));
            }

            let signals = p
                .signals
                .iter()
                .map(|s| CompiledSignal::compile(p.intent, s))
                .collect::<Result<Vec<_>>>()?;
            let anti_signals = p
                .anti_signals
                .iter()
                .map(|s| CompiledSignal::compile(p.intent, s))
                .collect::<Result<Vec<_>>>()?;

            compiled.push(CompiledProfile { intent: p.intent, signals, anti_signals });
        }

        Ok(Self { profiles: compiled, source: profiles })
    }

    /// The default table, compiled on first use.
    pub fn builtin() -> &'static SignalTable {
        &BUILTIN
    }

    /// Load a table from its JSON form (an array of profiles).
    pub fn from_json(json: &str) -> Result<Self> {
        let profiles: Vec<IntentProfile> = serde_json::from_str(json)?;
        Self::new(profiles)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.source)?)
    }

    pub fn profiles(&self) -> &[CompiledProfile] {
        &self.profiles
    }

    /// The profile list as it was declared.
    pub fn source_profiles(&self) -> &[IntentProfile] {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Built-in Albanian/Macedonian/English profiles.
///
/// Order matters: EVN first, then construction, then greeting.
pub fn builtin_profiles() -> Vec<IntentProfile> {
    vec![
        IntentProfile::new(
            Intent::EvnInfo,
            vec![
                Signal::token("evn", 5),
                Signal::token("kw", 4),
                Signal::token("kilovat", 4),
                Signal::token("rryme", 4),
                Signal::token("energji", 3),
                Signal::token("kycje", 4),
                Signal::token("mates", 3),
                Signal::token("sahat", 3),
                Signal::token("rrjet", 3),
                Signal::phrase("kycje rryme", 6),
                Signal::phrase("sa kushton", 2),
                // Standard connection ratings
                Signal::regex(r"\b(3\.6|11|17\.3|24\.8)\b", 4),
                Signal::regex(r"\bdenar(e|ë|)\b", 3),
            ],
        )
        .with_anti_signals(vec![Signal::token("mur", 2), Signal::token("themele", 2)]),
        IntentProfile::new(
            Intent::ConstructionPlan,
            vec![
                Signal::token("ndertim", 4),
                Signal::token("renovim", 4),
                Signal::token("shtepi", 4),
                Signal::token("banese", 3),
                Signal::token("projekt", 3),
                Signal::token("plan", 3),
                Signal::token("faza", 4),
                Signal::token("themele", 4),
                Signal::token("beton", 3),
                Signal::token("armature", 3),
                Signal::token("izolim", 3),
                Signal::token("cati", 3),
                Signal::regex(r"\b(m2|m\s?2|m²)\b", 4),
                Signal::regex(r"\b(eur|euro)\b", 2),
                Signal::phrase("sa kushton", 2),
            ],
        )
        .with_anti_signals(vec![
            Signal::token("instagram", 4),
            Signal::token("facebook", 4),
            Signal::token("github", 4),
        ]),
        IntentProfile::new(
            Intent::Greeting,
            vec![
                Signal::token("pershendetje", 3),
                Signal::token("tung", 2),
                Signal::token("hi", 2),
                Signal::token("hello", 2),
                Signal::phrase("si funksionon", 4),
                Signal::phrase("cfare eshte", 3),
                Signal::token("ndihme", 2),
            ],
        ),
    ]
}
