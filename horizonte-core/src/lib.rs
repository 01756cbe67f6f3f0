//! horizonte-core: intent routing for the Horizonte construction advisor.
//!
//! Pipeline: [`text`] normalization, [`fuzzy`] matching against the
//! [`signals`] table, per-profile [`scorer`], and the [`routing`] decision
//! policy that picks SINGLE, COMPOSITE or CLARIFY.

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod intent;
pub mod routing;
pub mod scorer;
pub mod signals;
pub mod text;

pub use config::{ConfidenceWeights, RouterConfig};
pub use error::{CoreError, Result};
pub use fuzzy::{fuzzy_token_match, levenshtein, phrase_in_text};
pub use intent::{Intent, Strategy};
pub use routing::{confidence_from_top_two, route, RouteDecision, Router};
pub use scorer::{score_profile, IntentScore};
pub use signals::{builtin_profiles, IntentProfile, Signal, SignalKind, SignalTable};
pub use text::{normalize, tokenize, DEFAULT_MAX_TOKENS};
