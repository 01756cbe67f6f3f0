//! Configuration-time errors for the routing core.
//!
//! Routing itself is total: these only surface while building a
//! [`SignalTable`](crate::signals::SignalTable) or validating a
//! [`RouterConfig`](crate::config::RouterConfig).

/// Unified error type for the routing core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A regex signal failed to compile.
    #[error("invalid regex signal `{pattern}` for {intent}: {source}")]
    InvalidRegex {
        intent: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A signal carried a zero weight.
    #[error("signal `{key}` for {intent} must have a positive weight")]
    InvalidWeight { intent: String, key: String },

    /// A signal key normalizes to nothing.
    #[error("signal key `{key}` for {intent} is empty after normalization")]
    EmptyKey { intent: String, key: String },

    /// The table has no profiles at all.
    #[error("signal table must contain at least one profile")]
    EmptyTable,

    /// The same intent was declared twice.
    #[error("duplicate profile for intent {0}")]
    DuplicateProfile(String),

    /// A threshold or weight in the router configuration is unusable.
    #[error("invalid router config: {0}")]
    InvalidConfig(String),

    /// A string did not name a known intent or strategy.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// A serialized signal table could not be decoded.
    #[error("signal table json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
