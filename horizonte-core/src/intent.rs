//! Intent and strategy tags shared by the router and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The classified purpose of a user prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Construction or renovation planning.
    ConstructionPlan,
    /// Electrical grid connection (EVN) questions.
    EvnInfo,
    Greeting,
    OutOfScope,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::ConstructionPlan,
        Intent::EvnInfo,
        Intent::Greeting,
        Intent::OutOfScope,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ConstructionPlan => "CONSTRUCTION_PLAN",
            Intent::EvnInfo => "EVN_INFO",
            Intent::Greeting => "GREETING",
            Intent::OutOfScope => "OUT_OF_SCOPE",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownTag(s.to_string()))
    }
}

/// How the downstream prompt builder should handle a routed prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Commit to a single intent.
    Single,
    /// Address two compatible intents together.
    Composite,
    /// Ask the user a disambiguating question.
    Clarify,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Single => "SINGLE",
            Strategy::Composite => "COMPOSITE",
            Strategy::Clarify => "CLARIFY",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(Strategy::Single),
            "COMPOSITE" => Ok(Strategy::Composite),
            "CLARIFY" => Ok(Strategy::Clarify),
            _ => Err(CoreError::UnknownTag(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_names() {
        assert_eq!(Intent::EvnInfo.to_string(), "EVN_INFO");
        assert_eq!(
            serde_json::to_string(&Intent::ConstructionPlan).unwrap(),
            "\"CONSTRUCTION_PLAN\""
        );
        assert_eq!("greeting".parse::<Intent>().unwrap(), Intent::Greeting);
        assert!("weather".parse::<Intent>().is_err());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("composite".parse::<Strategy>().unwrap(), Strategy::Composite);
        assert_eq!(Strategy::Clarify.to_string(), "CLARIFY");
    }
}
