//! Canned replies for when no generator is configured.

use horizonte_core::{Intent, RouteDecision, Strategy};

const GREETING: &str = "Hello! I am Horizonte AI. I can help you plan a construction or \
renovation project, estimate phases and costs, and explain EVN electricity connections.";

const EVN: &str = "\
EVN connection prices in North Macedonia:
- 3.6 / 7.5 / 11 kW: 22.745 denars (about 370 EUR)
- 17.3 kW: 35.772 denars (about 580 EUR)
- 24.8 kW: 51.279 denars (about 830 EUR)
Apply at Elektrodistribucija (https://elektrodistribucija.mk) about 3 weeks ahead, then sign \
the supply contract with EVN (https://snabduvanje.evn.mk). Contact: 0800 40 100, info@evn.mk";

const CONSTRUCTION: &str = "I can prepare a four-phase plan with tasks, materials, time and \
cost ranges. Tell me the building type, its size in m2, the location and your budget.";

const OUT_OF_SCOPE: &str = "Sorry, I can only help with construction, renovation and \
electricity connections.";

fn topic(intent: Intent) -> &'static str {
    match intent {
        Intent::ConstructionPlan => "a construction or renovation plan",
        Intent::EvnInfo => "an EVN electricity connection",
        Intent::Greeting => "how Horizonte works",
        Intent::OutOfScope => "something else",
    }
}

fn intent_reply(intent: Intent) -> &'static str {
    match intent {
        Intent::ConstructionPlan => CONSTRUCTION,
        Intent::EvnInfo => EVN,
        Intent::Greeting => GREETING,
        Intent::OutOfScope => OUT_OF_SCOPE,
    }
}

/// Deterministic reply for a routing decision.
pub fn offline_reply(decision: &RouteDecision) -> String {
    match decision.strategy {
        Strategy::Single => intent_reply(decision.primary).to_string(),
        Strategy::Composite => {
            let mut parts = vec!["Your request covers more than one topic.".to_string()];
            parts.extend(decision.intents().into_iter().map(|i| intent_reply(i).to_string()));
            parts.join("\n\n")
        }
        Strategy::Clarify => {
            if decision.scores.is_empty() {
                return format!("{GREETING}\nWhat would you like to ask?");
            }
            if decision.score_of(decision.primary) == 0 {
                return "Could you tell me a bit more? I can help with construction, renovation \
                        and electricity connections."
                    .to_string();
            }
            match decision.secondary {
                Some(second) => format!(
                    "Could you clarify: is your question about {} or about {}?",
                    topic(decision.primary),
                    topic(second)
                ),
                None => format!(
                    "Could you tell me a bit more? Is your question about {}?",
                    topic(decision.primary)
                ),
            }
        }
    }
}
