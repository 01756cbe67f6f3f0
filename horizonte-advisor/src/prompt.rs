//! System/user message assembly from a routing decision.
//!
//! The system message is built from fixed blocks: core rules, one context
//! block per routed intent, strategy instructions, the output formats and the
//! compressed catalog. Blocks are separated by a blank line.

use serde::Serialize;

use horizonte_catalog::Catalog;
use horizonte_core::{Intent, RouteDecision, Strategy};

use crate::compress::{
    compress_companies, compress_industries, DEFAULT_MAX_COMPANIES_PER_GROUP,
    DEFAULT_MAX_COMPANY_GROUPS, DEFAULT_MAX_INDUSTRIES,
};

/// Below this confidence the model is told to hedge.
pub const LOW_CONFIDENCE: f64 = 0.5;

const CORE_RULES: &str = "\
You are Horizonte AI, an assistant for construction planning, renovation and \
EVN electricity connections in North Macedonia and the Balkans.
Rules:
- Reply with valid JSON only. No markdown, no text before or after the JSON.
- Use exactly one of the two formats below: TEXT_RESPONSE or PROJECT_PLAN.
- Never invent companies, prices or materials. Recommend only companies from the list provided.
- Speak for Horizonte only.
- Reply in the user's language (Albanian, Macedonian, English or other).";

const CONSTRUCTION_BLOCK: &str = "\
Construction / renovation context:
- Produce a PROJECT_PLAN with exactly 4 phases. Never fewer.
- Every phase has a duration and a cost range in EUR; every task names its industry, materials, time in weeks and cost range.
- risk_analysis is mandatory. Describe real mistakes as cause, consequence and prevention, each with impact_level HIGH, MEDIUM or LOW.
- Infer missing sizes or budgets from local standards, default location Skopje.
- If critical data is missing and cannot be inferred, use TEXT_RESPONSE with short questions instead.";

const EVN_BLOCK: &str = "\
EVN / electricity connection context (North Macedonia):
- kW is the maximum power the building may draw at the same time.
- Connection prices: 3.6 kW, 7.5 kW and 11 kW = 22.745 denars (about 370 EUR); 17.3 kW = 35.772 denars (about 580 EUR); 24.8 kW = 51.279 denars (about 830 EUR).
- The price covers meter installation, grid connection and activation.
- Procedure: apply at Elektrodistribucija (https://elektrodistribucija.mk), sign the supply contract with EVN (https://snabduvanje.evn.mk), apply about 3 weeks ahead; new buildings need technical approval or a building permit.
- Contact: 0800 40 100, info@evn.mk
- Use TEXT_RESPONSE.";

const GREETING_BLOCK: &str = "\
Greeting / general question:
- Greet briefly and say what you can help with: construction plans, renovation, costs, EVN connections.
- Use TEXT_RESPONSE.";

const OUT_OF_SCOPE_BLOCK: &str = "\
Out of scope:
- Politely say you can only help with construction, renovation and electricity connections.
- Use TEXT_RESPONSE.";

const OUTPUT_FORMATS: &str = r#"Output formats:
TEXT_RESPONSE:
{ "text_response": "..." }

PROJECT_PLAN:
{
  "project": { "title": "...", "type": "RENOVATION | CONSTRUCTION", "location": "...", "total_estimated_cost": "...", "total_estimated_time_months": 0 },
  "phases": [ { "id": 1, "name": "...", "duration_months": 1, "cost_range_eur": "1000-2000" } ],
  "tasks": [ { "phase_id": 1, "task": "...", "industry": "...", "materials": ["..."], "time_weeks": 2, "cost_range_eur": "500-1000", "recommended_companies": ["..."] } ],
  "materials_summary": [ { "material": "...", "estimated_quantity": "...", "estimated_cost_eur": "..." } ],
  "risk_analysis": [ { "type": "...", "description": "...", "impact_level": "HIGH | MEDIUM | LOW" } ],
  "budget_tips": ["..."],
  "recommended_companies": ["..."]
}
No extra fields."#;

/// The two messages sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

fn intent_block(intent: Intent) -> &'static str {
    match intent {
        Intent::ConstructionPlan => CONSTRUCTION_BLOCK,
        Intent::EvnInfo => EVN_BLOCK,
        Intent::Greeting => GREETING_BLOCK,
        Intent::OutOfScope => OUT_OF_SCOPE_BLOCK,
    }
}

fn strategy_block(decision: &RouteDecision) -> Option<String> {
    let names = decision
        .intents()
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    match decision.strategy {
        Strategy::Single => None,
        Strategy::Composite => Some(format!(
            "The request covers several topics ({names}). Address all of them in one answer."
        )),
        Strategy::Clarify => Some(format!(
            "The request is unclear. Candidate topics: {names}.\n\
             Do not build a plan. Answer with a TEXT_RESPONSE containing one or two short questions \
             that tell these topics apart."
        )),
    }
}

/// Build the system/user pair for a routed prompt.
pub fn build_prompt(decision: &RouteDecision, user_prompt: &str, catalog: &Catalog) -> PromptPair {
    let mut blocks: Vec<String> = vec![CORE_RULES.to_string()];

    blocks.extend(decision.intents().into_iter().map(|i| intent_block(i).to_string()));
    blocks.extend(strategy_block(decision));

    if decision.confidence < LOW_CONFIDENCE {
        blocks.push(
            "Routing confidence is low. Avoid committal language and state your assumptions."
                .to_string(),
        );
    }

    blocks.push(OUTPUT_FORMATS.to_string());

    let industries = compress_industries(&catalog.industries, DEFAULT_MAX_INDUSTRIES);
    if !industries.is_empty() {
        blocks.push(format!("Industries:\n{industries}"));
    }
    let companies = compress_companies(
        &catalog.companies,
        DEFAULT_MAX_COMPANY_GROUPS,
        DEFAULT_MAX_COMPANIES_PER_GROUP,
    );
    if !companies.is_empty() {
        blocks.push(format!("Companies:\n{companies}"));
    }

    PromptPair {
        system: blocks.join("\n\n"),
        user: user_prompt.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizonte_catalog::{Company, Industry};
    use horizonte_core::route;

    #[test]
    fn test_single_construction_prompt() {
        let d = route("ndertim shtepi me themele beton faza kosto");
        let p = build_prompt(&d, "  ndertim shtepi  ", &Catalog::default());
        assert!(p.system.starts_with("You are Horizonte AI"));
        assert!(p.system.contains("exactly 4 phases"));
        assert!(!p.system.contains("EVN / electricity"));
        assert!(!p.system.contains("Routing confidence is low"));
        assert!(!p.system.contains("Industries:"));
        assert_eq!(p.user, "ndertim shtepi");
    }

    #[test]
    fn test_composite_prompt_has_both_blocks() {
        let d = route("ndertim shtepi faza evn kycje kw");
        assert_eq!(d.strategy, Strategy::Composite);
        let p = build_prompt(&d, "x", &Catalog::default());
        assert!(p.system.contains("exactly 4 phases"));
        assert!(p.system.contains("22.745 denars"));
        assert!(p.system.contains("(EVN_INFO, CONSTRUCTION_PLAN)"));
        // confidence 0.513
        assert!(!p.system.contains("Routing confidence is low"));
    }

    #[test]
    fn test_clarify_prompt_names_candidates_and_hedges() {
        let d = route("ndertim evn");
        assert_eq!(d.strategy, Strategy::Clarify);
        let p = build_prompt(&d, "ndertim evn", &Catalog::default());
        assert!(p.system.contains("Candidate topics: EVN_INFO"));
        assert!(p.system.contains("short questions"));
        assert!(p.system.contains("Routing confidence is low"));
    }

    #[test]
    fn test_catalog_lists_appended() {
        let d = route("Hello");
        let catalog = Catalog {
            industries: vec![Industry::new("Ndertim")],
            companies: vec![Company::new("Beton Sh.p.k", Some("Ndertim"))],
        };
        let p = build_prompt(&d, "Hello", &catalog);
        assert!(p.system.contains("Greeting / general question"));
        assert!(p.system.ends_with("Industries:\nNdertim\n\nCompanies:\nNdertim: Beton Sh.p.k"));
    }

    #[test]
    fn test_company_services_reach_system_prompt() {
        let d = route("dua te ndertoj nje shtepi");
        let catalog = Catalog {
            industries: vec![Industry::new("Ndertim")],
            companies: vec![Company::new("Beton Sh.p.k", Some("Ndertim")).with_services(&["Themele", "Fasada"])],
        };
        let p = build_prompt(&d, "dua te ndertoj nje shtepi", &catalog);
        assert!(p.system.contains("Themele"));
        assert!(p.system.ends_with("Companies:\nNdertim: Beton Sh.p.k (Themele, Fasada)"));
    }
}
