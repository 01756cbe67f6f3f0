use horizonte_advisor::{build_prompt, offline_reply, parse_response, AdvisorResponse};
use horizonte_catalog::{parse_companies_json, parse_industries_json, Catalog};
use horizonte_core::{route, Intent, Strategy};
use pretty_assertions::assert_eq;

fn catalog() -> Catalog {
    Catalog {
        industries: parse_industries_json(r#"["Ndertim", {"name": "Elektricist"}]"#).unwrap(),
        companies: parse_companies_json(
            r#"[{"name": "Beton Sh.p.k", "industries": ["Ndertim"], "services": ["Themele", {"name": "Fasada"}]},
                {"name": "Elektro MK", "industryName": "Elektricist"}]"#,
        )
        .unwrap(),
    }
}

#[test]
fn test_evn_question_end_to_end() {
    let prompt = "Sa kushton kyçja e rrymës për 17.3 kW në denarë?";
    let decision = route(prompt);
    assert_eq!(decision.strategy, Strategy::Single);
    assert_eq!(decision.primary, Intent::EvnInfo);

    let pair = build_prompt(&decision, prompt, &catalog());
    assert_eq!(pair.user, prompt);
    assert!(pair.system.contains("35.772 denars"));
    assert!(pair.system.contains("Companies:\nNdertim: Beton Sh.p.k (Themele, Fasada)\nElektricist: Elektro MK"));

    let reply = "```json\n{\"text_response\": \"Per 17.3 kW: 35.772 denare.\"}\n```";
    assert_eq!(
        parse_response(reply),
        AdvisorResponse::Text { text_response: "Per 17.3 kW: 35.772 denare.".into() }
    );
}

#[test]
fn test_greeting_only_never_gets_plan_rules() {
    let decision = route("Hello");
    let pair = build_prompt(&decision, "Hello", &Catalog::default());
    assert!(!pair.system.contains("exactly 4 phases"));
    assert!(!offline_reply(&decision).is_empty());
}

#[test]
fn test_every_strategy_has_an_offline_reply() {
    let prompts = [
        "ndertim shtepi me themele beton faza kosto",
        "ndertim shtepi faza evn kycje kw",
        "evn kycje kw energji ndertim shtepi beton",
        "",
    ];
    for p in prompts {
        let reply = offline_reply(&route(p));
        assert!(!reply.trim().is_empty(), "{p:?}");
    }
}
