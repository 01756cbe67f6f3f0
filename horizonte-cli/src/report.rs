use std::fmt::Write;

use horizonte_core::RouteDecision;

/// Human summary of a routing decision.
pub fn format_decision(d: &RouteDecision) -> String {
    let mut out = String::new();
    let secondary = d.secondary.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());

    let _ = writeln!(out, "strategy:   {}", d.strategy);
    let _ = writeln!(out, "primary:    {}", d.primary);
    let _ = writeln!(out, "secondary:  {secondary}");
    let _ = writeln!(out, "confidence: {:.2}", d.confidence);
    let _ = writeln!(out, "reason:     {}", d.reason);

    if !d.scores.is_empty() {
        out.push_str("\nscores:\n");
        for s in &d.scores {
            let _ = writeln!(out, "  {:<18} {:>3}  {}", s.intent.as_str(), s.score, s.hits.join(" "));
        }
    }

    out.trim_end().to_string()
}

/// One-line route tag shown in chat.
pub fn route_tag(d: &RouteDecision) -> String {
    let intents = d
        .intents()
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(" + ");
    format!("{} {intents} ({:.2})", d.strategy, d.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizonte_core::route;

    #[test]
    fn test_format_composite() {
        let out = format_decision(&route("ndertim shtepi faza evn kycje kw"));
        assert!(out.starts_with("strategy:   COMPOSITE\nprimary:    EVN_INFO\nsecondary:  CONSTRUCTION_PLAN\nconfidence: 0.51"));
        assert!(out.contains("\n  EVN_INFO            13  +evn +kw +kycje"));
    }

    #[test]
    fn test_format_empty_input_has_no_scores() {
        let out = format_decision(&route(""));
        assert!(out.contains("secondary:  -"));
        assert!(!out.contains("scores:"));
    }

    #[test]
    fn test_route_tag() {
        assert_eq!(route_tag(&route("Hello")), "SINGLE GREETING (0.90)");
        assert_eq!(
            route_tag(&route("ndertim shtepi faza evn kycje kw")),
            "COMPOSITE EVN_INFO + CONSTRUCTION_PLAN (0.51)"
        );
    }
}
