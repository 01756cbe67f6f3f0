//! Plain-text rendering of generator answers for terminals.

use std::fmt::Write;

use crate::response::{AdvisorResponse, ProjectPlan};

fn number(v: Option<f64>) -> String {
    match v {
        Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
        Some(n) => format!("{n}"),
        None => "?".to_string(),
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "-" } else { s }
}

fn render_plan(plan: &ProjectPlan) -> String {
    let mut out = String::new();
    let p = &plan.project;

    let _ = writeln!(out, "{} ({}, {})", or_dash(&p.title), or_dash(&p.kind), or_dash(&p.location));
    let _ = writeln!(
        out,
        "Total: {}, {} months",
        or_dash(&p.total_estimated_cost),
        number(p.total_estimated_time_months)
    );

    if !plan.phases.is_empty() {
        let _ = writeln!(out, "\nPhases:");
    }
    for phase in &plan.phases {
        let _ = writeln!(
            out,
            "  {}. {}: {} months, {} EUR",
            number(phase.id),
            or_dash(&phase.name),
            number(phase.duration_months),
            or_dash(&phase.cost_range_eur)
        );
        for t in plan.tasks.iter().filter(|t| t.phase_id == phase.id) {
            let _ = write!(
                out,
                "     - {} ({}, {} weeks, {} EUR)",
                or_dash(&t.task),
                or_dash(&t.industry),
                number(t.time_weeks),
                or_dash(&t.cost_range_eur)
            );
            if !t.recommended_companies.is_empty() {
                let _ = write!(out, " [{}]", t.recommended_companies.join(", "));
            }
            out.push('\n');
        }
    }

    if !plan.materials_summary.is_empty() {
        let _ = writeln!(out, "\nMaterials:");
        for m in &plan.materials_summary {
            let _ = writeln!(
                out,
                "  - {}: {} ({} EUR)",
                or_dash(&m.material),
                or_dash(&m.estimated_quantity),
                or_dash(&m.estimated_cost_eur)
            );
        }
    }

    if !plan.risk_analysis.is_empty() {
        let _ = writeln!(out, "\nRisks:");
        for r in &plan.risk_analysis {
            let _ = writeln!(out, "  [{}] {}: {}", or_dash(&r.impact_level), or_dash(&r.kind), r.description);
        }
    }

    if !plan.budget_tips.is_empty() {
        let _ = writeln!(out, "\nBudget tips:");
        for tip in &plan.budget_tips {
            let _ = writeln!(out, "  - {tip}");
        }
    }

    if !plan.recommended_companies.is_empty() {
        let _ = writeln!(out, "\nRecommended companies: {}", plan.recommended_companies.join(", "));
    }

    out.trim_end().to_string()
}

pub fn render_plain(resp: &AdvisorResponse) -> String {
    match resp {
        AdvisorResponse::Text { text_response } => text_response.trim().to_string(),
        AdvisorResponse::Raw { raw } => raw.clone(),
        AdvisorResponse::ProjectPlan(plan) => render_plan(plan),
    }
}
