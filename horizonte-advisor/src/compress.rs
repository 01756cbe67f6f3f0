//! Catalog compression: keeps the industry and company lists short enough to
//! ride along in every system prompt.

use horizonte_catalog::{Company, Industry};

pub const DEFAULT_MAX_INDUSTRIES: usize = 60;
pub const DEFAULT_MAX_COMPANY_GROUPS: usize = 18;
pub const DEFAULT_MAX_COMPANIES_PER_GROUP: usize = 12;
pub const MAX_SERVICES_PER_COMPANY: usize = 4;

/// Group label for companies with no industry.
pub const OTHER_GROUP: &str = "Other";

/// First `max` non-blank industry names, comma separated.
pub fn compress_industries(industries: &[Industry], max: usize) -> String {
    industries
        .iter()
        .map(|i| i.name.trim())
        .filter(|n| !n.is_empty())
        .take(max)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Companies grouped by industry, one `"<industry>: a (s1, s2), b"` line per group.
///
/// Groups keep first-seen order. Overflow within a group is dropped, as are
/// groups past `max_groups`. A company lists at most
/// [`MAX_SERVICES_PER_COMPANY`] non-blank services.
pub fn compress_companies(companies: &[Company], max_groups: usize, max_per_group: usize) -> String {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();

    for c in companies {
        let name = c.name.trim();
        if name.is_empty() {
            continue;
        }
        let industry = c
            .industry
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(OTHER_GROUP);

        let idx = match groups.iter().position(|(k, _)| *k == industry) {
            Some(i) => i,
            None => {
                groups.push((industry, Vec::new()));
                groups.len() - 1
            }
        };
        let names = &mut groups[idx].1;
        if names.len() < max_per_group {
            names.push(company_entry(name, &c.services));
        }
    }

    groups
        .iter()
        .take(max_groups)
        .map(|(industry, names)| format!("{industry}: {}", names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn company_entry(name: &str, services: &[String]) -> String {
    let services: Vec<&str> = services
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_SERVICES_PER_COMPANY)
        .collect();
    if services.is_empty() {
        name.to_string()
    } else {
        format!("{name} ({})", services.join(", "))
    }
}
