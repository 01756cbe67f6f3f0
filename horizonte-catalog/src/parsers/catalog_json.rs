//! JSON catalog exports.
//!
//! Records come straight from the account/industry store, so shapes vary:
//!   ["Elektricist", {"name": "Hidraulik", "icon": "..."}]
//!   [{"name": "Beton Sh.p.k", "industries": [{"name": "Ndertim"}],
//!     "services": [{"name": "Themele"}, "Fasada"]}]

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::types::{Company, Industry};

/// A bare string or an object's `name` field, trimmed and non-empty.
fn name_of(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("name")?.as_str()?,
        _ => return None,
    };
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn parse_array(json: &str, what: &str) -> Result<Vec<Value>> {
    let v: Value = serde_json::from_str(json).with_context(|| format!("parse {what} json"))?;
    match v {
        Value::Array(items) => Ok(items),
        _ => bail!("{what} json must be an array"),
    }
}

/// Parse an industry list. Items without a usable name are skipped.
pub fn parse_industries_json(json: &str) -> Result<Vec<Industry>> {
    let items = parse_array(json, "industries")?;

    Ok(items
        .iter()
        .filter_map(|item| name_of(item).map(|name| Industry { name }))
        .collect())
}

fn industry_of(item: &Value) -> Option<String> {
    ["industry", "industryName"]
        .iter()
        .find_map(|k| item.get(*k).and_then(name_of))
        .or_else(|| {
            item.get("industries")
                .and_then(|v| v.as_array())
                .and_then(|arr| arr.iter().find_map(name_of))
        })
}

/// Parse a company directory. Companies without a name are skipped.
pub fn parse_companies_json(json: &str) -> Result<Vec<Company>> {
    let items = parse_array(json, "companies")?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(name_of)?;
            let services = item
                .get("services")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(name_of).collect())
                .unwrap_or_default();
            Some(Company { name, industry: industry_of(item), services })
        })
        .collect())
}
