//! Company directory CSV.
//!
//! Expected header:
//!   name,industry,services
//!   Beton Sh.p.k,Ndertim,Themele;Fasada

use anyhow::{Context, Result};
use std::io::Read;

use crate::types::Company;

/// Parse companies from CSV. Services are `;`-separated; rows with a blank
/// name are skipped.
pub fn parse_companies_csv(reader: impl Read) -> Result<Vec<Company>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("read companies csv header")?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let (name_col, industry_col, services_col) = (col("name"), col("industry"), col("services"));
    let name_col = name_col.context("companies csv has no `name` column")?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.context("read companies csv row")?;

        let name = record.get(name_col).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        let industry = industry_col
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let services = services_col
            .and_then(|i| record.get(i))
            .map(|s| {
                s.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        out.push(Company { name: name.to_string(), industry, services });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_companies_csv_basic() {
        let text = "\
name,industry,services
Beton Sh.p.k,Ndertim,Themele; Fasada
Elektro MK,Elektricist,
 ,Ndertim,Skip
Solo
";
        let out = parse_companies_csv(text.as_bytes()).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].services, vec!["Themele", "Fasada"]);
        assert!(out[1].services.is_empty());
        assert_eq!(out[2].name, "Solo");
        assert_eq!(out[2].industry, None);
    }

    #[test]
    fn test_missing_name_column_is_an_error() {
        assert!(parse_companies_csv("title,industry\nx,y\n".as_bytes()).is_err());
    }
}
