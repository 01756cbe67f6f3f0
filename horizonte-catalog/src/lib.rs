//! horizonte-catalog: industry and company data for prompt construction.

pub mod parsers;
pub mod types;

pub use parsers::{parse_companies_csv, parse_companies_json, parse_industries_json};
pub use types::{Catalog, Company, Industry};

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Load industries from a `.json` file.
pub fn load_industries(path: &Path) -> Result<Vec<Industry>> {
    match extension(path).as_str() {
        "json" => {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            parse_industries_json(&s).with_context(|| format!("parsing {}", path.display()))
        }
        other => bail!("unsupported industries file type `{other}`: {}", path.display()),
    }
}

/// Load companies from a `.json` or `.csv` file.
pub fn load_companies(path: &Path) -> Result<Vec<Company>> {
    match extension(path).as_str() {
        "json" => {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            parse_companies_json(&s).with_context(|| format!("parsing {}", path.display()))
        }
        "csv" => {
            let f = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
            parse_companies_csv(f).with_context(|| format!("parsing {}", path.display()))
        }
        other => bail!("unsupported companies file type `{other}`: {}", path.display()),
    }
}

/// Load whichever parts of the catalog are given.
pub fn load_catalog(industries: Option<&Path>, companies: Option<&Path>) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    if let Some(p) = industries {
        catalog.industries = load_industries(p)?;
    }
    if let Some(p) = companies {
        catalog.companies = load_companies(p)?;
    }
    debug!(
        industries = catalog.industries.len(),
        companies = catalog.companies.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_catalog_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let ind = dir.path().join("industries.json");
        fs::write(&ind, r#"["Ndertim", "Elektricist"]"#).unwrap();

        let comp = dir.path().join("companies.CSV");
        let mut f = fs::File::create(&comp).unwrap();
        writeln!(f, "name,industry,services\nBeton Sh.p.k,Ndertim,Themele").unwrap();

        let cat = load_catalog(Some(ind.as_path()), Some(comp.as_path())).unwrap();
        assert_eq!(cat.industries.len(), 2);
        assert_eq!(cat.companies[0].name, "Beton Sh.p.k");
    }

    #[test]
    fn test_load_catalog_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("companies.xlsx");
        fs::write(&p, "x").unwrap();
        assert!(load_companies(&p).is_err());
        assert!(load_catalog(None, None).unwrap().is_empty());
    }
}
