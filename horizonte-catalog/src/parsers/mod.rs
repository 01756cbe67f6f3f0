pub mod catalog_json;
pub mod companies_csv;

pub use catalog_json::{parse_companies_json, parse_industries_json};
pub use companies_csv::parse_companies_csv;
