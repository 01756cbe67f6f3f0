use serde::{Deserialize, Serialize};

/// An industry (trade) companies can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub name: String,
}

impl Industry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A company that can be recommended in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Primary industry; companies without one are grouped under "Other".
    pub industry: Option<String>,
    pub services: Vec<String>,
}

impl Company {
    pub fn new(name: impl Into<String>, industry: Option<&str>) -> Self {
        Self {
            name: name.into(),
            industry: industry.map(|s| s.to_string()),
            services: Vec::new(),
        }
    }

    pub fn with_services(mut self, services: &[&str]) -> Self {
        self.services = services.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Auxiliary domain data handed to prompt construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub industries: Vec<Industry>,
    pub companies: Vec<Company>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty() && self.companies.is_empty()
    }
}
