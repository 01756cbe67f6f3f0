use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use horizonte_core::{Router, RouterConfig, SignalTable};

use crate::state::ensure_horizonte_home;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Mistral,
    OpenAI,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Mistral => "https://api.mistral.ai",
            Provider::OpenAI => "https://api.openai.com",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Mistral => "mistral-large-latest",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    /// Environment variable checked before auth.json.
    pub fn key_env(self) -> &'static str {
        match self {
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub chat: ChatSection,
    pub router: RouterSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Omitted from requests when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmSection {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            temperature: 0.4,
            timeout_secs: 60,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    pub stream: bool,
    pub max_turns_context: usize,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self { stream: true, max_turns_context: 12 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSection {
    /// JSON signal table replacing the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<PathBuf>,
    #[serde(flatten)]
    pub thresholds: RouterConfig,
}

impl Config {
    /// Router from the `[router]` section.
    pub fn build_router(&self) -> Result<Router> {
        let table = match &self.router.profiles {
            Some(p) => {
                let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
                let table = SignalTable::from_json(&s).with_context(|| format!("parsing {}", p.display()))?;
                info!(path = %p.display(), profiles = table.len(), "loaded signal table");
                table
            }
            None => SignalTable::builtin().clone(),
        };
        Router::new(self.router.thresholds.clone(), table).context("invalid [router] config")
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_horizonte_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        debug!(path = %p.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    println!("# {}{}", p.display(), if p.exists() { "" } else { " (not found, defaults)" });
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
