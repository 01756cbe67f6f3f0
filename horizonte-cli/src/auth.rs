use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Provider;
use crate::state::ensure_horizonte_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthState {
    pub mistral_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl AuthState {
    fn key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Mistral => self.mistral_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
        }
    }
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_horizonte_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn env_key(provider: Provider) -> Option<String> {
    std::env::var(provider.key_env())
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Environment first, then auth.json.
pub fn api_key(provider: Provider) -> Result<Option<String>> {
    if let Some(k) = env_key(provider) {
        return Ok(Some(k));
    }
    Ok(load_auth()?.key(provider).map(|k| k.to_string()))
}

pub fn check_mistral_key(key: &str) -> Result<()> {
    if key.len() < 16 || key.chars().any(char::is_whitespace) {
        bail!("key didn't look like a Mistral API key (expected 16+ characters, no spaces)");
    }
    Ok(())
}

pub fn check_openai_key(key: &str) -> Result<()> {
    if !key.starts_with("sk-") {
        bail!("key didn't look like an OpenAI API key (expected prefix sk-)");
    }
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn mistral_paste_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste Mistral API key")?;
    check_mistral_key(&key)?;
    auth.mistral_api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved Mistral API key to {}", auth_path()?.display());
    Ok(())
}

pub fn openai_paste_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste OpenAI API key (starts with sk-)")?;
    check_openai_key(&key)?;
    auth.openai_api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved OpenAI API key to {}", auth_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_checks() {
        assert!(check_openai_key("sk-abc").is_ok());
        assert!(check_openai_key("abc").is_err());
        assert!(check_mistral_key("0123456789abcdefXYZ").is_ok());
        assert!(check_mistral_key("short").is_err());
        assert!(check_mistral_key("0123456789 abcdefXYZ").is_err());
    }

    #[test]
    fn test_auth_state_picks_provider_key() {
        let auth: AuthState = serde_json::from_str(r#"{"mistral_api_key": "m-key"}"#).unwrap();
        assert_eq!(auth.key(Provider::Mistral), Some("m-key"));
        assert_eq!(auth.key(Provider::OpenAI), None);
    }
}
