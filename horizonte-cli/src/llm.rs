//! OpenAI-compatible chat completions (Mistral by default).

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::auth;
use crate::config::{Config, Provider};

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
    pub api_key: String,
}

impl LlmConfig {
    /// `None` when no key is available for the configured provider.
    pub fn resolve(cfg: &Config) -> Result<Option<Self>> {
        let provider = cfg.llm.provider;
        let Some(api_key) = auth::api_key(provider)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            provider,
            model: cfg.llm.model.clone(),
            base_url: cfg.llm.base_url.clone(),
            temperature: cfg.llm.temperature,
            timeout: Duration::from_secs(cfg.llm.timeout_secs.max(1)),
            max_tokens: cfg.llm.max_tokens,
            api_key,
        }))
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", self.api_key))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

#[derive(Serialize)]
pub(crate) struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

impl<'a> CompletionRequest<'a> {
    pub(crate) fn new(cfg: &'a LlmConfig, system: &str, turns: &[ChatTurn], stream: bool) -> Self {
        let messages = std::iter::once(ChatTurn { role: "system".to_string(), content: system.to_string() })
            .chain(turns.iter().cloned())
            .collect();
        Self {
            model: &cfg.model,
            messages,
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            stream,
        }
    }
}

pub(crate) fn client(cfg: &LlmConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.timeout)
        .build()
        .context("build http client")
}

pub async fn chat_complete_async(cfg: &LlmConfig, system: &str, turns: &[ChatTurn]) -> Result<String> {
    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let body = CompletionRequest::new(cfg, system, turns, false);
    info!(provider = ?cfg.provider, model = %cfg.model, "chat completion request");

    let resp = client(cfg)?
        .post(cfg.endpoint())
        .headers(cfg.headers()?)
        .json(&body)
        .send()
        .await
        .context("chat completion request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("chat completion error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse chat completion response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();
    if content.trim().is_empty() {
        warn!("chat completion returned no content");
    }

    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmConfig {
        LlmConfig {
            provider: Provider::Mistral,
            model: "mistral-large-latest".into(),
            base_url: "https://api.mistral.ai/".into(),
            temperature: 0.4,
            timeout: Duration::from_secs(60),
            max_tokens: None,
            api_key: "k".into(),
        }
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(cfg().endpoint(), "https://api.mistral.ai/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let c = cfg();
        let body = CompletionRequest::new(&c, "sys", &[ChatTurn::user("hi")], true);
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "mistral-large-latest");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "hi");
        assert_eq!(v["stream"], true);
        assert!(v.get("max_tokens").is_none());
    }
}
