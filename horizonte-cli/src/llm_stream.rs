use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use serde_json::Value;
use tracing::{debug, info};

use crate::llm::{client, ChatTurn, CompletionRequest, LlmConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Started,
    Delta(String),
    Completed,
}

/// One upstream SSE line, classified.
#[derive(Debug, PartialEq)]
enum SseLine {
    Skip,
    Done,
    Delta(String),
}

fn parse_sse_line(line: &str) -> Result<SseLine> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let v: Value = serde_json::from_str(data).context("parse SSE json")?;
    // choices[0].delta.content
    let content = v
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c0| c0.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default();

    Ok(if content.is_empty() { SseLine::Skip } else { SseLine::Delta(content.to_string()) })
}

/// Splits a byte stream into complete lines.
#[derive(Default)]
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// Stream a completion, reporting deltas through `on_event`. Emits exactly one
/// `Completed` on success; failures are returned as errors.
pub async fn stream_chat(
    cfg: &LlmConfig,
    system: &str,
    turns: &[ChatTurn],
    mut on_event: impl FnMut(StreamEvent) + Send,
) -> Result<()> {
    on_event(StreamEvent::Started);

    let body = CompletionRequest::new(cfg, system, turns, true);
    info!(provider = ?cfg.provider, model = %cfg.model, "streaming chat request");

    let resp = client(cfg)?
        .post(cfg.endpoint())
        .headers(cfg.headers()?)
        .json(&body)
        .send()
        .await
        .context("streaming chat request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("streaming chat error: {status} {txt}");
    }

    let mut stream = resp.bytes_stream();
    let mut lines = LineBuffer::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("stream chunk")?;
        for line in lines.push(chunk.as_ref()) {
            match parse_sse_line(&line)? {
                SseLine::Skip => {}
                SseLine::Delta(text) => on_event(StreamEvent::Delta(text)),
                SseLine::Done => {
                    on_event(StreamEvent::Completed);
                    return Ok(());
                }
            }
        }
    }

    debug!("stream ended without [DONE]");
    on_event(StreamEvent::Completed);
    Ok(())
}
