use tokio::sync::mpsc;
use tracing::debug;

use crate::llm::{self, ChatTurn, LlmConfig};
use crate::llm_stream::{self, StreamEvent};

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub request_id: u64,
    pub system: String,
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Started { request_id: u64 },
    Delta { request_id: u64, text: String },
    Completed { request_id: u64 },
    Error { request_id: u64, message: String },
}

/// Serves requests one at a time; a new request aborts the one in flight.
pub async fn run_worker(
    cfg: LlmConfig,
    stream: bool,
    mut rx: mpsc::UnboundedReceiver<ChatRequest>,
    tx: std::sync::mpsc::Sender<ChatEvent>,
) {
    let mut current: Option<tokio::task::JoinHandle<()>> = None;

    while let Some(req) = rx.recv().await {
        if let Some(h) = current.take() {
            debug!(request_id = req.request_id, "aborting in-flight request");
            h.abort();
        }

        let tx2 = tx.clone();
        let cfg = cfg.clone();
        current = Some(tokio::spawn(async move {
            let id = req.request_id;

            let res = if stream {
                llm_stream::stream_chat(&cfg, &req.system, &req.turns, |ev| {
                    let out = match ev {
                        StreamEvent::Started => ChatEvent::Started { request_id: id },
                        StreamEvent::Delta(text) => ChatEvent::Delta { request_id: id, text },
                        StreamEvent::Completed => ChatEvent::Completed { request_id: id },
                    };
                    let _ = tx2.send(out);
                })
                .await
            } else {
                let _ = tx2.send(ChatEvent::Started { request_id: id });
                llm::chat_complete_async(&cfg, &req.system, &req.turns)
                    .await
                    .map(|text| {
                        let _ = tx2.send(ChatEvent::Delta { request_id: id, text });
                        let _ = tx2.send(ChatEvent::Completed { request_id: id });
                    })
            };

            if let Err(e) = res {
                let _ = tx2.send(ChatEvent::Error {
                    request_id: id,
                    message: format!("LLM error: {e:#}"),
                });
            }
        }));
    }
}
