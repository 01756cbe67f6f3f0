//! Server-sent-event framing for `ask --sse`.

use serde_json::json;

pub const DONE: &str = "data: [DONE]\n\n";

pub fn chunk_frame(text: &str) -> String {
    format!("data: {}\n\n", json!({ "chunk": text }))
}

pub fn error_frame(message: &str) -> String {
    format!("data: {}\n\n", json!({ "error": message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames() {
        assert_eq!(chunk_frame("Tung \"ti\"\n"), "data: {\"chunk\":\"Tung \\\"ti\\\"\\n\"}\n\n");
        assert_eq!(error_frame("Stream error"), "data: {\"error\":\"Stream error\"}\n\n");
        assert_eq!(DONE, "data: [DONE]\n\n");
    }
}
