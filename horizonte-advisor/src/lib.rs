//! horizonte-advisor: turns a routing decision into generator messages, and
//! the generator's JSON back into typed answers.

pub mod compress;
pub mod offline;
pub mod prompt;
pub mod render;
pub mod response;

pub use compress::{compress_companies, compress_industries};
pub use offline::offline_reply;
pub use prompt::{build_prompt, PromptPair};
pub use render::render_plain;
pub use response::{parse_response, AdvisorResponse, ProjectPlan};
