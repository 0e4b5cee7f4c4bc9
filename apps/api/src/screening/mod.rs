// Screening: the end-to-end pipeline plus its outer edges (external scorer,
// LLM-backed parsing, HTTP handlers).
// All LLM calls go through llm_client; everything it returns is re-validated here.

pub mod external;
pub mod handlers;
pub mod parsing;
pub mod pipeline;
pub mod prompts;
