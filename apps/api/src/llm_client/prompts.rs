// Shared prompt fragments. Each feature keeps its own prompt templates
// alongside it; this file holds the cross-cutting pieces.

/// Appended to every extraction prompt so the model never fills gaps.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    Only extract what the text states. Do NOT infer, interpolate, or invent details. \
    Use an empty string or empty list when a value is absent.";
