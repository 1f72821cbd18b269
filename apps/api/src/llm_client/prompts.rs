// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to prompts whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Common grounding rule for every profile prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the provided LinkedIn data and resume text. \
    Do NOT infer, interpolate, or invent roles, dates, organizations, or achievements. \
    If the inputs do not support a claim, omit it entirely.";
