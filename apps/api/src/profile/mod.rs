// Profile Synthesizer: narrative summary and structured profile from the same inputs.
// All LLM calls go through llm_client.

pub mod prompts;
pub mod synthesizer;
