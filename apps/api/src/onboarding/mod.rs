// Onboarding: resume extraction, profile synthesis, embedding, and the single commit.

pub mod handlers;
pub mod pipeline;
