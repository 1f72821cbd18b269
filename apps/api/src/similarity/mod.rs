// Similarity search: pairwise scoring, blended ranking, and the HTTP surface.
// The ranker is pure; only `search` touches the profile store.

pub mod handlers;
pub mod ranker;
pub mod scoring;
pub mod search;
