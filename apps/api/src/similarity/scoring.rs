use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Blend weights and result size for similarity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub embedding_weight: f64,
    pub interest_weight: f64,
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            embedding_weight: 0.7,
            interest_weight: 0.3,
            top_k: 6,
        }
    }
}

/// dot(a, b) / (|a| * |b|). Zero for empty, zero-norm, or mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
                let av = f64::from(av);
                let bv = f64::from(bv);
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Trimmed, lowercased, deduplicated interests. Blank entries are dropped.
pub fn normalize_interests<S: AsRef<str>>(interests: &[S]) -> HashSet<String> {
    interests
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// |A ∩ B| / |A ∪ B| over normalized interests. Zero when either side is empty.
pub fn jaccard_similarity<S: AsRef<str>, T: AsRef<str>>(a: &[S], b: &[T]) -> f64 {
    let a = normalize_interests(a);
    let b = normalize_interests(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// embedding_weight * embedding + interest_weight * interest
pub fn combined_score(embedding: f64, interest: f64, config: &RankingConfig) -> f64 {
    config.embedding_weight * embedding + config.interest_weight * interest
}
