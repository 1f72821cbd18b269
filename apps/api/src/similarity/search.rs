//! `find_similar`: loads the query user and a candidate snapshot, then ranks.

use serde::Serialize;
use tracing::info;

use crate::errors::{AppError, IneligibleReason, PipelineError};
use crate::similarity::ranker::{rank_candidates, SimilarityQuery, SimilarityResult};
use crate::similarity::scoring::RankingConfig;
use crate::store::ProfileStore;

#[derive(Debug, Clone, Serialize)]
pub struct QueryUserSummary {
    pub idfv: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindSimilarResponse {
    pub query_user: QueryUserSummary,
    pub ranked_candidates: Vec<SimilarityResult>,
    pub total_eligible: usize,
}

pub async fn find_similar(
    store: &dyn ProfileStore,
    config: &RankingConfig,
    idfv: &str,
) -> Result<FindSimilarResponse, AppError> {
    let user = store
        .get_by_idfv(idfv)
        .await?
        .ok_or_else(|| PipelineError::IneligibleQueryUser {
            idfv: idfv.to_string(),
            reason: IneligibleReason::NotFound,
        })?;
    let query = SimilarityQuery::from_user(&user)?;

    // Snapshot: writes landing after this read are not observed by this request.
    let pool = store.list_eligible_candidates().await?;
    let ranking = rank_candidates(&query, &pool, config);

    info!(
        "Ranked {} eligible candidates for {idfv}, returning {}",
        ranking.total_eligible,
        ranking.results.len()
    );

    Ok(FindSimilarResponse {
        query_user: QueryUserSummary {
            idfv: user.idfv.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            interests: query.interests.to_vec(),
        },
        ranked_candidates: ranking.results,
        total_eligible: ranking.total_eligible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{processed_user, InMemoryProfileStore};

    #[tokio::test]
    async fn test_find_similar_ranks_and_reports_total() {
        let store = InMemoryProfileStore::with_users(vec![
            processed_user("me", vec![1.0, 0.0], &["ai", "startups"]),
            processed_user("a", vec![1.0, 0.0], &["ai"]),
            processed_user("b", vec![0.0, 1.0], &["ai", "startups"]),
        ]);

        let response = find_similar(&store, &RankingConfig::default(), "me")
            .await
            .unwrap();

        assert_eq!(response.total_eligible, 2);
        assert_eq!(response.query_user.idfv, "me");
        let order: Vec<_> = response
            .ranked_candidates
            .iter()
            .map(|r| r.idfv.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unknown_query_user_is_ineligible() {
        let store = InMemoryProfileStore::default();
        let err = find_similar(&store, &RankingConfig::default(), "ghost")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Pipeline(PipelineError::IneligibleQueryUser {
                reason: IneligibleReason::NotFound,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unprocessed_query_user_is_ineligible() {
        let store = InMemoryProfileStore::default();
        store.create("fresh").await.unwrap();
        let err = find_similar(&store, &RankingConfig::default(), "fresh")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Pipeline(PipelineError::IneligibleQueryUser { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_candidates_yields_empty_ranking() {
        let store =
            InMemoryProfileStore::with_users(vec![processed_user("me", vec![1.0], &["ai"])]);
        let response = find_similar(&store, &RankingConfig::default(), "me")
            .await
            .unwrap();
        assert!(response.ranked_candidates.is_empty());
        assert_eq!(response.total_eligible, 0);
    }
}
