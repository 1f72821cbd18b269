//! Profile Store — persistence of users keyed by device identifier (IDFV).
//!
//! The pipeline only talks to `ProfileStore`; `PgProfileStore` is the Postgres backend.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{ProfileEnrichment, UserProfile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_by_idfv(&self, idfv: &str) -> Result<Option<UserProfile>, AppError>;

    /// Creates a bare user. Returns the existing row and `false` if the IDFV is known.
    async fn create(&self, idfv: &str) -> Result<(UserProfile, bool), AppError>;

    /// Users with both an embedding and interests, ordered by IDFV.
    async fn list_eligible_candidates(&self) -> Result<Vec<UserProfile>, AppError>;

    /// Writes every derived field and `processed = true` in one statement.
    /// Returns `None` when no unprocessed user with this IDFV exists.
    async fn apply_enrichment(
        &self,
        idfv: &str,
        enrichment: &ProfileEnrichment,
    ) -> Result<Option<UserProfile>, AppError>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_by_idfv(&self, idfv: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(
            sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE idfv = $1")
                .bind(idfv)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create(&self, idfv: &str) -> Result<(UserProfile, bool), AppError> {
        let inserted = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (idfv)
            VALUES ($1)
            ON CONFLICT (idfv) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(idfv)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = inserted {
            info!("Created user {idfv}");
            return Ok((user, true));
        }

        let existing = self
            .get_by_idfv(idfv)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {idfv} vanished during create")))?;
        Ok((existing, false))
    }

    async fn list_eligible_candidates(&self) -> Result<Vec<UserProfile>, AppError> {
        Ok(sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT *
            FROM users
            WHERE embedding IS NOT NULL AND interests IS NOT NULL
            ORDER BY idfv
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn apply_enrichment(
        &self,
        idfv: &str,
        enrichment: &ProfileEnrichment,
    ) -> Result<Option<UserProfile>, AppError> {
        // Single UPDATE: derived fields and the processed flag land together or not at all.
        let updated = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users SET
                first_name = $2,
                last_name = $3,
                headline = $4,
                interests = $5,
                bullet_points = $6,
                short_description = $7,
                long_description = $8,
                work_history = $9,
                embedding = $10,
                processed = TRUE,
                updated_at = NOW()
            WHERE idfv = $1 AND processed = FALSE
            RETURNING *
            "#,
        )
        .bind(idfv)
        .bind(&enrichment.first_name)
        .bind(&enrichment.last_name)
        .bind(&enrichment.headline)
        .bind(&enrichment.interests)
        .bind(&enrichment.bullet_points)
        .bind(&enrichment.short_description)
        .bind(&enrichment.long_description)
        .bind(Json(enrichment.work_history.clone()))
        .bind(&enrichment.embedding)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            info!("Committed enrichment for user {idfv}");
        }
        Ok(updated)
    }
}
