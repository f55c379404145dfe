//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgPool};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::delete_request::DeleteRequest;
use crate::domain::entities::UserUrl;
use crate::domain::repositories::{AddOutcome, ListOutcome, SearchOutcome, UrlRepository};
use crate::error::StorageError;
use crate::utils::db_error::{LIVE_URL_CONSTRAINT, is_unique_violation_on};
use crate::utils::short_url::format_short_url;

/// PostgreSQL repository backed by the `storage` table.
///
/// Short codes come from the table's identity column. Duplicate live URLs are
/// rejected by the `storage_full_url_live_key` partial unique index; the
/// losing insert looks up the existing code. Tombstones are the `actual`
/// column set to `false`.
///
/// If the initial connection failed the repository is still constructed:
/// `ping` reports the recorded error and every other operation fails with it.
pub struct PgUrlRepository {
    base_url: String,
    pool: Result<Arc<PgPool>, String>,
}

impl PgUrlRepository {
    /// Creates a repository over an established pool.
    pub fn new(pool: Arc<PgPool>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pool: Ok(pool),
        }
    }

    /// Connects to `dsn`, remembering the failure instead of returning it.
    pub async fn connect(dsn: &str, options: PgPoolOptions, base_url: impl Into<String>) -> Self {
        let pool = match options.connect(dsn).await {
            Ok(pool) => {
                debug!("Connected to database");
                Ok(Arc::new(pool))
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to database");
                Err(e.to_string())
            }
        };

        Self {
            base_url: base_url.into(),
            pool,
        }
    }

    fn pool(&self) -> Result<&PgPool, StorageError> {
        match &self.pool {
            Ok(pool) => Ok(pool.as_ref()),
            Err(e) => Err(StorageError::unavailable(e.clone())),
        }
    }

    async fn find_live_code_by_url(&self, url: &str) -> Result<Option<i64>, StorageError> {
        let code = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM storage
            WHERE full_url = $1 AND actual
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool()?)
        .await?;

        Ok(code)
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn add_url(&self, url: &str, user_id: &str) -> Result<AddOutcome, StorageError> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO storage (full_url, user_id, actual)
            VALUES ($1, $2, TRUE)
            RETURNING id
            "#,
        )
        .bind(url)
        .bind(user_id)
        .fetch_one(self.pool()?)
        .await;

        match inserted {
            Ok(code) => {
                let reference = format_short_url(&self.base_url, code);
                debug!(url, %reference, "URL stored in database");
                Ok(AddOutcome::Created(reference))
            }
            Err(e) if is_unique_violation_on(&e, LIVE_URL_CONSTRAINT) => {
                let code = self
                    .find_live_code_by_url(url)
                    .await?
                    .ok_or(StorageError::Database(e))?;
                Ok(AddOutcome::Conflict(format_short_url(&self.base_url, code)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn search_url(&self, code: i64) -> Result<SearchOutcome, StorageError> {
        let row = sqlx::query_as::<_, (String, bool)>(
            r#"
            SELECT full_url, actual
            FROM storage
            WHERE id = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool()?)
        .await?;

        Ok(match row {
            None => SearchOutcome::NotFound,
            Some((url, true)) => SearchOutcome::Found(url),
            Some((url, false)) => SearchOutcome::Gone(url),
        })
    }

    async fn get_all_urls_for_user(&self, user_id: &str) -> Result<ListOutcome, StorageError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, full_url
            FROM storage
            WHERE user_id = $1 AND actual
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;

        Ok(ListOutcome::from_urls(
            rows.into_iter()
                .map(|(code, url)| UserUrl::new(format_short_url(&self.base_url, code), url))
                .collect(),
        ))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.pool()?.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn delete_batch(&self, batch: Vec<DeleteRequest>) -> Result<u64, StorageError> {
        let (users, codes): (Vec<String>, Vec<i64>) = batch
            .into_iter()
            .flat_map(|request| {
                let user_id = request.user_id;
                request
                    .codes
                    .into_iter()
                    .map(move |code| (user_id.clone(), code))
            })
            .unzip();

        if codes.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE storage AS s
            SET actual = FALSE
            FROM UNNEST($1::text[], $2::bigint[]) AS d(user_id, id)
            WHERE s.id = d.id
              AND s.user_id = d.user_id
              AND s.actual
            "#,
        )
        .bind(users)
        .bind(codes)
        .execute(self.pool()?)
        .await?;

        Ok(result.rows_affected())
    }
}
