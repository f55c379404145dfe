#![allow(dead_code)]

use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use url_shortener_core::domain::delete_worker::DeletePipeline;
use url_shortener_core::domain::repositories::UrlRepository;
use url_shortener_core::infrastructure::persistence::{
    FileUrlRepository, MemoryUrlRepository, PgUrlRepository,
};

pub const BASE_URL: &str = "http://localhost:8080/";

pub const ALICE: &str = "8c1d3a8e-0b6e-4d0a-9a57-6f0c7b2f0a11";
pub const BOB: &str = "2f4b9e61-7d3c-4f58-b1a2-93e5d0c4a722";

pub fn short_url(code: i64) -> String {
    format!("{BASE_URL}{code}")
}

pub fn memory_repository() -> Arc<MemoryUrlRepository> {
    Arc::new(MemoryUrlRepository::new(BASE_URL))
}

pub async fn file_repository(path: &Path) -> Arc<FileUrlRepository> {
    Arc::new(FileUrlRepository::open(BASE_URL, path).await.unwrap())
}

pub fn pg_repository(pool: PgPool) -> PgUrlRepository {
    PgUrlRepository::new(Arc::new(pool), BASE_URL)
}

pub async fn insert_url(pool: &PgPool, url: &str, user_id: &str, actual: bool) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO storage (full_url, user_id, actual) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(url)
    .bind(user_id)
    .bind(actual)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn is_actual(pool: &PgPool, code: i64) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT actual FROM storage WHERE id = $1")
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Runs `requests` through a fresh pipeline and waits for the final flush.
pub async fn delete_through_pipeline<R>(
    repository: Arc<R>,
    requests: Vec<(&str, Vec<i64>)>,
    batch_size: usize,
) where
    R: UrlRepository + 'static,
{
    let pipeline = DeletePipeline::spawn(repository, 100, batch_size);
    let queue = pipeline.queue();

    for (user, codes) in requests {
        queue.delete_urls(user, codes).await.unwrap();
    }

    drop(queue);
    pipeline.shutdown().await.unwrap();
}
