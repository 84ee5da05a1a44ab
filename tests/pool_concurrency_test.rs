//! Bounded store connections: waiting, timing out and recovering.

mod common;

use std::time::Duration;

use tutorgate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator, PoolConfig, SqliteEmbeddingStore};
use tutorgate::domain::errors::ServiceError;
use tutorgate::domain::ports::EmbeddingStore;

async fn file_store(max_connections: u32, acquire_timeout: Duration) -> (tempfile::TempDir, SqliteEmbeddingStore) {
    let (dir, path) = common::temp_db_path();
    let url = format!("sqlite:{}", path.display());
    let pool = create_pool(
        &url,
        Some(PoolConfig {
            max_connections,
            min_connections: 1,
            acquire_timeout,
        }),
    )
    .await
    .unwrap();
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .unwrap();
    (dir, SqliteEmbeddingStore::new(pool))
}

#[tokio::test]
async fn test_exhausted_pool_times_out_then_recovers() {
    common::setup_test_logging();
    let (_dir, store) = file_store(2, Duration::from_millis(200)).await;

    let first = store.pool().acquire().await.unwrap();
    let second = store.pool().acquire().await.unwrap();

    let err = store.count().await.unwrap_err();
    assert!(matches!(err, ServiceError::PoolTimeout(_)));
    assert!(err.is_transient());

    drop(first);
    drop(second);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_waiter_proceeds_when_connection_is_released() {
    let (_dir, store) = file_store(1, Duration::from_secs(5)).await;

    let held = store.pool().acquire().await.unwrap();
    let waiter = {
        let store = store.clone();
        tokio::spawn(async move { store.ping().await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!waiter.is_finished());
    drop(held);

    waiter.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_concurrent_inserts_share_bounded_pool() {
    let (_dir, store) = file_store(3, Duration::from_secs(5)).await;
    let encoder = common::hashing_encoder();

    let tasks: Vec<_> = (0..12)
        .map(|i| {
            let store = store.clone();
            let encoder = encoder.clone();
            tokio::spawn(async move {
                use tutorgate::domain::ports::TextEncoder;
                let text = format!("passage number {i}");
                let vector = encoder.embed(std::slice::from_ref(&text)).await?.remove(0);
                store
                    .insert(tutorgate::domain::models::NewEmbedding {
                        content: text,
                        embedding: vector,
                        model_name: "BGE-m3".to_string(),
                        source: "load".to_string(),
                        ref_id: Some(i),
                    })
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }
    assert_eq!(store.count().await.unwrap(), 12);
    assert!(store.pool().size() <= 3);
}
