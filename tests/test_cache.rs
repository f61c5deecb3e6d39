//! Tests for the shared response cache

use relaycache::cache::ResponseCache;
use relaycache::http::response::{Response, ResponseBuilder, StatusCode};

fn response(body: &str) -> Response {
    ResponseBuilder::new(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .body(body.as_bytes().to_vec())
        .build()
}

#[tokio::test]
async fn test_cache_get_after_set_returns_stored_value() {
    let cache = ResponseCache::new();
    let stored = response("hello");

    cache.set("GET", "/a", stored.clone()).await;

    assert_eq!(cache.get("GET", "/a").await, Some(stored));
}

#[tokio::test]
async fn test_cache_miss_on_empty() {
    let cache = ResponseCache::new();

    assert!(cache.get("GET", "/a").await.is_none());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cache_set_overwrites() {
    let cache = ResponseCache::new();

    cache.set("GET", "/a", response("old")).await;
    cache.set("GET", "/a", response("new")).await;

    assert_eq!(cache.get("GET", "/a").await.unwrap().body, b"new".to_vec());
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_cache_keys_are_literal() {
    let cache = ResponseCache::new();
    cache.set("GET", "/a", response("a")).await;

    assert!(cache.get("POST", "/a").await.is_none());
    assert!(cache.get("get", "/a").await.is_none());
    assert!(cache.get("GET", "/a/").await.is_none());
    assert!(cache.get("GET", "/A").await.is_none());
    assert!(cache.get("GET", "/a?").await.is_none());
}

#[tokio::test]
async fn test_cache_returns_independent_copies() {
    let cache = ResponseCache::new();
    cache.set("GET", "/a", response("hello")).await;

    let mut first = cache.get("GET", "/a").await.unwrap();
    first.body.clear();
    first.headers.insert("X-Mutated".to_string(), "yes".to_string());

    let second = cache.get("GET", "/a").await.unwrap();
    assert_eq!(second.body, b"hello".to_vec());
    assert!(second.header("X-Mutated").is_none());
}

#[tokio::test]
async fn test_cache_clones_share_storage() {
    let cache = ResponseCache::new();
    let other = cache.clone();

    other.set("GET", "/shared", response("x")).await;

    assert!(cache.get("GET", "/shared").await.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cache_concurrent_sets_on_distinct_keys() {
    let cache = ResponseCache::new();

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                for j in 0..16 {
                    let uri = format!("/task/{}/item/{}", i, j);
                    cache.set("GET", &uri, response(&uri)).await;
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(cache.len().await, 64 * 16);
    for i in 0..64 {
        for j in 0..16 {
            let uri = format!("/task/{}/item/{}", i, j);
            let cached = cache.get("GET", &uri).await.unwrap();
            assert_eq!(cached.body, uri.into_bytes());
        }
    }
}
