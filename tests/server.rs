use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use news_imagery::http::{router, routes::MAX_BATCH_SIZE, AppState};
use news_imagery::image::{cors::CorsPolicy, mock::MockProber, ImageResolver, ProxyUrlCache};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn server(reachable: &[&str]) -> TestServer {
    let resolver = ImageResolver::new(
        Arc::new(MockProber::new(reachable.iter().copied())),
        CorsPolicy::default(),
        ProxyUrlCache::new(),
    );

    TestServer::new(router(AppState::new(resolver, 4))).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = server(&[]).get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_resolve_proxied_article() {
    let proxied = "http://127.0.0.1:8000/proxy/image?url=https%3A%2F%2Fstatic01.nyt.com%2Fimg.jpg";
    let response = server(&[proxied])
        .post("/resolve")
        .json(&json!({"urlToImage": "https://static01.nyt.com/img.jpg", "id": "a1"}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"url": proxied, "source": "proxied"})
    );
}

#[tokio::test]
async fn test_resolve_with_previous_url() {
    let response = server(&["https://cdn.test/enhanced.jpg"])
        .post("/resolve")
        .add_query_param("previous", "https://cdn.test/enhanced.jpg")
        .json(&json!({"urlToImage": "https://cdn.test/raw.jpg"}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"url": "https://cdn.test/enhanced.jpg", "source": "original"})
    );
}

#[tokio::test]
async fn test_resolve_batch() {
    let response = server(&["https://example.com/ok.jpg"])
        .post("/resolve/batch")
        .json(&json!([
            {"urlToImage": "https://example.com/ok.jpg"},
            {"urlToImage": "null", "image": "", "category": "science", "id": "a2"}
        ]))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!([
            {"url": "https://example.com/ok.jpg", "source": "original"},
            {"url": "https://picsum.photos/400/250?random=a2", "source": "placeholder"}
        ])
    );
}

#[tokio::test]
async fn test_resolve_batch_limit() {
    let articles: Vec<Value> = (0..=MAX_BATCH_SIZE)
        .map(|i| json!({"id": format!("x{i}")}))
        .collect();

    let response = server(&[])
        .post("/resolve/batch")
        .json(&articles)
        .expect_failure()
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("exceeds the limit"));
}

#[tokio::test]
async fn test_malformed_fields_still_resolve() {
    let server = server(&["https://b.test/2.jpg"]);

    let response = server
        .post("/resolve")
        .json(&json!({"urlToImage": 42, "image": "https://b.test/2.jpg"}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"url": "https://b.test/2.jpg", "source": "original"})
    );

    let response = server
        .post("/resolve")
        .json(&json!({"urlToImage": ["x"], "id": 17, "category": {"name": "tech"}}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"url": "https://picsum.photos/400/250?random=17", "source": "placeholder"})
    );
}

#[tokio::test]
async fn test_id_and_underscore_id_in_one_record() {
    let server = server(&[]);

    let response = server
        .post("/resolve")
        .json(&json!({"id": "x", "_id": "y", "urlToImage": null}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["url"],
        "https://picsum.photos/400/250?random=x"
    );

    let response = server.post("/resolve").json(&json!({"_id": "y"})).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["url"],
        "https://picsum.photos/400/250?random=y"
    );
}

#[tokio::test]
async fn test_non_object_body_rejected() {
    let response = server(&[])
        .post("/resolve")
        .json(&json!("not an article"))
        .expect_failure()
        .await;

    assert!(response.status_code().is_client_error());
    assert_eq!(
        response.json::<Value>()["message"],
        "Request body is not a valid article"
    );
}

#[tokio::test]
async fn test_best_guess_does_not_probe() {
    let response = server(&[])
        .post("/best-guess")
        .json(&json!({"urlToImage": "https://static01.nyt.com/img.jpg"}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"url": "https://static01.nyt.com/img.jpg"})
    );
}

#[tokio::test]
async fn test_placeholder_endpoint() {
    let response = server(&[])
        .get("/placeholder")
        .add_query_param("category", "health")
        .add_query_param("seed", "s1")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "url": "https://picsum.photos/400/250?random=s1",
            "color": "be185d",
            "label": "Health"
        })
    );
}
