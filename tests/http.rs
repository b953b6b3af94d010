use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use minilink::{handlers::shorten::ShortenResponse, AppConfig, AppState, MappingStore};
use tower::ServiceExt;

fn app(store: &MappingStore) -> Router {
    let config = AppConfig::from_vars(|key| match key {
        "BASE_URL" => Some("https://go.example.com".into()),
        "REQUEST_TIMEOUT_MS" => Some("1000".into()),
        _ => None,
    })
    .unwrap();

    minilink::router(Arc::new(AppState {
        config,
        shortener: store.shortener(),
    }))
}

fn shorten_request(body: &str) -> Request<Body> {
    Request::post("/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn shorten_then_redirect() {
    let store = MappingStore::builder().spawn();
    let app = app(&store);

    let res = app
        .clone()
        .oneshot(shorten_request(r#"{"url":"http://www.abc.org"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let created: ShortenResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        created.short_url,
        format!("https://go.example.com/{}", created.code)
    );

    let res = app
        .oneshot(
            Request::get(format!("/{}", created.code))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(res.headers()[header::LOCATION], "http://www.abc.org");

    store.stop().await;
}

#[tokio::test]
async fn empty_url_is_bad_request() {
    let store = MappingStore::builder().spawn();

    for body in [r#"{"url":""}"#, "{}"] {
        let res = app(&store).oneshot(shorten_request(body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "original missing");
    }

    store.stop().await;
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let store = MappingStore::builder().spawn();

    let res = app(&store)
        .oneshot(Request::get("/UNKNOWN").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    store.stop().await;
}

#[tokio::test]
async fn stopped_store_is_unavailable() {
    let store = MappingStore::builder().spawn();
    let app = app(&store);
    store.stop().await;

    let res = app
        .oneshot(Request::get("/ABCDEF").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_is_ok() {
    let store = MappingStore::builder().spawn();

    let res = app(&store)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    store.stop().await;
}

#[tokio::test]
async fn url_unusable_as_location_is_rejected() {
    let store = MappingStore::builder().spawn();

    let res = app(&store)
        .oneshot(shorten_request(r#"{"url":"http://a.example/\nx"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        store
            .shortener()
            .count(&minilink::RequestScope::background())
            .await
            .unwrap(),
        0
    );

    store.stop().await;
}

#[tokio::test]
async fn preloaded_bad_url_does_not_crash_redirect() {
    let store = MappingStore::builder()
        .entries([("BADURL", "http://a.example/\nx")])
        .spawn();

    let res = app(&store)
        .oneshot(Request::get("/BADURL").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "stored URL cannot be used as a redirect target");

    store.stop().await;
}
