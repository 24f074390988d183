//! End-to-end tests that drive the axum router in-process against the
//! in-memory catalog store.

use api_lib::config::{Config, DeploymentMode};
use api_lib::web::{self, AppState};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wandau_core::InMemoryCatalogStore;

fn test_config(mode: DeploymentMode) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        log_level: tracing::Level::DEBUG,
        token_secret: "integration-test-secret".to_string(),
        token_ttl: chrono::Duration::hours(5),
        mode,
        cors_origins: vec!["http://localhost:5173".to_string()],
        featured_limit: 6,
    }
}

fn app_with(mode: DeploymentMode) -> Router {
    let store = Arc::new(InMemoryCatalogStore::new());
    let state = AppState::new(Arc::new(test_config(mode)), store).unwrap();
    web::router(Arc::new(state))
}

fn app() -> Router {
    app_with(DeploymentMode::Development)
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, req: Request<Body>) -> Reply {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Reply {
        status,
        headers,
        body,
    }
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Logs in as `email` and returns the `authToken=...` cookie pair.
async fn login(app: &Router, email: &str) -> String {
    let reply = send(
        app,
        request(Method::POST, "/jwt/create", None, Some(json!({ "email": email }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let set_cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_artifact(app: &Router, cookie: &str, body: Value) -> String {
    let reply = send(app, request(Method::POST, "/add-artifacts", Some(cookie), Some(body))).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["data"]["insertedId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_reports_running() {
    let reply = send(&app(), request(Method::GET, "/", None, None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, Value::String(api_lib::web::rest::BANNER.to_string()));
}

#[tokio::test]
async fn owner_listing_end_to_end() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    create_artifact(&app, &alice, json!({ "name": "Rosetta Stone", "ownerEmail": "alice@x.com" })).await;

    let reply = send(
        &app,
        request(Method::GET, "/user-added-artifacts/alice@x.com", Some(&alice), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], json!(true));
    assert_eq!(reply.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(reply.body["data"][0]["ownerEmail"], json!("alice@x.com"));

    let anonymous = send(
        &app,
        request(Method::GET, "/user-added-artifacts/alice@x.com", None, None),
    )
    .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["message"], json!("Unauthorized Access!"));
}

#[tokio::test]
async fn other_users_listing_is_forbidden() {
    let app = app();
    let bob = login(&app, "b@x.com").await;

    let reply = send(
        &app,
        request(Method::GET, "/user-added-artifacts/a@x.com", Some(&bob), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["status"], json!(false));
}

#[rstest]
#[case(Method::POST, "/add-artifacts")]
#[case(Method::PATCH, "/artifact-update/00000000-0000-0000-0000-000000000000")]
#[case(Method::DELETE, "/artifact-delete/00000000-0000-0000-0000-000000000000")]
#[case(Method::GET, "/user-added-artifacts/a@x.com")]
#[case(Method::POST, "/like/00000000-0000-0000-0000-000000000000?email=a@x.com")]
#[case(Method::GET, "/liked-artifacts/a@x.com")]
#[tokio::test]
async fn guarded_routes_require_a_session(#[case] method: Method, #[case] uri: &str) {
    let reply = send(&app(), request(method, uri, None, Some(json!({})))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_cookie_is_rejected_with_reason() {
    let app = app();
    let cookie = login(&app, "alice@x.com").await;
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let reply = send(
        &app,
        request(Method::GET, "/liked-artifacts/alice@x.com", Some(&tampered), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["message"], json!("invalid signature"));
}

#[tokio::test]
async fn session_cookie_attributes_follow_deployment_mode() {
    let dev = send(
        &app(),
        request(Method::POST, "/jwt/create", None, Some(json!({ "email": "a@x.com" }))),
    )
    .await;
    let dev_cookie = dev.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(dev_cookie.starts_with("authToken="));
    assert!(dev_cookie.contains("HttpOnly"));
    assert!(dev_cookie.contains("SameSite=Strict"));
    assert!(dev_cookie.contains("Max-Age=18000"));
    assert!(!dev_cookie.contains("Secure"));
    assert_eq!(dev.body, json!({ "status": true }));

    let prod = send(
        &app_with(DeploymentMode::Production),
        request(Method::POST, "/jwt/create", None, Some(json!({ "email": "a@x.com" }))),
    )
    .await;
    let prod_cookie = prod.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(prod_cookie.contains("Secure"));
    assert!(prod_cookie.contains("SameSite=None"));
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let reply = send(&app(), request(Method::POST, "/jwt/remove", None, None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("authToken=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn token_request_without_email_is_bad_request() {
    let reply = send(
        &app(),
        request(Method::POST, "/jwt/create", None, Some(json!({ "name": "nobody" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creating_for_someone_else_is_forbidden() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;

    let reply = send(
        &app,
        request(
            Method::POST,
            "/add-artifacts",
            Some(&alice),
            Some(json!({ "name": "Forged", "ownerEmail": "bob@x.com" })),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn artifact_lookup_and_listing() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let id = create_artifact(
        &app,
        &alice,
        json!({ "name": "Terracotta Warrior", "type": "Sculpture", "presentLocation": "Xi'an" }),
    )
    .await;

    let one = send(&app, request(Method::GET, &format!("/artifact/{id}"), None, None)).await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.body["data"]["name"], json!("Terracotta Warrior"));
    assert_eq!(one.body["data"]["type"], json!("Sculpture"));
    assert_eq!(one.body["data"]["likeCount"], json!(0));
    assert!(one.body["data"].get("image").is_none());

    let all = send(&app, request(Method::GET, "/artifacts", None, None)).await;
    assert_eq!(all.body["data"].as_array().unwrap().len(), 1);
}

#[rstest]
#[case("/artifact/7b0c3f4e-0000-4000-8000-000000000000")]
#[case("/artifact/not-a-uuid")]
#[tokio::test]
async fn unknown_artifact_is_not_found(#[case] uri: &str) {
    let reply = send(&app(), request(Method::GET, uri, None, None)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["status"], json!(false));
}

#[tokio::test]
async fn search_matches_name_substring_case_insensitively() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    create_artifact(&app, &alice, json!({ "name": "Bronze Sword" })).await;
    create_artifact(&app, &alice, json!({ "name": "Iron Shield" })).await;

    let reply = send(&app, request(Method::GET, "/artifacts-search?search=sword", None, None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["query"], json!("sword"));
    let data = reply.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], json!("Bronze Sword"));
}

#[rstest]
#[case("/artifacts-search")]
#[case("/artifacts-search?search=")]
#[tokio::test]
async fn search_without_term_explains_itself(#[case] uri: &str) {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    create_artifact(&app, &alice, json!({ "name": "Bronze Sword" })).await;

    let reply = send(&app, request(Method::GET, uri, None, None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({ "status": false, "message": "No search value provided" })
    );
}

#[tokio::test]
async fn update_is_a_partial_patch_for_the_owner_only() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let bob = login(&app, "bob@x.com").await;
    let id = create_artifact(
        &app,
        &alice,
        json!({ "name": "Bronze Sword", "discoveredBy": "Schliemann" }),
    )
    .await;
    let uri = format!("/artifact-update/{id}");

    let denied = send(
        &app,
        request(Method::PATCH, &uri, Some(&bob), Some(json!({ "name": "Bob's Sword" }))),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let reply = send(
        &app,
        request(Method::PATCH, &uri, Some(&alice), Some(json!({ "name": "Bronze Dagger" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["id"], json!(id));
    assert_eq!(reply.body["data"]["name"], json!("Bronze Dagger"));
    assert_eq!(reply.body["data"]["discoveredBy"], json!("Schliemann"));
}

#[tokio::test]
async fn liking_twice_records_one_like() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let bob = login(&app, "bob@x.com").await;
    let id = create_artifact(&app, &alice, json!({ "name": "Amphora" })).await;
    let like_uri = format!("/like/{id}?email=bob@x.com");

    let first = send(
        &app,
        request(Method::POST, &like_uri, Some(&bob), Some(json!({ "artifactName": "Amphora" }))),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["status"], json!(true));
    assert_eq!(first.body["result"]["email"], json!("bob@x.com"));
    assert_eq!(first.body["result"]["payload"]["artifactName"], json!("Amphora"));

    let second = send(&app, request(Method::POST, &like_uri, Some(&bob), None)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(
        second.body,
        json!({ "status": false, "message": "Already Liked This Artifact" })
    );

    let likers = send(&app, request(Method::GET, &format!("/liked-persons/{id}"), None, None)).await;
    assert_eq!(likers.body["data"].as_array().unwrap().len(), 1);

    let artifact = send(&app, request(Method::GET, &format!("/artifact/{id}"), None, None)).await;
    assert_eq!(artifact.body["data"]["likeCount"], json!(1));

    let mine = send(
        &app,
        request(Method::GET, "/liked-artifacts/bob@x.com", Some(&bob), None),
    )
    .await;
    assert_eq!(mine.body["data"][0]["artifactId"], json!(id));
}

#[tokio::test]
async fn liking_as_someone_else_is_forbidden() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let bob = login(&app, "bob@x.com").await;
    let id = create_artifact(&app, &alice, json!({ "name": "Amphora" })).await;

    let reply = send(
        &app,
        request(Method::POST, &format!("/like/{id}?email=carol@x.com"), Some(&bob), None),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn like_counter_has_no_direct_increment_route() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let id = create_artifact(&app, &alice, json!({ "name": "Amphora" })).await;

    let reply = send(&app, request(Method::PATCH, &format!("/like/{id}"), Some(&alice), None)).await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);

    let artifact = send(&app, request(Method::GET, &format!("/artifact/{id}"), None, None)).await;
    assert_eq!(artifact.body["data"]["likeCount"], json!(0));
}

#[tokio::test]
async fn delete_cascades_and_is_owner_only() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let bob = login(&app, "bob@x.com").await;
    let id = create_artifact(&app, &alice, json!({ "name": "Amphora" })).await;
    send(&app, request(Method::POST, &format!("/like/{id}"), Some(&bob), None)).await;
    send(&app, request(Method::POST, &format!("/like/{id}"), Some(&alice), None)).await;
    let uri = format!("/artifact-delete/{id}");

    let denied = send(&app, request(Method::DELETE, &uri, Some(&bob), None)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let reply = send(&app, request(Method::DELETE, &uri, Some(&alice), None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({
            "status": true,
            "resultFromArtifactsCollection": { "deletedCount": 1 },
            "resultFromArtifactsLikeCollection": { "deletedCount": 2 }
        })
    );

    let likers = send(&app, request(Method::GET, &format!("/liked-persons/{id}"), None, None)).await;
    assert_eq!(likers.body["data"], json!([]));

    let again = send(&app, request(Method::DELETE, &uri, Some(&alice), None)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn featured_lists_six_most_liked() {
    let app = app();
    let owner = login(&app, "owner@x.com").await;
    let mut ids = Vec::new();
    for i in 0..10 {
        ids.push(create_artifact(&app, &owner, json!({ "name": format!("Artifact {i}") })).await);
    }
    let mut fans = Vec::new();
    for n in 0..9 {
        fans.push(login(&app, &format!("fan{n}@x.com")).await);
    }
    // Artifact i gets i likes.
    for (i, id) in ids.iter().enumerate() {
        for fan in fans.iter().take(i) {
            send(&app, request(Method::POST, &format!("/like/{id}"), Some(fan), None)).await;
        }
    }

    let reply = send(&app, request(Method::GET, "/featured-artifacts", None, None)).await;
    let data = reply.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 6);
    let counts: Vec<i64> = data.iter().map(|a| a["likeCount"].as_i64().unwrap()).collect();
    assert_eq!(counts, vec![9, 8, 7, 6, 5, 4]);
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() {
    let app = app();
    let allowed = Request::builder()
        .uri("/artifacts")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, allowed).await;
    assert_eq!(
        reply.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let foreign = Request::builder()
        .uri("/artifacts")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, foreign).await;
    assert!(reply.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn wrongly_typed_artifact_body_keeps_the_error_envelope() {
    let app = app();
    let alice = login(&app, "alice@x.com").await;

    let reply = send(
        &app,
        request(Method::POST, "/add-artifacts", Some(&alice), Some(json!({ "name": 5 }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["status"], json!(false));
    assert!(
        reply.body["message"].as_str().unwrap().contains("invalid type"),
        "{}",
        reply.body
    );

    let listed = send(&app, request(Method::GET, "/artifacts", None, None)).await;
    assert_eq!(listed.body["data"], json!([]));
}

#[rstest]
#[case(Some("application/json"), "{\"name\": ")]
#[case(None, "{\"name\": \"Amphora\"}")]
#[tokio::test]
async fn unreadable_update_body_is_bad_request(
    #[case] content_type: Option<&str>,
    #[case] body: &'static str,
) {
    let app = app();
    let alice = login(&app, "alice@x.com").await;
    let id = create_artifact(&app, &alice, json!({ "name": "Amphora" })).await;

    let mut builder = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/artifact-update/{id}"))
        .header(header::COOKIE, &alice);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let reply = send(&app, builder.body(Body::from(body)).unwrap()).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["status"], json!(false));
    assert!(reply.body["message"].is_string());
}

#[tokio::test]
async fn wildcard_origin_is_never_echoed() {
    let mut config = test_config(DeploymentMode::Development);
    config.cors_origins = vec!["*".to_string(), "http://localhost:5173".to_string()];
    let store = Arc::new(InMemoryCatalogStore::new());
    let state = AppState::new(Arc::new(config), store).unwrap();
    let app = web::router(Arc::new(state));

    let foreign = Request::builder()
        .uri("/artifacts")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, foreign).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
