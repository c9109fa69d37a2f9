//! Token attachment and 401 recovery through the gateway client.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{content_json, user_json, Harness};
use repurpose_core::storage::{Storage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use repurpose_core::{ApiClient, ApiError, RefreshPolicy};

fn api_error(err: &anyhow::Error) -> &ApiError {
    err.downcast_ref::<ApiError>()
        .expect("error should carry an ApiError")
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/content/"))
        .and(header("authorization", "Bearer A"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([content_json(1, "Launch")])))
        .expect(1)
        .mount(&h.server)
        .await;

    let contents = h.api.list_content(0, 20).await.unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].title_display(), "Launch");
}

#[tokio::test]
async fn test_no_token_sends_no_header() {
    let h = Harness::start(&[]).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&h.server)
        .await;

    h.api
        .register("ada@example.com", "ada", "password1")
        .await
        .unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_refresh_then_resend() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "B"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "C",
            "refresh_token": "ignored",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.api.fetch_profile().await.unwrap();
    assert_eq!(user.email, "ada@example.com");

    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("C"));
    // Only the access token is replaced
    assert_eq!(h.storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("B"));
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_refresh_request_carries_no_bearer() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "C"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&h.server)
        .await;

    h.api.fetch_profile().await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/api/auth/refresh")
        .unwrap();
    assert!(refresh.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_refresh_failure_ends_session() {
    let h = Harness::logged_in().await;
    h.api.session().auth().init_auth().unwrap();
    assert!(h.api.session().auth().is_authenticated());

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid refresh token"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.fetch_profile().await.unwrap_err();
    assert!(matches!(api_error(&err), ApiError::SessionExpired));

    assert!(h.storage.is_empty());
    assert!(!h.api.session().auth().is_authenticated());
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_refresh_transport_failure_ends_session() {
    let h = Harness::logged_in().await;
    // Short timeout so a stalled refresh fails at the transport level
    let api = ApiClient::with_timeout(
        h.server.uri(),
        h.api.session().clone(),
        Duration::from_millis(300),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({"access_token": "C"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = api.fetch_profile().await.unwrap_err();
    assert!(matches!(api_error(&err), ApiError::SessionExpired));

    assert!(h.storage.is_empty());
    assert!(!api.session().auth().is_authenticated());
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_malformed_refresh_response_ends_session() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/content/7"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&h.server)
        .await;

    let err = h.api.get_content(7).await.unwrap_err();
    assert!(matches!(api_error(&err), ApiError::SessionExpired));
    assert!(h.storage.is_empty());
    assert_eq!(h.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_second_401_is_not_retried() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "C"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer C"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Inactive user"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.fetch_profile().await.unwrap_err();
    let api = api_error(&err);
    assert!(matches!(api, ApiError::Unauthorized(_)));
    assert_eq!(api.detail().as_deref(), Some("Inactive user"));

    assert_eq!(h.request_count().await, 3);
    // The refreshed token is kept; the session is not torn down
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("C"));
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_401_without_refresh_token() {
    let h = Harness::start(&[(ACCESS_TOKEN_KEY, "A")]).await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "C"})))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.api.fetch_profile().await.unwrap_err();
    assert!(matches!(api_error(&err), ApiError::Unauthorized(_)));
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A"));
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/generate/history"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "C"})))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.api.generation_history(0, 50).await.unwrap_err();
    assert_eq!(api_error(&err).status(), Some(500));
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A"));
}

#[tokio::test]
async fn test_forbidden_is_passed_through() {
    let h = Harness::logged_in().await;

    Mock::given(method("DELETE"))
        .and(path("/api/content/3"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Not your content"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api.delete_content(3).await.unwrap_err();
    let api = api_error(&err);
    assert!(matches!(api, ApiError::AccessDenied(_)));
    assert_eq!(api.detail().as_deref(), Some("Not your content"));
}

#[tokio::test]
async fn test_concurrent_401s_refresh_per_request() {
    let h = Harness::logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "C"})))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(2)
        .mount(&h.server)
        .await;

    let results = futures::future::join_all([h.api.fetch_profile(), h.api.fetch_profile()]).await;
    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn test_concurrent_401s_single_flight() {
    let h = Harness::with_policy(
        &[(ACCESS_TOKEN_KEY, "A"), (REFRESH_TOKEN_KEY, "B")],
        RefreshPolicy::SingleFlight,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "C"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&h.server)
        .await;

    let results = futures::future::join_all([
        h.api.fetch_profile(),
        h.api.fetch_profile(),
        h.api.fetch_profile(),
    ])
    .await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(h.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("C"));
}

#[tokio::test]
async fn test_concurrent_refresh_failure_single_flight() {
    let h = Harness::with_policy(
        &[(ACCESS_TOKEN_KEY, "A"), (REFRESH_TOKEN_KEY, "B")],
        RefreshPolicy::SingleFlight,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let results = futures::future::join_all([h.api.fetch_profile(), h.api.fetch_profile()]).await;
    for result in &results {
        let err = result.as_ref().unwrap_err();
        assert!(matches!(api_error(err), ApiError::SessionExpired));
    }
    assert!(h.storage.is_empty());
    // Only the request that attempted the refresh redirects
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}
