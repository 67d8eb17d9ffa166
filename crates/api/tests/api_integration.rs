//! API integration tests.
//!
//! These tests drive the full application router against an in-memory
//! database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use devlink_api::{AppState, app};
use devlink_common::{Config, Environment};
use devlink_db::test_utils::TestDatabase;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    _db: TestDatabase,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn setup_with(config: Config) -> TestApp {
    let db = TestDatabase::in_memory().await.unwrap();
    let state = AppState::new(db.connection().clone(), config);
    TestApp {
        router: app(state),
        _db: db,
    }
}

async fn setup() -> TestApp {
    setup_with(Config::for_tests()).await
}

impl TestApp {
    async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn signup(&self, first_name: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "firstName": first_name,
                    "lastName": "Tester",
                    "emailId": format!("{}@example.com", first_name.to_lowercase()),
                    "password": "Passw0rd!",
                    "skills": ["Rust", "rust ", "Go"],
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["user"]["id"].as_str().unwrap().to_string()
    }

    /// Log in and return the `token=...` cookie pair.
    async fn login(&self, first_name: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({
                    "emailId": format!("{}@example.com", first_name.to_lowercase()),
                    "password": "Passw0rd!",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        let set_cookie = response
            .headers
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;
    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "OK");
    assert!(response.body["uptime"].is_number());
    assert!(response.headers.contains_key("x-ratelimit-limit"));
}

#[tokio::test]
async fn test_connection_request_end_to_end() {
    let app = setup().await;
    let alice_id = app.signup("Alice").await;
    let bob_id = app.signup("Bob").await;
    let alice = app.login("Alice").await;
    let bob = app.login("Bob").await;

    let sent = app
        .request(
            Method::POST,
            &format!("/requests/send/interested/{bob_id}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(sent.status, StatusCode::CREATED, "{}", sent.body);
    assert_eq!(sent.body["message"], "Alice is interested in Bob");
    assert_eq!(sent.body["connectionRequest"]["fromUserId"], alice_id);
    assert_eq!(sent.body["connectionRequest"]["toUserId"], bob_id);
    assert_eq!(sent.body["connectionRequest"]["status"], "interested");

    let inbox = app
        .request(Method::GET, "/user/requests/received", Some(&bob), None)
        .await;
    assert_eq!(inbox.status, StatusCode::OK);
    let received = inbox.body["receivedRequests"].as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["fromUserId"]["id"], alice_id);
    assert_eq!(received[0]["fromUserId"]["firstName"], "Alice");
    assert!(received[0]["fromUserId"].get("emailId").is_none());
    assert!(received[0]["fromUserId"].get("passwordHash").is_none());

    let accepted = app
        .request(
            Method::POST,
            &format!("/requests/review/accepted/{alice_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.body);
    assert_eq!(accepted.body["connectionRequest"]["status"], "accepted");
    assert_eq!(
        accepted.body["message"],
        "Bob accepted Alice's connection request"
    );

    let again = app
        .request(
            Method::POST,
            &format!("/requests/review/rejected/{alice_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    for (cookie, other_id) in [(&alice, &bob_id), (&bob, &alice_id)] {
        let connections = app
            .request(Method::GET, "/user/requests/connections", Some(cookie), None)
            .await;
        assert_eq!(connections.status, StatusCode::OK);
        let data = connections.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(&data[0]["id"], other_id);
    }

    let reverse = app
        .request(
            Method::POST,
            &format!("/requests/send/interested/{alice_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(reverse.status, StatusCode::CONFLICT);
    assert_eq!(reverse.body["message"], "Connection Request already exists");
    assert_eq!(reverse.body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_send_rejects_bad_input() {
    let app = setup().await;
    let alice_id = app.signup("Alice").await;
    let alice = app.login("Alice").await;

    let to_self = app
        .request(
            Method::POST,
            &format!("/requests/send/interested/{alice_id}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(to_self.status, StatusCode::BAD_REQUEST);

    let bad_id = app
        .request(
            Method::POST,
            "/requests/send/interested/not-a-user-id",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.body["message"], "Invalid user ID format");

    let bad_status = app
        .request(
            Method::POST,
            "/requests/send/accepted/01hv8z3q6n1e1yq4y0pz8k2xwm",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let missing_target = app
        .request(
            Method::POST,
            "/requests/send/interested/01hv8z3q6n1e1yq4y0pz8k2xwm",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(missing_target.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authentication_required() {
    let app = setup().await;

    let response = app
        .request(Method::GET, "/user/requests/connections", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Authentication token is missing");

    let response = app
        .request(Method::GET, "/profile/view", Some("token=garbage"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid token");
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let app = setup().await;
    app.signup("Alice").await;
    let cookie = app.login("Alice").await;
    let token = cookie.trim_start_matches("token=");

    let request = Request::builder()
        .uri("/profile/view")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup().await;
    let response = app.request(Method::GET, "/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Route /nope not found");
}

#[tokio::test]
async fn test_feed_pagination() {
    let app = setup().await;
    for name in ["Alice", "Bob", "Carol"] {
        app.signup(name).await;
    }
    let alice = app.login("Alice").await;

    let page = app
        .request(Method::GET, "/user/feed?page=1&limit=2", Some(&alice), None)
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["users"].as_array().unwrap().len(), 2);
    assert_eq!(
        page.body["pagination"],
        json!({
            "currentPage": 1,
            "totalPages": 2,
            "totalUsers": 3,
            "hasNext": true,
            "hasPrev": false,
        })
    );

    for page_number in ["3", "100000000000000000", "9223372036854775807"] {
        let beyond = app
            .request(
                Method::GET,
                &format!("/user/feed?page={page_number}&limit=100"),
                Some(&alice),
                None,
            )
            .await;
        assert_eq!(beyond.status, StatusCode::OK, "{page_number}");
        assert!(beyond.body["users"].as_array().unwrap().is_empty());
        assert_eq!(beyond.body["pagination"]["totalPages"], 1);
        assert_eq!(beyond.body["pagination"]["totalUsers"], 3);
        assert_eq!(beyond.body["pagination"]["hasNext"], false);
        assert_eq!(beyond.body["pagination"]["hasPrev"], true);
    }

    for query in ["limit=101", "limit=0", "page=0", "page=abc"] {
        let response = app
            .request(Method::GET, &format!("/user/feed?{query}"), Some(&alice), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
    }
}

#[tokio::test]
async fn test_signup_validation_and_duplicates() {
    let app = setup().await;
    app.signup("Alice").await;

    let duplicate = app
        .request(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({
                "firstName": "Alice",
                "lastName": "Again",
                "emailId": "ALICE@example.com",
                "password": "Passw0rd!",
            })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["message"], "Email already registered");

    let weak = app
        .request(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({
                "firstName": "Mallory",
                "lastName": "",
                "emailId": "mallory@example.com",
                "password": "password",
            })),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.body["code"], "VALIDATION_ERROR");
    assert!(weak.body["details"]["errors"]["password"].is_string());

    let malformed = app
        .request(Method::POST, "/auth/signup", None, Some(json!({ "firstName": 7 })))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_not_found() {
    let app = setup().await;
    app.signup("Alice").await;

    for (email, password) in [
        ("alice@example.com", "Wr0ngPass!"),
        ("nobody@example.com", "Passw0rd!"),
    ] {
        let response = app
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "emailId": email, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn test_profile_view_and_update() {
    let app = setup().await;
    app.signup("Alice").await;
    let alice = app.login("Alice").await;

    let view = app.request(Method::GET, "/profile/view", Some(&alice), None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["emailId"], "alice@example.com");
    assert_eq!(view.body["skills"], json!(["Rust", "Go"]));
    assert!(view.body.get("passwordHash").is_none());

    let updated = app
        .request(
            Method::PATCH,
            "/profile/update",
            Some(&alice),
            Some(json!({ "about": "  Systems programmer  ", "age": 31 })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    assert_eq!(updated.body["user"]["about"], "Systems programmer");
    assert_eq!(updated.body["user"]["age"], 31);

    let empty = app
        .request(Method::PATCH, "/profile/update", Some(&alice), Some(json!({})))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["message"], "No update data provided");

    let forbidden_field = app
        .request(
            Method::PATCH,
            "/profile/update",
            Some(&alice),
            Some(json!({ "emailId": "new@example.com" })),
        )
        .await;
    assert_eq!(forbidden_field.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_password_and_logout_clear_cookie() {
    let app = setup().await;
    app.signup("Alice").await;
    let alice = app.login("Alice").await;

    let reset = app
        .request(
            Method::POST,
            "/profile/reset-password",
            Some(&alice),
            Some(json!({ "password": "N3wPassw0rd!" })),
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK, "{}", reset.body);
    let cleared = reset.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.starts_with("token="));

    let old_password = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "emailId": "alice@example.com", "password": "Passw0rd!" })),
        )
        .await;
    assert_eq!(old_password.status, StatusCode::NOT_FOUND);

    let logout = app.request(Method::POST, "/auth/logout", Some(&alice), None).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logout successful");
    assert!(logout.headers.contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_user_lookup_and_delete() {
    let app = setup().await;
    let alice_id = app.signup("Alice").await;
    let bob_id = app.signup("Bob").await;
    let alice = app.login("Alice").await;

    let by_id = app
        .request(Method::GET, &format!("/user/user/{bob_id}"), Some(&alice), None)
        .await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.body["firstName"], "Bob");
    assert!(by_id.body.get("emailId").is_none());

    let by_email = app
        .request(
            Method::GET,
            "/user/user?emailId=BOB@example.com",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(by_email.status, StatusCode::OK);
    assert_eq!(by_email.body["id"], bob_id);

    let missing = app
        .request(
            Method::GET,
            "/user/user?emailId=nobody@example.com",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let forbidden = app
        .request(Method::DELETE, &format!("/user/user/{bob_id}"), Some(&alice), None)
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted = app
        .request(Method::DELETE, &format!("/user/user/{alice_id}"), Some(&alice), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "User deleted successfully");

    let gone = app.request(Method::GET, "/profile/view", Some(&alice), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "User not found");
}

#[tokio::test]
async fn test_error_debug_hidden_in_production() {
    let app = setup().await;
    let response = app.request(Method::GET, "/nope", None, None).await;
    assert!(response.body.get("debug").is_some());

    let mut config = Config::for_tests();
    config.server.environment = Environment::Production;
    let app = setup_with(config).await;
    let response = app.request(Method::GET, "/nope", None, None).await;
    assert!(response.body.get("debug").is_none());
    assert_eq!(response.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_rate_limit_by_ip() {
    let mut config = Config::for_tests();
    config.rate_limit.max_requests = 2;
    let app = setup_with(config).await;

    let limited_request = || {
        Request::builder()
            .uri("/health")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.router.clone().oneshot(limited_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.router.clone().oneshot(limited_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    let other_ip = Request::builder()
        .uri("/health")
        .header("x-forwarded-for", "198.51.100.5")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(other_ip).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_by_peer_address_without_proxy_headers() {
    let mut config = Config::for_tests();
    config.rate_limit.max_requests = 1;
    let app = setup_with(config).await;

    let from_peer = |peer: [u8; 4]| {
        Request::builder()
            .uri("/health")
            .extension(ConnectInfo(SocketAddr::from((peer, 5000))))
            .body(Body::empty())
            .unwrap()
    };

    let first = app.router.clone().oneshot(from_peer([203, 0, 113, 1])).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.router.clone().oneshot(from_peer([203, 0, 113, 2])).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let repeat = app.router.clone().oneshot(from_peer([203, 0, 113, 1])).await.unwrap();
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_user_prefixed_account_routes() {
    let app = setup().await;

    let created = app
        .request(
            Method::POST,
            "/user/signup",
            None,
            Some(json!({
                "firstName": "Dana",
                "lastName": "Tester",
                "emailId": "dana@example.com",
                "password": "Passw0rd!",
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["message"], "User created successfully");

    let logged_in = app
        .request(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "emailId": "dana@example.com", "password": "Passw0rd!" })),
        )
        .await;
    assert_eq!(logged_in.status, StatusCode::OK);
    let cookie = logged_in
        .headers
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let profile = app.request(Method::GET, "/user/profile", Some(&cookie), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["emailId"], "dana@example.com");

    let anonymous = app.request(Method::GET, "/user/profile", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}
