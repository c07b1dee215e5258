//! Authentication integration tests.
//!
//! Tests the session gates, session minting, and credential propagation
//! against a mocked auth microservice.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use api_gateway::auth::SessionCodec;
use api_gateway::config::Config;
use api_gateway::routes::{self, AppState};
use api_gateway::services::AuthApiClient;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Session key the test gateway signs with.
const KEY_ONE: &str = "test-session-key-one";

/// Rotated session key the test gateway still accepts.
const KEY_TWO: &str = "test-session-key-two";

/// Gateway instance bound to a random port with a mocked auth service.
struct TestGateway {
    addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    auth_mock: MockServer,
    codec: Arc<SessionCodec>,
}

impl TestGateway {
    async fn spawn() -> Result<Self> {
        let auth_mock = MockServer::start().await;
        Self::spawn_with_auth_url(auth_mock.uri(), auth_mock).await
    }

    async fn spawn_with_auth_url(auth_url: String, auth_mock: MockServer) -> Result<Self> {
        let vars = HashMap::from([
            ("SESSION_KEY_ONE".to_string(), KEY_ONE.to_string()),
            ("SESSION_KEY_TWO".to_string(), KEY_TWO.to_string()),
            ("AUTH_SERVICE_URL".to_string(), auth_url),
            (
                "ELASTICSEARCH_URL".to_string(),
                "http://localhost:9200".to_string(),
            ),
            (
                "GATEWAY_BIND_ADDRESS".to_string(),
                "127.0.0.1:0".to_string(),
            ),
        ]);

        let config =
            Config::from_vars(&vars).map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let codec = Arc::new(SessionCodec::new(
            &config.session_key_one,
            &config.session_key_two,
            config.session_clock_skew_seconds,
        ));

        let auth_api = AuthApiClient::new(&config.auth_service_url)?;

        // Readiness stays false; these tests never gate on search.
        let (_ready_tx, search_ready) = watch::channel(false);

        let state = Arc::new(AppState {
            config,
            auth_api,
            session_codec: codec.clone(),
            search_ready,
        });

        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            _server_handle: server_handle,
            auth_mock,
            codec,
        })
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Cookie header value for a signed-in caller.
    fn session_cookie_for(&self, id: i64, username: &str, bearer: &str) -> String {
        let artifact = self
            .codec
            .issue(id, username, &format!("{username}@example.com"), bearer)
            .expect("Failed to issue test artifact");
        format!("session={artifact}")
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}

/// Claims shape used to craft hostile artifacts directly.
#[derive(Debug, Serialize)]
struct RawClaims {
    id: i64,
    username: String,
    email: String,
    token: String,
    iat: i64,
    exp: i64,
}

fn sign_raw(claims: &RawClaims, key: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .expect("Failed to sign raw claims")
}

fn current_user_mock(bearer: &str, username: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/currentuser"))
        .and(header("Authorization", format!("Bearer {bearer}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Authenticated user",
            "user": {
                "id": 1,
                "username": username,
                "email": format!("{username}@example.com")
            }
        })))
}

// =============================================================================
// Session presence gate
// =============================================================================

/// A protected route without a session cookie yields the fixed 401.
#[tokio::test]
async fn test_protected_route_requires_session_cookie() -> Result<()> {
    let gateway = TestGateway::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"],
        "Token is not available. Please login again."
    );

    Ok(())
}

/// A tampered artifact is indistinguishable from a missing one.
#[tokio::test]
async fn test_protected_route_rejects_tampered_artifact() -> Result<()> {
    let gateway = TestGateway::spawn().await?;
    let client = reqwest::Client::new();

    let cookie = gateway.session_cookie_for(1, "alice", "token-alice");
    // Corrupt the signature segment
    let tampered = format!("{}AAAA", cookie);

    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header("Cookie", tampered)
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["message"],
        "Token is not available. Please login again."
    );

    Ok(())
}

/// An expired artifact yields the same fixed 401.
#[tokio::test]
async fn test_protected_route_rejects_expired_artifact() -> Result<()> {
    let gateway = TestGateway::spawn().await?;
    let client = reqwest::Client::new();

    let now = chrono::Utc::now().timestamp();
    let artifact = sign_raw(
        &RawClaims {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            token: "token-alice".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        },
        KEY_ONE,
    );

    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header("Cookie", format!("session={artifact}"))
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    Ok(())
}

/// An artifact signed with a key the gateway never knew is rejected.
#[tokio::test]
async fn test_protected_route_rejects_foreign_signature() -> Result<()> {
    let gateway = TestGateway::spawn().await?;
    let client = reqwest::Client::new();

    let now = chrono::Utc::now().timestamp();
    let artifact = sign_raw(
        &RawClaims {
            id: 1,
            username: "mallory".to_string(),
            email: "mallory@example.com".to_string(),
            token: "token-mallory".to_string(),
            iat: now,
            exp: now + 3600,
        },
        "attacker-chosen-key",
    );

    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header("Cookie", format!("session={artifact}"))
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    Ok(())
}

/// An unsigned `alg: none` artifact is rejected (algorithm confusion).
#[tokio::test]
async fn test_protected_route_rejects_alg_none_artifact() -> Result<()> {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let gateway = TestGateway::spawn().await?;
    let client = reqwest::Client::new();

    let now = chrono::Utc::now().timestamp();
    let header_segment = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let claims_segment = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"id":1,"username":"attacker","email":"attacker@example.com","token":"token-x","iat":{},"exp":{}}}"#,
        now,
        now + 3600
    ));

    // alg:none tokens typically carry an empty signature
    let artifact = format!("{header_segment}.{claims_segment}.");

    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header("Cookie", format!("session={artifact}"))
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    Ok(())
}

/// An artifact signed with the rotated secondary key is still accepted.
#[tokio::test]
async fn test_protected_route_accepts_rotated_key() -> Result<()> {
    let gateway = TestGateway::spawn().await?;
    current_user_mock("token-old", "freya")
        .expect(1)
        .mount(&gateway.auth_mock)
        .await;

    let now = chrono::Utc::now().timestamp();
    let artifact = sign_raw(
        &RawClaims {
            id: 5,
            username: "freya".to_string(),
            email: "freya@example.com".to_string(),
            token: "token-old".to_string(),
            iat: now,
            exp: now + 3600,
        },
        KEY_TWO,
    );

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header("Cookie", format!("session={artifact}"))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    Ok(())
}

// =============================================================================
// Credential propagation
// =============================================================================

/// A valid session forwards its wrapped bearer token upstream.
#[tokio::test]
async fn test_valid_session_forwards_bearer_upstream() -> Result<()> {
    let gateway = TestGateway::spawn().await?;
    current_user_mock("token-alice", "alice")
        .expect(1)
        .mount(&gateway.auth_mock)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header(
            "Cookie",
            gateway.session_cookie_for(1, "alice", "token-alice"),
        )
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Authenticated user");
    assert_eq!(body["user"]["username"], "alice");

    // The mock's expect(1) verifies the Authorization header on drop.
    Ok(())
}

/// End-to-end: signin issues a session cookie embedding the backend token,
/// and a follow-up request presents exactly that token upstream.
#[tokio::test]
async fn test_signin_round_trip_propagates_backend_token() -> Result<()> {
    let gateway = TestGateway::spawn().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "User login successfully",
            "user": { "id": 9, "username": "selma", "email": "selma@example.com" },
            "token": "backend-token-selma"
        })))
        .expect(1)
        .mount(&gateway.auth_mock)
        .await;

    current_user_mock("backend-token-selma", "selma")
        .expect(1)
        .mount(&gateway.auth_mock)
        .await;

    let client = reqwest::Client::new();

    // Sign in through the gateway
    let response = client
        .post(format!("{}/api/gateway/v1/auth/signin", gateway.url()))
        .json(&serde_json::json!({ "username": "selma", "password": "hunter2" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("signin should set a session cookie")
        .to_str()?
        .to_owned();

    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=604800"));
    assert!(
        !set_cookie.contains("Secure"),
        "Secure flag must be off in development"
    );

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "User login successfully");
    assert_eq!(body["user"]["username"], "selma");
    assert!(
        body.get("token").is_none(),
        "The backend token must stay inside the cookie"
    );

    // The artifact wraps the backend-issued token
    let pair = set_cookie.split(';').next().unwrap();
    let artifact = pair.trim_start_matches("session=");
    let claims = gateway.codec.decode(artifact).expect("artifact should decode");
    assert_eq!(claims.token, "backend-token-selma");
    assert_eq!(claims.username, "selma");

    // Replay the cookie; the mock only matches `Bearer backend-token-selma`
    let response = client
        .get(format!("{}/api/gateway/v1/auth/currentuser", gateway.url()))
        .header("Cookie", pair)
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    Ok(())
}

/// Signup mints a session cookie with 201, same as signin.
#[tokio::test]
async fn test_signup_mints_session_cookie() -> Result<()> {
    let gateway = TestGateway::spawn().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "message": "User created successfully",
            "user": { "id": 11, "username": "nadia", "email": "nadia@example.com" },
            "token": "backend-token-nadia"
        })))
        .expect(1)
        .mount(&gateway.auth_mock)
        .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/gateway/v1/auth/signup", gateway.url()))
        .json(&serde_json::json!({
            "username": "nadia",
            "email": "nadia@example.com",
            "password": "hunter2"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), 201);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("signup should set a session cookie")
        .to_str()?;
    assert!(set_cookie.starts_with("session="));

    Ok(())
}

// =============================================================================
// Credential isolation under concurrency
// =============================================================================

/// Two concurrent sessions never leak each other's bearer token upstream.
///
/// The upstream mocks key on the Authorization header and answer with the
/// matching user; any cross-contamination either misses both mocks (404
/// from wiremock, surfaced as an upstream error) or returns the wrong
/// username, and the assertions catch both.
#[tokio::test]
async fn test_concurrent_sessions_keep_credentials_isolated() -> Result<()> {
    let gateway = TestGateway::spawn().await?;

    current_user_mock("token-alice", "alice")
        .mount(&gateway.auth_mock)
        .await;
    current_user_mock("token-bob", "bob")
        .mount(&gateway.auth_mock)
        .await;

    let client = reqwest::Client::new();
    let alice_cookie = gateway.session_cookie_for(1, "alice", "token-alice");
    let bob_cookie = gateway.session_cookie_for(2, "bob", "token-bob");

    let mut requests = Vec::new();
    for i in 0..40 {
        let client = client.clone();
        let url = format!("{}/api/gateway/v1/auth/currentuser", gateway.url());
        let (cookie, expected) = if i % 2 == 0 {
            (alice_cookie.clone(), "alice")
        } else {
            (bob_cookie.clone(), "bob")
        };

        requests.push(async move {
            let response = client.get(url).header("Cookie", cookie).send().await?;
            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            anyhow::Ok((status, body, expected))
        });
    }

    for result in futures::future::join_all(requests).await {
        let (status, body, expected) = result?;
        assert_eq!(status, 200);
        assert_eq!(
            body["user"]["username"], expected,
            "A caller received a response for someone else's credential"
        );
    }

    Ok(())
}
