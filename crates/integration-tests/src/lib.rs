//! Integration tests for Marketstall.
//!
//! Each test starts the full storefront router on an ephemeral port, backed by
//! an in-memory session store and a mock commerce backend, and talks to it
//! over HTTP with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketstall-integration-tests
//! ```
//!
//! No database is needed: the session pool connects lazily and only the
//! readiness check would touch it.
//!
//! # Test Categories
//!
//! - `guest_lists` - Guest cart and wishlist behavior
//! - `login_merge` - Sign-in, merge, retry and sign-out

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower_sessions::MemoryStore;
use url::Url;

use marketstall_core::ListKind;
use marketstall_storefront::config::{BackendConfig, DEFAULT_GUEST_STORE_QUOTA, StorefrontConfig};
use marketstall_storefront::middleware::create_session_layer;
use marketstall_storefront::state::AppState;

/// Password the mock backend accepts for any email.
pub const VALID_PASSWORD: &str = "correct horse battery";

/// Token the mock backend issues on sign-in.
pub const CUSTOMER_TOKEN: &str = "tok_integration";

const SESSION_SECRET: &str = "kR7#pX2$vN9@mQ4&wL6*jT8!hF3^zB5%qD1(eY0)uG7+sA4=cM2?oI9<tH6>nW3~";

/// One bulk-sync call the mock backend received.
#[derive(Debug, Clone)]
pub struct SyncCall {
    pub list: String,
    pub authorization: Option<String>,
    pub payload: Value,
}

#[derive(Debug, Default)]
struct MockState {
    syncs: Vec<SyncCall>,
    failing: HashSet<String>,
    totals_calls: usize,
}

/// In-process stand-in for the commerce backend API.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Make bulk sync of `kind` fail with 503 (or succeed again).
    pub fn fail_sync(&self, kind: ListKind, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(kind.as_str().to_string());
        } else {
            state.failing.remove(kind.as_str());
        }
    }

    /// All successful sync calls, oldest first.
    #[must_use]
    pub fn syncs(&self) -> Vec<SyncCall> {
        self.lock().syncs.clone()
    }

    /// Successful sync calls for one list.
    #[must_use]
    pub fn syncs_for(&self, kind: ListKind) -> Vec<SyncCall> {
        self.syncs()
            .into_iter()
            .filter(|call| call.list == kind.as_str())
            .collect()
    }

    /// How many totals requests reached the backend.
    #[must_use]
    pub fn totals_calls(&self) -> usize {
        self.lock().totals_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login", post(mock_login))
            .route("/api/cart/totals", post(mock_totals))
            .route("/api/{list}/sync", post(mock_sync))
            .with_state(self.clone())
    }
}

async fn mock_login(Json(body): Json<Value>) -> Response {
    if body["password"] != VALID_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response();
    }

    Json(json!({
        "token": CUSTOMER_TOKEN,
        "customer": {
            "id": "cus_1001",
            "email": body["email"],
            "firstName": "Test",
            "lastName": "Customer"
        }
    }))
    .into_response()
}

async fn mock_sync(
    State(backend): State<MockBackend>,
    Path(list): Path<String>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let mut state = backend.lock();
    if state.failing.contains(&list) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "sync temporarily unavailable"})),
        )
            .into_response();
    }

    state.syncs.push(SyncCall {
        list,
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        payload,
    });
    Json(json!({"ok": true})).into_response()
}

async fn mock_totals(State(backend): State<MockBackend>, Json(payload): Json<Value>) -> Json<Value> {
    backend.lock().totals_calls += 1;

    let units: u64 = payload["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["quantity"].as_u64()).sum())
        .unwrap_or_default();
    let subtotal = format!("{units}.00");
    let zero = json!({"amount": "0.00", "currencyCode": "USD"});

    Json(json!({
        "subtotal": {"amount": subtotal, "currencyCode": "USD"},
        "discount": zero,
        "tax": zero,
        "shipping": zero,
        "total": {"amount": subtotal, "currencyCode": "USD"}
    }))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });
    addr
}

/// A running storefront with its mock backend and a cookie-keeping client.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub backend: MockBackend,
}

impl TestContext {
    /// Start a storefront with default settings.
    pub async fn new() -> Self {
        Self::with_quota(DEFAULT_GUEST_STORE_QUOTA).await
    }

    /// Start a storefront whose guest lists are limited to `quota` bytes.
    pub async fn with_quota(quota: usize) -> Self {
        let backend = MockBackend::default();
        let backend_addr = serve(backend.router()).await;

        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/marketstall_test".to_string()),
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            session_secret: SecretString::from(SESSION_SECRET.to_string()),
            backend: BackendConfig {
                base_url: Url::parse(&format!("http://{backend_addr}/api/"))
                    .expect("Invalid backend URL"),
                service_token: Some(SecretString::from("svc_integration".to_string())),
                timeout: Duration::from_secs(5),
                totals_cache_ttl: Duration::from_secs(60),
            },
            guest_store_quota: quota,
            rate_limit: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };

        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/marketstall_test")
            .expect("Invalid database URL");
        let session_layer = create_session_layer(MemoryStore::default(), &config)
            .expect("Invalid session secret");
        let state = AppState::new(config, pool).expect("Failed to build app state");
        let addr = serve(marketstall_storefront::app(state, session_layer)).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
            backend,
        }
    }

    /// `GET path`, returning status and JSON body (`Null` when empty).
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("GET request failed");
        read(resp).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("POST request failed");
        read(resp).await
    }

    /// Add `quantity` of a product to `list` and return the response body.
    pub async fn add(&self, list: &str, item_id: &str, quantity: i64, variant: &Value) -> Value {
        let mut body = json!({"itemId": item_id, "kind": "product", "quantity": quantity});
        if let (Some(body), Some(variant)) = (body.as_object_mut(), variant.as_object()) {
            body.extend(variant.clone());
        }

        let (status, json) = self.post(&format!("/{list}/add"), &body).await;
        assert_eq!(status, StatusCode::OK, "add failed: {json}");
        json
    }

    /// Sign in with `password`.
    pub async fn login(&self, password: &str) -> (StatusCode, Value) {
        self.post(
            "/auth/login",
            &json!({"email": "Shopper@Example.com", "password": password}),
        )
        .await
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = resp.bytes().await.expect("Failed to read response body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
