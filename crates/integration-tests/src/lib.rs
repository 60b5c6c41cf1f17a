//! Integration tests for Masterferri.
//!
//! # Running Tests
//!
//! ```bash
//! # Everything except the database tests
//! cargo test -p masterferri-integration-tests
//!
//! # Including the PostgreSQL token store (needs STOREFRONT_DATABASE_URL)
//! cargo test -p masterferri-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `refresh_coordination` - 401 recovery and single-flight token refresh
//! - `product_catalog` - Retry schedule, price filtering, caching
//! - `storefront_api` - HTTP surface served on an ephemeral port
//! - `token_store` - `PostgreSQL` token persistence (ignored by default)
//!
//! Bling is replaced by a `wiremock` server in every test.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use masterferri_storefront::bling::{
    BlingClient, MemoryTokenStore, ProductService, RetryPolicy, TokenRecord,
};
use masterferri_storefront::config::{BlingConfig, StorefrontConfig};
use masterferri_storefront::routes;
use masterferri_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::MockServer;

/// WhatsApp number used by test configurations.
pub const STORE_NUMBER: &str = "5511999998888";

/// Token record with the given pair that never expires.
#[must_use]
pub fn token_record(access: &str, refresh: &str) -> TokenRecord {
    TokenRecord {
        access_token: SecretString::from(access.to_string()),
        refresh_token: SecretString::from(refresh.to_string()),
        token_type: "Bearer".to_string(),
        scope: None,
        expires_in: 21_600,
        expires_at: i64::MAX,
    }
}

/// Bling configuration pointing at the mock server.
#[must_use]
pub fn bling_config(server: &MockServer) -> BlingConfig {
    BlingConfig::new(server.uri(), "client", SecretString::from("secret"))
}

/// Retry policy with the default attempt count but 1ms delays.
#[must_use]
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, vec![Duration::from_millis(1); 4])
}

/// A product in Bling's list form.
#[must_use]
pub fn product_json(id: i64, price: u32) -> Value {
    json!({
        "id": id,
        "nome": format!("Peça {id}"),
        "codigo": format!("MF-{id}"),
        "preco": price,
        "estoque": { "saldoVirtualTotal": 3 },
        "tipo": "P",
        "situacao": "A",
        "formato": "S"
    })
}

/// A product in Bling's detail form.
#[must_use]
pub fn product_detail_json(id: i64) -> Value {
    json!({
        "id": id,
        "nome": format!("Peça {id}"),
        "codigo": format!("MF-{id}"),
        "preco": 89.9,
        "tipo": "P",
        "situacao": "A",
        "formato": "S",
        "marca": "Bosch",
        "categoria": { "id": 7 },
        "estoque": { "saldoVirtualTotal": 2 },
        "midia": {
            "imagens": {
                "externas": [{ "link": "https://cdn.example.com/a.jpg" }]
            }
        }
    })
}

/// Mock Bling server with a catalog service wired to it.
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryTokenStore>,
    pub client: BlingClient,
    pub catalog: ProductService,
}

impl TestContext {
    /// Start a mock Bling with the token pair `old` / `r1` stored.
    pub async fn new() -> Self {
        Self::with_store(MemoryTokenStore::with_record(token_record("old", "r1"))).await
    }

    /// Start a mock Bling with the given token store.
    pub async fn with_store(store: MemoryTokenStore) -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(store);
        let client = BlingClient::new(bling_config(&server), store.clone()).unwrap();
        let catalog = ProductService::with_retry_policy(client.clone(), fast_retry());
        Self {
            server,
            store,
            client,
            catalog,
        }
    }

    /// Application state over this context's catalog.
    #[must_use]
    pub fn state(&self) -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            bling: bling_config(&self.server),
            whatsapp_number: STORE_NUMBER.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::new(config, self.catalog.clone())
    }

    /// Serve the storefront on an ephemeral port and return its base URL.
    pub async fn spawn_app(&self) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let app = routes::app(self.state());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Number of requests the mock received for a path.
    pub async fn hits(&self, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }
}
