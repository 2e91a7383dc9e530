//! Server hand-off.
//!
//! The startup pipeline ends by giving the resolved user settings and the
//! selected backends to a [`ServerCreator`]. The default creator serves a
//! small axum router; tests substitute their own creator.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tl_core::{AuthProvider, DatabaseEngine, StorageResolver};
use tokio::net::TcpListener;
use tracing::info;

/// Settings the server itself consumes.
#[derive(Clone, PartialEq, Eq)]
pub struct UserConfig {
    pub log_level: String,
    pub port: u16,
    pub url: String,
    pub token_signing_secret: String
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("log_level", &self.log_level)
            .field("port", &self.port)
            .field("url", &self.url)
            .field("token_signing_secret", &"***")
            .finish()
    }
}

/// Backends selected at startup.
#[derive(Debug)]
pub struct Dependencies {
    pub database: Box<dyn DatabaseEngine>,
    pub auth: Box<dyn AuthProvider>,
    pub modules_storage: Box<dyn StorageResolver>,
    pub providers_storage: Box<dyn StorageResolver>,
    /// Set by the hidden `debug` flag.
    pub debug: bool
}

/// A server ready to run.
#[async_trait]
pub trait Starter: Send {
    async fn start(self: Box<Self>) -> anyhow::Result<()>;
}

/// Builds the server from the resolved configuration.
pub trait ServerCreator {
    fn new_server(&self, user: UserConfig, deps: Dependencies) -> anyhow::Result<Box<dyn Starter>>;
}

/// Creator of the real HTTP server.
#[derive(Debug, Default)]
pub struct DefaultCreator;

impl ServerCreator for DefaultCreator {
    fn new_server(&self, user: UserConfig, deps: Dependencies) -> anyhow::Result<Box<dyn Starter>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], user.port));
        Ok(Box::new(Server {
            addr,
            state: Arc::new(AppState { user, deps })
        }))
    }
}

#[derive(Debug)]
pub struct AppState {
    pub user: UserConfig,
    pub deps: Dependencies
}

pub struct Server {
    addr: SocketAddr,
    state: Arc<AppState>
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "database": state.deps.database.backend(),
        "auth": state.deps.auth.name(),
        "modules_storage": state.deps.modules_storage.name(),
        "providers_storage": state.deps.providers_storage.name()
    }))
}

#[async_trait]
impl Starter for Server {
    async fn start(self: Box<Self>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind to {}: {e}", self.addr))?;

        info!(
            addr = %self.addr,
            url = %self.state.user.url,
            database = %self.state.deps.database.describe(),
            "Terralist server starting"
        );

        axum::serve(listener, create_router(self.state.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Terralist server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[derive(Debug)]
    struct Fake(&'static str);

    impl DatabaseEngine for Fake {
        fn backend(&self) -> &'static str {
            self.0
        }

        fn dsn(&self) -> &str {
            "fake://"
        }
    }

    impl AuthProvider for Fake {
        fn name(&self) -> &'static str {
            self.0
        }

        fn authorize_url(&self, _state: &str) -> String {
            String::new()
        }
    }

    impl StorageResolver for Fake {
        fn name(&self) -> &'static str {
            self.0
        }

        fn locate(&self, key: &str) -> String {
            key.to_string()
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            user: UserConfig {
                log_level: "info".to_string(),
                port: 5758,
                url: "http://localhost:5758".to_string(),
                token_signing_secret: "hunter2".to_string()
            },
            deps: Dependencies {
                database: Box::new(Fake("sqlite")),
                auth: Box::new(Fake("github")),
                modules_storage: Box::new(Fake("s3")),
                providers_storage: Box::new(Fake("proxy")),
                debug: false
            }
        })
    }

    #[tokio::test]
    async fn test_health_reports_backends() {
        let response = create_router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "sqlite");
        assert_eq!(json["modules_storage"], "s3");
        assert_eq!(json["providers_storage"], "proxy");
    }

    #[test]
    fn test_user_config_debug_hides_secret() {
        let rendered = format!("{:?}", state().user);
        assert!(!rendered.contains("hunter2"));
    }
}
