//! ---
//! pas_section: "05-networking-external-interfaces"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Networking API surface for external integrations."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use w_pas_common::version::VersionInfo;
use w_pas_policy::audit::DecisionLog;
use w_pas_policy::catalog::{Action, CategoryCatalog};
use w_pas_policy::directory::RoleDirectory;
use w_pas_policy::enforce::{authorize, Decision, DecisionReason};
use w_pas_policy::map::{Overrides, PermissionMap};
use w_pas_policy::metrics::AccessMetrics;

/// Header carrying the caller's role on admin routes.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

const SERVICE_NAME: &str = "w-pasd";
const ADMIN_READ_KEY: &str = "Admin.view";
const ADMIN_WRITE_KEY: &str = "Admin.edit";

/// Shared API state exposed to handlers.
pub struct ApiState {
    catalog: Arc<CategoryCatalog>,
    directory: RoleDirectory,
    metrics: AccessMetrics,
    audit: Option<Mutex<DecisionLog>>,
    version: VersionInfo,
    start: Instant,
}

impl ApiState {
    pub fn new(
        directory: RoleDirectory,
        metrics: AccessMetrics,
        audit: Option<DecisionLog>,
        version: VersionInfo,
    ) -> Self {
        Self {
            catalog: directory.catalog(),
            directory,
            metrics,
            audit: audit.map(Mutex::new),
            version,
            start: Instant::now(),
        }
    }

    fn status(&self) -> StatusResponse {
        StatusResponse {
            service: SERVICE_NAME,
            version: self.version.cli_string(),
            git_sha: self.version.git_sha.clone(),
            uptime_seconds: self.start.elapsed().as_secs(),
            catalog_paths: self.catalog.len(),
            roles: self.directory.len(),
        }
    }

    /// Produce one decision, feeding the counters and the audit trail.
    ///
    /// Every decision issued over HTTP flows through here, including the
    /// ones the admin guard makes about its own callers.
    fn decide(&self, actor_role: Option<&str>, key: Option<&str>) -> Decision {
        let map = actor_role.and_then(|role| self.directory.resolved_map(role));
        let decision = authorize(actor_role, map.as_ref(), key);
        self.metrics.record(&decision);
        if let Some(log) = &self.audit {
            if let Err(err) = log.lock().append(actor_role, key, decision) {
                error!(error = %err, "failed to append decision audit record");
            }
        }
        decision
    }

    /// Gate an admin route on the caller's own grant for `required_key`.
    fn guard_admin(&self, headers: &HeaderMap, required_key: &str) -> Result<(), ApiError> {
        let actor_role = headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|value| value.to_str().ok());
        let decision = self.decide(actor_role, Some(required_key));
        if decision.allow {
            return Ok(());
        }
        match decision.reason {
            DecisionReason::Unauthenticated => Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                format!("admin routes require the {ACTOR_ROLE_HEADER} header"),
            )),
            _ => {
                warn!(actor_role = ?actor_role, required_key, "admin route denied");
                Err(ApiError::new(
                    StatusCode::FORBIDDEN,
                    "actor role lacks the required administrative grant",
                ))
            }
        }
    }
}

impl fmt::Debug for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState")
            .field("version", &self.version)
            .field("roles", &self.directory.len())
            .finish_non_exhaustive()
    }
}

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Spawn the REST decision and administration surface.
pub fn spawn_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<ApiServer> {
    let router = Router::new()
        .route("/api/status", get(get_status))
        .route("/api/catalog", get(get_catalog))
        .route("/api/authorize", post(post_authorize))
        .route("/api/roles", get(get_roles))
        .route(
            "/api/roles/:name/permissions",
            get(get_role_permissions).put(put_role_permissions),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind API listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure API listener as non-blocking")?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;
    let local_addr = tcp_listener
        .local_addr()
        .context("failed to resolve API listener address")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %local_addr, "api server listening");
        if let Err(err) = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %local_addr, error = %err, "api server exited with error");
            return Err(err.into());
        }
        Ok(())
    });

    Ok(ApiServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    service: &'static str,
    version: String,
    git_sha: String,
    uptime_seconds: u64,
    catalog_paths: usize,
    roles: usize,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    paths: Vec<String>,
    actions: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct AuthorizeRequest {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Serialize)]
struct RoleSummary {
    name: String,
    has_overrides: bool,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct RolePermissionsResponse {
    role: String,
    overrides: Option<serde_json::Value>,
    resolved: PermissionMap,
}

#[derive(Debug, Serialize)]
struct OverridesAck {
    applied: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(state.status())
}

async fn get_catalog(State(state): State<Arc<ApiState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        paths: state
            .catalog
            .paths()
            .map(|path| path.as_str().to_owned())
            .collect(),
        actions: Action::ALL.iter().map(Action::as_str).collect(),
    })
}

/// Decision oracle for calling route layers. Always `200`: the caller maps
/// the decision onto its own status codes.
async fn post_authorize(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AuthorizeRequest>,
) -> Json<Decision> {
    let decision = state.decide(request.role.as_deref(), request.key.as_deref());
    Json(decision)
}

async fn get_roles(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleSummary>>, ApiError> {
    state.guard_admin(&headers, ADMIN_READ_KEY)?;
    let summaries = state
        .directory
        .list_roles()
        .into_iter()
        .map(|record| RoleSummary {
            has_overrides: record.overrides.is_some(),
            name: record.name,
            updated_at: record.updated_at,
        })
        .collect();
    Ok(Json(summaries))
}

async fn get_role_permissions(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RolePermissionsResponse>, ApiError> {
    state.guard_admin(&headers, ADMIN_READ_KEY)?;
    let record = state
        .directory
        .get_role(&name)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("unknown role {name}")))?;
    let resolved = state
        .directory
        .resolved_map(&name)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("unknown role {name}")))?;
    // Stored blobs are kept verbatim; surface malformed ones as raw strings
    // rather than hiding them.
    let overrides = record.overrides.map(|blob| {
        serde_json::from_str::<serde_json::Value>(&blob)
            .unwrap_or(serde_json::Value::String(blob))
    });
    Ok(Json(RolePermissionsResponse {
        role: record.name,
        overrides,
        resolved,
    }))
}

async fn put_role_permissions(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<OverridesAck>, ApiError> {
    state.guard_admin(&headers, ADMIN_WRITE_KEY)?;
    Overrides::parse(&body).map_err(|err| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid override blob: {err}"),
        )
    })?;
    state.directory.upsert_role(&name);
    state
        .directory
        .set_overrides(&name, Some(body))
        .map_err(|err| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    info!(role = %name, "role overrides replaced");
    Ok(Json(OverridesAck { applied: true }))
}
