//! Sentry webhook HTTP 服务
//!
//! - `POST /sentry-telegram/issue`  issue alert，按 `project_slug` 路由
//! - `POST /sentry-telegram/metric` metric alert，始终发往默认项目
//! - `GET /health`                  存活检查
//!
//! 已识别的 webhook 一律立即返回 204，投递在后台进行。
//! 处理器 panic 被捕获为 500，与其它错误一样通知默认 chat。

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::notification::dispatcher::NotificationDispatcher;
use crate::notification::event::{AlertEvent, MetricEvent};
use crate::notification::formatter::{format_issue, format_metric};
use crate::notification::sanitizer::escape_html;
use crate::project::{missing_project_message, ProjectRouter, Route};

pub const ISSUE_PATH: &str = "/sentry-telegram/issue";
pub const METRIC_PATH: &str = "/sentry-telegram/metric";

/// 请求间共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProjectRouter>,
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    pub fn new(router: ProjectRouter, dispatcher: NotificationDispatcher) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher,
        }
    }
}

/// 构建 axum 路由
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route(ISSUE_PATH, post(handle_issue).fallback(not_found))
        .route(METRIC_PATH, post(handle_metric).fallback(not_found))
        .route("/health", get(health))
        .fallback(not_found);
    with_error_handling(routes, state)
}

fn with_error_handling(routes: Router<AppState>, state: AppState) -> Router {
    let panic_state = state.clone();
    routes
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(&panic_state, panic)
        }))
        .with_state(state)
}

fn panic_response(state: &AppState, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    let err = RelayError::Internal(anyhow::anyhow!("handler panicked: {}", detail));
    respond(state, Err(err)).into_response()
}

/// 启动 HTTP 服务，直到进程退出
pub async fn serve(config: &RelayConfig, state: AppState) -> Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    info!(addr = %addr, dry_run = state.dispatcher.is_dry_run(), "Sentry webhook relay listening");

    axum::serve(listener, build_router(state))
        .await
        .context("HTTP server failed")?;
    Ok(())
}

#[instrument(name = "sentry.issue", skip_all, fields(project = tracing::field::Empty))]
async fn handle_issue(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let result = relay_issue(&state, &body);
    respond(&state, result)
}

#[instrument(name = "sentry.metric", skip_all)]
async fn handle_metric(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let result = relay_metric(&state, &body);
    respond(&state, result)
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

fn relay_issue(state: &AppState, body: &[u8]) -> Result<(), RelayError> {
    let alert: AlertEvent = parse_payload("issue", body)?;
    tracing::Span::current().record("project", alert.project_slug.as_deref().unwrap_or_default());

    match state.router.resolve(alert.project_slug.as_deref()) {
        Route::Project(entry) => {
            let text = format_issue(&alert, &entry.developers);
            info!(chat_id = %entry.chat_id, len = text.chars().count(), "Relaying issue alert");
            state.dispatcher.deliver(entry.chat_id.as_str(), text);
        }
        Route::Fallback { entry, missing } => {
            warn!(project = %missing, fallback = %entry.slug, "Unknown project, notifying fallback chat");
            state
                .dispatcher
                .deliver(entry.chat_id.as_str(), missing_project_message(&missing));
        }
    }
    Ok(())
}

fn relay_metric(state: &AppState, body: &[u8]) -> Result<(), RelayError> {
    let metric: MetricEvent = parse_payload("metric", body)?;
    let entry = state.router.fallback();
    if let Some(slug) = metric.project_slug.as_deref() {
        debug!(project = %slug, "Metric alerts always go to the default project");
    }

    let text = format_metric(&metric, &entry.developers);
    info!(chat_id = %entry.chat_id, len = text.chars().count(), "Relaying metric alert");
    state.dispatcher.deliver(entry.chat_id.as_str(), text);
    Ok(())
}

fn parse_payload<T: DeserializeOwned>(endpoint: &'static str, body: &[u8]) -> Result<T, RelayError> {
    debug!(endpoint, body = %String::from_utf8_lossy(body), "Received webhook");
    serde_json::from_slice(body).map_err(|source| RelayError::InvalidPayload { endpoint, source })
}

/// 成功返回 204；失败时记录日志、通知默认 chat，并返回错误状态码
fn respond(state: &AppState, result: Result<(), RelayError>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(err) => {
            error!(error = %err, status = err.status().as_u16(), "Webhook handling failed");
            let fallback = state.router.fallback();
            state
                .dispatcher
                .deliver(fallback.chat_id.as_str(), error_notification(&err));
            err.status()
        }
    }
}

/// 发往默认 chat 的错误通知
pub fn error_notification(err: &RelayError) -> String {
    format!(
        "Can't send notification, error: {}",
        escape_html(&err.to_json().to_string())
    )
}
