//! 可观测性模块
//!
//! 提供简单指标、结构化日志和健康检查。

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::config::LoggingConfig;
use crate::error::{AppError, Result};

// ===== Simple Metrics =====

/// 简单应用指标
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub chat_requests_total: AtomicU64,
    pub chat_failures_total: AtomicU64,
    pub empty_messages_total: AtomicU64,
    pub chat_latency_ms_sum: AtomicU64,
}

impl AppMetrics {
    /// 记录聊天请求
    pub fn record_chat_request(&self) {
        self.chat_requests_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录生成失败
    pub fn record_chat_failure(&self) {
        self.chat_failures_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录空消息
    pub fn record_empty_message(&self) {
        self.empty_messages_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录生成耗时
    pub fn record_chat_latency(&self, duration_ms: u64) {
        self.chat_latency_ms_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
    }

    /// 生成 Prometheus 文本格式指标
    pub fn gather(&self) -> String {
        format!(
            r#"# HELP chat_requests_total Total chat requests
# TYPE chat_requests_total counter
chat_requests_total {}
# HELP chat_failures_total Chat requests whose generation failed
# TYPE chat_failures_total counter
chat_failures_total {}
# HELP empty_messages_total Blank messages answered without generation
# TYPE empty_messages_total counter
empty_messages_total {}
# HELP chat_latency_seconds_sum Total time spent generating replies
# TYPE chat_latency_seconds_sum counter
chat_latency_seconds_sum {}
"#,
            self.chat_requests_total.load(Ordering::SeqCst),
            self.chat_failures_total.load(Ordering::SeqCst),
            self.empty_messages_total.load(Ordering::SeqCst),
            self.chat_latency_ms_sum.load(Ordering::SeqCst) as f64 / 1000.0,
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub fragments: usize,
}

/// 可观测性路由状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub start_time: DateTime<Utc>,
    pub version: String,
    pub fragments: usize,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: Arc<AppMetrics>, fragments: usize) -> Self {
        Self {
            metrics,
            start_time: Utc::now(),
            version,
            fragments,
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        fragments: state.fragments,
    })
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    state.metrics.gather()
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化结构化日志
///
/// `RUST_LOG` 优先于配置中的级别。配置了 `log_dir` 时额外按天写入滚动日志文件，
/// 返回的 guard 需要保持到进程退出。
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},{}={}", config.level, service_name, config.level)))
        .map_err(|e| AppError::Config(format!("invalid log filter: {}", e)))?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (json_layer, text_layer) = if config.json {
        (Some(fmt::layer().json().with_target(true)), None)
    } else {
        (
            None,
            Some(fmt::layer().with_target(true).with_line_number(true)),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("tracing already initialized: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::Request};
    use tower::ServiceExt;

    #[test]
    fn test_metrics_gather() {
        let metrics = AppMetrics::default();
        metrics.record_chat_request();
        metrics.record_chat_request();
        metrics.record_chat_failure();
        metrics.record_empty_message();
        metrics.record_chat_latency(1500);

        let output = metrics.gather();
        assert!(output.contains("chat_requests_total 2"));
        assert!(output.contains("chat_failures_total 1"));
        assert!(output.contains("empty_messages_total 1"));
        assert!(output.contains("chat_latency_seconds_sum 1.5"));
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_fragments() {
        let state = Arc::new(ObservabilityState::new(
            "0.1.0".to_string(),
            Arc::new(AppMetrics::default()),
            42,
        ));
        let app = create_observability_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["fragments"], 42);
        assert_eq!(json["version"], "0.1.0");
    }

    #[tokio::test]
    async fn test_liveness_metrics_and_version_routes() {
        let metrics = Arc::new(AppMetrics::default());
        metrics.record_chat_request();
        metrics.record_chat_failure();
        let app = create_observability_router(Arc::new(ObservabilityState::new(
            "0.1.0".to_string(),
            metrics,
            3,
        )));

        let get = |uri: &str| {
            Request::builder()
                .uri(uri)
                .body(axum::body::Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");

        let response = app.clone().oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("chat_requests_total 1"));
        assert!(text.contains("chat_failures_total 1"));
        assert!(text.contains("empty_messages_total 0"));

        let response = app.oneshot(get("/version")).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["version"], "0.1.0");
        assert!(json["uptime_seconds"].is_number());
    }
}
