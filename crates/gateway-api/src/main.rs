//! API 게이트웨이 서버.
//!
//! 설정을 로드하고 백엔드 클라이언트, 가입 저장소, 코드 발송기를 구성한 뒤
//! Axum 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use gateway_api::auth::{PolicyEnforcer, TokenCodec};
use gateway_api::metrics::setup_metrics_recorder;
use gateway_api::middleware::metrics_layer;
use gateway_api::routes::create_api_router;
use gateway_api::state::{AppState, Buckets};
use gateway_backend::{ChannelSettings, GrpcFeedClient, GrpcIdentityClient, S3Storage};
use gateway_core::{init_logging, AppConfig, LogConfig, ServerConfig};
use gateway_data::connect_registration_store;
use gateway_notification::{CodeSender, EmailCodeSender, LogCodeSender};

/// CORS 레이어 생성.
///
/// `server.cors_origins`가 비어 있으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = server
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        warn!("No valid CORS origins configured, allowing any origin (development mode)");
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 와일드카드 origin에는 자격 증명을 허용할 수 없음
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
    server: &ServerConfig,
) -> Router {
    let api_router = create_api_router(state.clone()).with_state(state);

    let router = match metrics_handle {
        Some(handle) => Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(handle)
            .merge(api_router),
        None => api_router,
    };

    router
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .layer(cors_layer(server))
}

/// 코드 발송기 구성.
fn create_code_sender(config: &AppConfig) -> Result<Arc<dyn CodeSender>, Box<dyn std::error::Error>> {
    if config.email.enabled {
        let sender = EmailCodeSender::from_config(&config.email)?;
        info!(api_url = %config.email.api_url, "Email code sender configured");
        Ok(Arc::new(sender))
    } else {
        warn!("email.enabled = false, verification codes will only be logged");
        Ok(Arc::new(LogCodeSender))
    }
}

/// 설정으로부터 AppState 생성.
async fn create_app_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let enforcer =
        PolicyEnforcer::load(&config.policy.model_path, &config.policy.policy_path).await?;
    let tokens = TokenCodec::from_config(&config.jwt);

    let registration = connect_registration_store(&config.redis, &config.cache)
        .await
        .map_err(|e| {
            error!(error = %e, "Registration store unavailable");
            e
        })?;
    let code_sender = create_code_sender(config)?;

    let backends = &config.backends;
    let identity = GrpcIdentityClient::connect_lazy(&ChannelSettings::new(
        backends.identity_url.clone(),
        backends.request_timeout_secs,
        backends.connect_timeout_secs,
    ))?;
    let feed = GrpcFeedClient::connect_lazy(&ChannelSettings::new(
        backends.feed_url.clone(),
        backends.request_timeout_secs,
        backends.connect_timeout_secs,
    ))?;
    info!(
        identity = %backends.identity_url,
        feed = %backends.feed_url,
        "Backend channels configured"
    );

    let storage = S3Storage::from_config(&config.storage)?;

    let mut state = AppState::new(
        tokens,
        enforcer,
        registration.store,
        code_sender,
        Arc::new(identity),
        Arc::new(feed),
        Arc::new(storage),
    )
    .with_auth_settings(config.auth.clone())
    .with_buckets(Buckets::from_config(&config.storage));

    if let Some(cache) = registration.redis {
        state = state.with_redis(cache);
    }

    Ok(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;

    init_logging(LogConfig::from_settings(&config.logging))?;
    info!("Starting API gateway...");

    let metrics_handle = match setup_metrics_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            Some(handle)
        }
        Err(e) => {
            error!(error = %e, "Failed to install metrics recorder, /metrics disabled");
            None
        }
    };

    let addr: SocketAddr = config.server.bind_address().parse().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "Invalid bind address. Check server.host and server.port."
        );
        e
    })?;

    let state = Arc::new(create_app_state(&config).await?);
    info!(
        version = %state.version,
        policy_rules = state.enforcer.rule_count(),
        has_redis = state.has_redis(),
        code_sender = state.code_sender.name(),
        "Application state initialized"
    );

    let app = create_router(state, metrics_handle, &config.server);

    info!(%addr, "API gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
