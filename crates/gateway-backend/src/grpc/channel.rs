//! gRPC 채널과 unary 호출 헬퍼.
//!
//! 코드 생성 없이 `tonic::client::Grpc` 위에서 `ProstCodec`으로 직접 호출합니다.
//! 채널은 지연 연결(lazy)이므로 백엔드가 아직 떠 있지 않아도 게이트웨이는 기동됩니다.

use std::time::Duration;

use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use tracing::{debug, warn};

use crate::error::{BackendError, BackendResult};

/// 백엔드 연결 설정.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    /// 백엔드 URL (예: `http://127.0.0.1:8085`)
    pub url: String,
    /// 요청 타임아웃
    pub request_timeout: Duration,
    /// 연결 타임아웃
    pub connect_timeout: Duration,
}

impl ChannelSettings {
    /// 초 단위 타임아웃으로 설정을 생성합니다.
    pub fn new(url: impl Into<String>, request_timeout_secs: u64, connect_timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            request_timeout: Duration::from_secs(request_timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        }
    }
}

/// 지연 연결 채널 위의 unary gRPC 클라이언트.
///
/// `Channel`은 내부적으로 버퍼링되므로 호출마다 복제해서 사용합니다.
#[derive(Clone)]
pub struct UnaryClient {
    grpc: Grpc<Channel>,
    target: String,
}

impl UnaryClient {
    /// 채널을 생성합니다. 실제 연결은 첫 호출 시점에 이루어집니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다.
    ///
    /// # Errors
    ///
    /// URL 형식이 잘못되면 [`BackendError::InvalidEndpoint`].
    pub fn connect_lazy(settings: &ChannelSettings) -> BackendResult<Self> {
        let channel = Endpoint::from_shared(settings.url.clone())?
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .connect_lazy();

        debug!(target_url = %settings.url, "gRPC channel created (lazy)");

        Ok(Self {
            grpc: Grpc::new(channel),
            target: settings.url.clone(),
        })
    }

    /// 대상 백엔드 URL.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// unary RPC 한 번을 수행합니다.
    ///
    /// # Arguments
    ///
    /// * `path` - 전체 메서드 경로 (예: `/user.UserService/Register`)
    /// * `message` - 요청 메시지
    pub async fn unary<Req, Resp>(&self, path: &'static str, message: Req) -> BackendResult<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.grpc.clone();
        grpc.ready().await.map_err(|e| {
            warn!(target_url = %self.target, path, error = %e, "gRPC channel not ready");
            BackendError::Unavailable(e.to_string())
        })?;

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(Request::new(message), PathAndQuery::from_static(path), codec)
            .await
            .map_err(|status| {
                debug!(path, code = ?status.code(), message = %status.message(), "gRPC call failed");
                BackendError::from(status)
            })?;

        Ok(response.into_inner())
    }
}
