//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 흐름 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::counter;
use metrics::histogram;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// 가입 단계 라벨.
pub mod stage {
    /// 인증 코드 발송 후 대기 레코드 저장 완료
    pub const CODE_SENT: &str = "code_sent";
    /// 코드 확인 후 백엔드 가입 완료
    pub const COMPLETED: &str = "completed";
    /// 코드 불일치
    pub const CODE_MISMATCH: &str = "code_mismatch";
}

/// Prometheus 메트릭 레코더를 설치하고 핸들을 반환합니다.
///
/// 레코더는 프로세스당 한 번만 설치할 수 있습니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 가입 흐름 단계별 카운터 증가. `stage`는 [`stage`] 모듈의 상수.
pub fn record_registration(stage: &'static str) {
    counter!("auth_registrations_total", "stage" => stage).increment(1);
}

/// 정책 거부 카운터 증가.
pub fn record_permission_denied(role: &str) {
    counter!("auth_permission_denied_total", "role" => role.to_string()).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/post/getBy/123e4567-e89b-12d3-a456-426614174000` → `/post/getBy/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        assert_eq!(
            normalize_path("/post/getBy/123e4567-e89b-12d3-a456-426614174000"),
            "/post/getBy/:id"
        );
    }

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/like/post/count/42"), "/like/post/count/:id");
    }

    #[test]
    fn test_normalize_path_static() {
        assert_eq!(normalize_path("/user/get_profile"), "/user/get_profile");
        assert_eq!(normalize_path("/post/country/KR"), "/post/country/KR");
        assert_eq!(normalize_path("/"), "/");
    }
}
