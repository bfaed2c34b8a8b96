//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: Access/Refresh 토큰 발급 및 Claims 추출
//! - [`PolicyEnforcer`]: Casbin 모델 파일 + 정책 CSV 기반 `(role, path, method)` 판정
//! - [`permission_middleware`]: 보호된 라우트 그룹에 적용되는 미들웨어
//! - [`CurrentUser`], [`AuthClaims`]: 핸들러용 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/user/get_profile", get(get_profile))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), permission_middleware));
//! ```

mod jwt;
mod middleware;
mod password;
mod policy;

pub use jwt::{strip_bearer, AccessClaims, JwtError, RefreshClaims, TokenCodec, TokenPair};
pub use middleware::{permission_middleware, AuthClaims, CurrentUser};
pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{PolicyEnforcer, PolicyError, PolicyRule};
