//! 역할 기반 접근 제어 (RBAC) 정책.
//!
//! Casbin 모델 파일과 정책 CSV를 시작 시 한 번 읽어 [`casbin::Enforcer`]로
//! 보관합니다. 매칭 규칙은 전부 모델 파일이 정합니다.
//!
//! # 모델 파일
//!
//! ```text
//! [request_definition]
//! r = sub, obj, act
//!
//! [policy_definition]
//! p = sub, obj, act
//!
//! [role_definition]
//! g = _, _
//!
//! [policy_effect]
//! e = some(where (p.eft == allow))
//!
//! [matchers]
//! m = g(r.sub, p.sub) && keyMatch2(r.obj, p.obj) && r.act == p.act
//! ```
//!
//! # 정책 CSV
//!
//! ```text
//! p, user, /user/get_profile, GET
//! p, admin, /admin/delete/:id, DELETE
//! g, admin, user
//! ```

use std::fmt;
use std::path::Path;

use casbin::{CoreApi, DefaultModel, Enforcer, FileAdapter, MemoryAdapter, MgmtApi};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to load access policy: {0}")]
    Load(#[source] casbin::Error),
    #[error("failed to update access policy: {0}")]
    Update(#[source] casbin::Error),
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
}

/// 정책 규칙 한 줄 (`p, role, path, method`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub role: String,
    pub path: String,
    pub method: String,
}

impl PolicyRule {
    pub fn new(role: impl Into<String>, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            path: path.into(),
            method: method.into(),
        }
    }

    fn into_params(self) -> Vec<String> {
        vec![self.role, self.path, self.method]
    }
}

/// 정책 판정기.
///
/// 로드 후에는 읽기 전용이며 `Arc`로 공유됩니다.
pub struct PolicyEnforcer {
    inner: Enforcer,
}

impl fmt::Debug for PolicyEnforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyEnforcer")
            .field("rules", &self.rule_count())
            .finish()
    }
}

impl PolicyEnforcer {
    /// 모델 파일과 정책 CSV를 읽어 판정기를 만듭니다.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Casbin 모델 파일 경로
    /// * `policy_path` - 정책 CSV 경로
    pub async fn load(
        model_path: impl AsRef<Path>,
        policy_path: impl AsRef<Path>,
    ) -> Result<Self, PolicyError> {
        let model_path = model_path.as_ref();
        let policy_path = policy_path.as_ref();

        let model = DefaultModel::from_file(model_path)
            .await
            .map_err(PolicyError::Load)?;
        let adapter = FileAdapter::new(policy_path.to_path_buf());
        let inner = Enforcer::new(model, adapter)
            .await
            .map_err(PolicyError::Load)?;
        let enforcer = Self { inner };

        info!(
            model = %model_path.display(),
            policy = %policy_path.display(),
            rules = enforcer.rule_count(),
            "Access policy loaded"
        );
        Ok(enforcer)
    }

    /// 모델 텍스트와 규칙 목록으로 메모리 판정기를 만듭니다.
    pub async fn from_rules(model: &str, rules: Vec<PolicyRule>) -> Result<Self, PolicyError> {
        let model = DefaultModel::from_str(model)
            .await
            .map_err(PolicyError::Load)?;
        let mut inner = Enforcer::new(model, MemoryAdapter::default())
            .await
            .map_err(PolicyError::Load)?;

        if !rules.is_empty() {
            inner
                .add_policies(rules.into_iter().map(PolicyRule::into_params).collect())
                .await
                .map_err(PolicyError::Update)?;
        }
        Ok(Self { inner })
    }

    /// `g, child, parent` 상속 관계를 추가합니다.
    pub async fn add_role_inheritance(
        &mut self,
        child: impl Into<String>,
        parent: impl Into<String>,
    ) -> Result<(), PolicyError> {
        self.inner
            .add_grouping_policy(vec![child.into(), parent.into()])
            .await
            .map_err(PolicyError::Update)?;
        Ok(())
    }

    /// 로드된 `p` 규칙 수.
    pub fn rule_count(&self) -> usize {
        self.inner.get_policy().len()
    }

    /// `(role, path, method)` 요청을 허용하는 규칙이 있으면 `true`.
    ///
    /// # Errors
    ///
    /// 매처 평가가 실패하면 [`PolicyError::Evaluation`]. 오류는 허용으로 취급하지 않습니다.
    pub fn enforce(&self, role: &str, path: &str, method: &str) -> Result<bool, PolicyError> {
        let allowed = self
            .inner
            .enforce((role, path, method))
            .map_err(|e| PolicyError::Evaluation(e.to_string()))?;

        debug!(role, path, method, allowed, "Policy evaluated");
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && keyMatch2(r.obj, p.obj) && r.act == p.act
"#;

    async fn enforcer() -> PolicyEnforcer {
        let mut enforcer = PolicyEnforcer::from_rules(
            MODEL,
            vec![
                PolicyRule::new("user", "/user/get_profile", "GET"),
                PolicyRule::new("user", "/post/getBy/:id", "GET"),
                PolicyRule::new("admin", "/admin/*", "DELETE"),
            ],
        )
        .await
        .unwrap();
        enforcer.add_role_inheritance("admin", "user").await.unwrap();
        enforcer
    }

    #[tokio::test]
    async fn test_rule_count() {
        assert_eq!(enforcer().await.rule_count(), 3);
    }

    #[tokio::test]
    async fn test_allow_and_deny() {
        let enforcer = enforcer().await;
        assert!(enforcer.enforce("user", "/user/get_profile", "GET").unwrap());
        assert!(!enforcer.enforce("user", "/user/get_profile", "POST").unwrap());
        assert!(!enforcer.enforce("user", "/admin/create", "DELETE").unwrap());
        assert!(!enforcer.enforce("guest", "/user/get_profile", "GET").unwrap());
    }

    #[tokio::test]
    async fn test_action_is_compared_as_written() {
        let enforcer = PolicyEnforcer::from_rules(
            MODEL,
            vec![PolicyRule::new("user", "/post/list", "*")],
        )
        .await
        .unwrap();
        assert!(!enforcer.enforce("user", "/post/list", "DELETE").unwrap());
        assert!(enforcer.enforce("user", "/post/list", "*").unwrap());
    }

    #[tokio::test]
    async fn test_path_params() {
        let enforcer = enforcer().await;
        assert!(enforcer.enforce("user", "/post/getBy/42", "GET").unwrap());
        assert!(enforcer.enforce("user", "/post/getBy/{id}", "GET").unwrap());
        assert!(!enforcer.enforce("user", "/post/getBy/1/extra", "GET").unwrap());
    }

    #[tokio::test]
    async fn test_inheritance_and_wildcard() {
        let enforcer = enforcer().await;
        assert!(enforcer.enforce("admin", "/admin/delete/7", "DELETE").unwrap());
        assert!(enforcer.enforce("admin", "/user/get_profile", "GET").unwrap());
        assert!(!enforcer.enforce("user", "/admin/delete/7", "DELETE").unwrap());
    }

    #[tokio::test]
    async fn test_extra_matcher_clause_is_applied() {
        let model = MODEL.replace(
            "r.act == p.act",
            "r.act == p.act && r.sub != \"user\"",
        );
        let enforcer = PolicyEnforcer::from_rules(
            &model,
            vec![PolicyRule::new("user", "/post/list", "GET")],
        )
        .await
        .unwrap();
        assert!(!enforcer.enforce("user", "/post/list", "GET").unwrap());
    }

    #[tokio::test]
    async fn test_or_matcher() {
        let model = MODEL.replace(
            "g(r.sub, p.sub) && keyMatch2(r.obj, p.obj) && r.act == p.act",
            "r.sub == p.sub || keyMatch2(r.obj, p.obj)",
        );
        let enforcer = PolicyEnforcer::from_rules(
            &model,
            vec![PolicyRule::new("user", "/post/list", "GET")],
        )
        .await
        .unwrap();
        assert!(enforcer.enforce("user", "/other", "POST").unwrap());
        assert!(!enforcer.enforce("guest", "/other", "POST").unwrap());
    }

    #[tokio::test]
    async fn test_exact_model() {
        let model = MODEL.replace(
            "g(r.sub, p.sub) && keyMatch2(r.obj, p.obj)",
            "r.sub == p.sub && r.obj == p.obj",
        );
        let enforcer = PolicyEnforcer::from_rules(
            &model,
            vec![PolicyRule::new("user", "/post/getBy/:id", "GET")],
        )
        .await
        .unwrap();
        assert!(!enforcer.enforce("user", "/post/getBy/42", "GET").unwrap());
        assert!(enforcer.enforce("user", "/post/getBy/:id", "GET").unwrap());
    }

    #[tokio::test]
    async fn test_matcher_failure_is_an_error() {
        let model = MODEL.replace("keyMatch2(r.obj, p.obj)", "noSuchMatch(r.obj, p.obj)");
        let enforcer = PolicyEnforcer::from_rules(
            &model,
            vec![PolicyRule::new("user", "/post/list", "GET")],
        )
        .await
        .unwrap();

        assert!(matches!(
            enforcer.enforce("user", "/post/list", "GET"),
            Err(PolicyError::Evaluation(_))
        ));
    }

    #[tokio::test]
    async fn test_load_repository_policy() {
        let enforcer = PolicyEnforcer::load(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/model.conf"),
            concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/policy.csv"),
        )
        .await
        .unwrap();

        assert!(enforcer.rule_count() > 0);
        assert!(enforcer.enforce("user", "/post/delete/{id}", "DELETE").unwrap());
        assert!(enforcer.enforce("admin", "/user/get_profile", "GET").unwrap());
        assert!(!enforcer.enforce("user", "/admin/delete/{id}", "DELETE").unwrap());
    }

    #[tokio::test]
    async fn test_missing_file() {
        assert!(matches!(
            PolicyEnforcer::load("/nonexistent/model.conf", "/nonexistent/policy.csv").await,
            Err(PolicyError::Load(_))
        ));
    }
}
