//! 가입 대기 레코드와 비밀번호 재설정 코드 저장소.
//!
//! 두 키 공간은 서로 독립적이며, 각 항목은 설정된 TTL이 지나면 사라집니다.
//! 같은 키에 대한 쓰기는 마지막 쓰기가 이깁니다. 이메일 단위 잠금은 없습니다.
//!
//! # 구현
//!
//! - [`RedisRegistrationStore`]: 운영용. 키 `register:{email}`, `reset_code:{email}`
//! - [`MemoryRegistrationStore`]: 단일 프로세스/테스트용. `tokio::time::Instant` 기반 만료

use async_trait::async_trait;
use gateway_core::{CacheConfig, PendingRegistration, RedisSettings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{DataError, Result};
use crate::storage::redis::{RedisCache, RedisConfig};

/// 가입 대기 레코드 키.
pub fn registration_key(email: &str) -> String {
    format!("register:{}", email)
}

/// 비밀번호 재설정 코드 키.
pub fn reset_code_key(email: &str) -> String {
    format!("reset_code:{}", email)
}

/// 가입/재설정 흐름용 단기 저장소.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// 가입 대기 레코드를 저장합니다. 같은 이메일의 기존 레코드는 덮어씁니다.
    async fn set_register(&self, pending: &PendingRegistration) -> Result<()>;

    /// 가입 대기 레코드를 조회합니다.
    ///
    /// 없거나 만료된 경우 [`DataError::NotFoundOrExpired`].
    async fn get_register(&self, email: &str) -> Result<PendingRegistration>;

    /// 비밀번호 재설정 코드를 저장합니다.
    async fn set_code(&self, email: &str, code: &str) -> Result<()>;

    /// 비밀번호 재설정 코드를 조회합니다.
    async fn get_code(&self, email: &str) -> Result<String>;

    /// 비밀번호 재설정 코드를 삭제합니다. 삭제된 항목이 있었으면 true.
    async fn delete_code(&self, email: &str) -> Result<bool>;

    /// 저장소 이름 (헬스 체크/로그용).
    fn name(&self) -> &'static str;
}

// ==================== Redis ====================

/// Redis 기반 저장소.
#[derive(Clone)]
pub struct RedisRegistrationStore {
    cache: RedisCache,
    registration_ttl_secs: u64,
    reset_code_ttl_secs: u64,
}

impl RedisRegistrationStore {
    /// 새 저장소를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `cache` - 연결된 Redis 캐시
    /// * `registration_ttl_secs` - 가입 대기 레코드 TTL
    /// * `reset_code_ttl_secs` - 재설정 코드 TTL
    pub fn new(cache: RedisCache, registration_ttl_secs: u64, reset_code_ttl_secs: u64) -> Self {
        Self {
            cache,
            registration_ttl_secs,
            reset_code_ttl_secs,
        }
    }

    /// 내부 Redis 캐시 참조.
    pub fn cache(&self) -> &RedisCache {
        &self.cache
    }
}

#[async_trait]
impl RegistrationStore for RedisRegistrationStore {
    async fn set_register(&self, pending: &PendingRegistration) -> Result<()> {
        self.cache
            .set_with_ttl(
                &registration_key(&pending.email),
                pending,
                self.registration_ttl_secs,
            )
            .await
    }

    async fn get_register(&self, email: &str) -> Result<PendingRegistration> {
        let key = registration_key(email);
        self.cache
            .get(&key)
            .await?
            .ok_or(DataError::NotFoundOrExpired(key))
    }

    async fn set_code(&self, email: &str, code: &str) -> Result<()> {
        self.cache
            .set_with_ttl(&reset_code_key(email), code, self.reset_code_ttl_secs)
            .await
    }

    async fn get_code(&self, email: &str) -> Result<String> {
        let key = reset_code_key(email);
        self.cache
            .get(&key)
            .await?
            .ok_or(DataError::NotFoundOrExpired(key))
    }

    async fn delete_code(&self, email: &str) -> Result<bool> {
        self.cache.delete(&reset_code_key(email)).await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// ==================== In-memory ====================

/// 만료 시각이 붙은 값.
#[derive(Debug, Clone)]
struct Expiring<V> {
    value: V,
    expires_at: Instant,
}

/// 키별 만료를 지원하는 맵.
///
/// 만료 항목은 조회 시 제거되고, 삽입 시 TTL 주기마다 전체를 한 번 정리합니다.
#[derive(Debug)]
struct TtlMap<V> {
    inner: RwLock<Entries<V>>,
    ttl: Duration,
}

#[derive(Debug)]
struct Entries<V> {
    map: HashMap<String, Expiring<V>>,
    next_sweep: Instant,
}

impl<V: Clone> TtlMap<V> {
    fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Entries {
                map: HashMap::new(),
                next_sweep: Instant::now() + ttl,
            }),
            ttl,
        }
    }

    async fn insert(&self, key: String, value: V) {
        let now = Instant::now();
        let mut entries = self.inner.write().await;

        if now >= entries.next_sweep {
            let before = entries.map.len();
            entries.map.retain(|_, entry| entry.expires_at > now);
            entries.next_sweep = now + self.ttl;
            debug!(removed = before - entries.map.len(), "expired entries swept");
        }

        entries.map.insert(
            key,
            Expiring {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.inner.write().await;
        match entries.map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "entry expired");
                entries.map.remove(key);
                None
            }
            None => None,
        }
    }

    async fn remove(&self, key: &str) -> bool {
        let mut entries = self.inner.write().await;
        match entries.map.remove(key) {
            Some(entry) => entry.expires_at > Instant::now(),
            None => false,
        }
    }

    async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }
}

/// 프로세스 내 메모리 저장소.
///
/// 여러 인스턴스 간에 공유되지 않으므로 단일 인스턴스 배포나 테스트에만 사용합니다.
#[derive(Debug)]
pub struct MemoryRegistrationStore {
    registrations: TtlMap<PendingRegistration>,
    reset_codes: TtlMap<String>,
}

impl MemoryRegistrationStore {
    /// 새 저장소를 생성합니다.
    pub fn new(registration_ttl: Duration, reset_code_ttl: Duration) -> Self {
        Self {
            registrations: TtlMap::new(registration_ttl),
            reset_codes: TtlMap::new(reset_code_ttl),
        }
    }

    /// 초 단위 TTL로 생성합니다.
    pub fn with_ttl_secs(registration_ttl_secs: u64, reset_code_ttl_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(registration_ttl_secs),
            Duration::from_secs(reset_code_ttl_secs),
        )
    }

    /// 아직 제거되지 않은 가입 대기 레코드 수 (만료 항목 포함).
    pub async fn registration_count(&self) -> usize {
        self.registrations.len().await
    }
}

impl Default for MemoryRegistrationStore {
    fn default() -> Self {
        Self::with_ttl_secs(600, 600)
    }
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn set_register(&self, pending: &PendingRegistration) -> Result<()> {
        self.registrations
            .insert(registration_key(&pending.email), pending.clone())
            .await;
        Ok(())
    }

    async fn get_register(&self, email: &str) -> Result<PendingRegistration> {
        let key = registration_key(email);
        self.registrations
            .get(&key)
            .await
            .ok_or(DataError::NotFoundOrExpired(key))
    }

    async fn set_code(&self, email: &str, code: &str) -> Result<()> {
        self.reset_codes
            .insert(reset_code_key(email), code.to_string())
            .await;
        Ok(())
    }

    async fn get_code(&self, email: &str) -> Result<String> {
        let key = reset_code_key(email);
        self.reset_codes
            .get(&key)
            .await
            .ok_or(DataError::NotFoundOrExpired(key))
    }

    async fn delete_code(&self, email: &str) -> Result<bool> {
        Ok(self.reset_codes.remove(&reset_code_key(email)).await)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ==================== Construction ====================

/// 설정으로 만든 저장소와, Redis를 쓰는 경우 헬스 체크용 연결.
pub struct RegistrationBackend {
    pub store: Arc<dyn RegistrationStore>,
    pub redis: Option<RedisCache>,
}

/// 설정에 맞는 저장소를 만듭니다.
///
/// `redis.url`이 비어 있으면 메모리 저장소를 씁니다. URL이 설정되어 있는데
/// 연결하지 못하면 메모리로 대체하지 않고 오류를 반환합니다.
pub async fn connect_registration_store(
    redis: &RedisSettings,
    cache: &CacheConfig,
) -> Result<RegistrationBackend> {
    match redis.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => {
            let connection = RedisCache::connect(&RedisConfig::from_url(url)).await?;
            info!("Registration store backed by Redis");
            let store = RedisRegistrationStore::new(
                connection.clone(),
                cache.registration_ttl_secs,
                cache.reset_code_ttl_secs,
            );
            Ok(RegistrationBackend {
                store: Arc::new(store),
                redis: Some(connection),
            })
        }
        None => {
            warn!("redis.url not set, registration state is kept in memory (single instance only)");
            let store = MemoryRegistrationStore::with_ttl_secs(
                cache.registration_ttl_secs,
                cache.reset_code_ttl_secs,
            );
            Ok(RegistrationBackend {
                store: Arc::new(store),
                redis: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(email: &str, code: &str) -> PendingRegistration {
        PendingRegistration {
            email: email.to_string(),
            username: "tom0011".to_string(),
            country: "Uzbekistan".to_string(),
            password: "secret".to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(registration_key("a@b.com"), "register:a@b.com");
        assert_eq!(reset_code_key("a@b.com"), "reset_code:a@b.com");
    }

    #[tokio::test]
    async fn test_set_then_get_register() {
        let store = MemoryRegistrationStore::default();
        store.set_register(&pending("a@b.com", "111111")).await.unwrap();

        let loaded = store.get_register("a@b.com").await.unwrap();
        assert_eq!(loaded.code, "111111");
        assert_eq!(loaded.username, "tom0011");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryRegistrationStore::default();
        store.set_register(&pending("a@b.com", "111111")).await.unwrap();
        store.set_register(&pending("a@b.com", "222222")).await.unwrap();

        let loaded = store.get_register("a@b.com").await.unwrap();
        assert_eq!(loaded.code, "222222");
        assert!(!loaded.code_matches("111111"));
    }

    #[tokio::test]
    async fn test_missing_register_is_not_found() {
        let store = MemoryRegistrationStore::default();
        let err = store.get_register("nobody@b.com").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_expires_after_ttl() {
        let store = MemoryRegistrationStore::with_ttl_secs(600, 600);
        store.set_register(&pending("a@b.com", "111111")).await.unwrap();

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(store.get_register("a@b.com").await.is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;
        let err = store.get_register("a@b.com").await.unwrap_err();
        assert!(matches!(err, DataError::NotFoundOrExpired(_)));
        assert_eq!(store.registration_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewrite_refreshes_ttl() {
        let store = MemoryRegistrationStore::with_ttl_secs(60, 60);
        store.set_register(&pending("a@b.com", "1")).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        store.set_register(&pending("a@b.com", "2")).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(store.get_register("a@b.com").await.unwrap().code, "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_code_lifecycle() {
        let store = MemoryRegistrationStore::with_ttl_secs(600, 30);
        store.set_code("a@b.com", "654321").await.unwrap();
        assert_eq!(store.get_code("a@b.com").await.unwrap(), "654321");

        // 조회만으로는 삭제되지 않음
        assert_eq!(store.get_code("a@b.com").await.unwrap(), "654321");

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(store.get_code("a@b.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_code() {
        let store = MemoryRegistrationStore::default();
        store.set_code("a@b.com", "654321").await.unwrap();

        assert!(store.delete_code("a@b.com").await.unwrap());
        assert!(!store.delete_code("a@b.com").await.unwrap());
        assert!(store.get_code("a@b.com").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_entries_are_swept_on_insert() {
        let store = MemoryRegistrationStore::with_ttl_secs(60, 60);
        for i in 0..1000 {
            store
                .set_register(&pending(&format!("user{i}@b.com"), "111111"))
                .await
                .unwrap();
        }
        assert_eq!(store.registration_count().await, 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        store.set_register(&pending("late@b.com", "222222")).await.unwrap();

        assert_eq!(store.registration_count().await, 1);
        assert_eq!(store.get_register("late@b.com").await.unwrap().code, "222222");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_live_entries() {
        let store = MemoryRegistrationStore::with_ttl_secs(60, 60);
        store.set_register(&pending("old@b.com", "1")).await.unwrap();

        tokio::time::advance(Duration::from_secs(40)).await;
        store.set_register(&pending("fresh@b.com", "2")).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        store.set_register(&pending("new@b.com", "3")).await.unwrap();

        assert_eq!(store.registration_count().await, 2);
        assert!(store.get_register("old@b.com").await.is_err());
        assert_eq!(store.get_register("fresh@b.com").await.unwrap().code, "2");
    }

    #[tokio::test]
    async fn test_without_redis_url_uses_memory() {
        let backend = connect_registration_store(&RedisSettings::default(), &CacheConfig::default())
            .await
            .unwrap();
        assert_eq!(backend.store.name(), "memory");
        assert!(backend.redis.is_none());

        let blank = RedisSettings {
            url: Some("  ".to_string()),
        };
        let backend = connect_registration_store(&blank, &CacheConfig::default())
            .await
            .unwrap();
        assert_eq!(backend.store.name(), "memory");
    }

    #[tokio::test]
    async fn test_configured_redis_failure_is_an_error() {
        let settings = RedisSettings {
            url: Some("not-a-redis-url".to_string()),
        };
        let result = connect_registration_store(&settings, &CacheConfig::default()).await;
        assert!(matches!(result, Err(DataError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_keyspaces_are_independent() {
        let store = MemoryRegistrationStore::default();
        store.set_code("a@b.com", "654321").await.unwrap();

        assert!(store.get_register("a@b.com").await.is_err());

        store.set_register(&pending("a@b.com", "111111")).await.unwrap();
        assert_eq!(store.get_code("a@b.com").await.unwrap(), "654321");
    }
}
