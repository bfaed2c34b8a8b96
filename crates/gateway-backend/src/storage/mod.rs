//! 오브젝트 스토리지 (프로필/게시물 이미지 업로드).

pub mod s3;
pub mod sigv4;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageResult;

pub use s3::S3Storage;

/// 업로드 대상 스토리지.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 바이트를 업로드하고 공개 URL을 반환합니다.
    ///
    /// # Arguments
    ///
    /// * `bucket` - 대상 버킷
    /// * `file_name` - 클라이언트가 보낸 원래 파일 이름
    /// * `content_type` - MIME 타입
    /// * `bytes` - 파일 내용
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String>;
}

/// 파일 이름에서 디렉터리 부분을 떼고 `[A-Za-z0-9._-]` 외 문자를 `_`로 바꿉니다.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// 충돌하지 않는 객체 키: `{uuid}-{정리된 파일 이름}`.
pub fn object_key(file_name: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name))
}
