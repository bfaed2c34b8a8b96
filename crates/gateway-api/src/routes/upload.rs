//! multipart 폼 읽기 및 이미지 업로드.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use tracing::debug;

use crate::error::{storage_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 파일 필드 이름.
pub const FILE_FIELD: &str = "file";

/// 업로드된 파일 한 개.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// 텍스트 필드와 선택적 `file` 필드.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// 텍스트 필드 값 (없으면 빈 문자열).
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// `file` 필드가 반드시 있어야 하는 경우.
    pub fn require_file(self) -> ApiResult<UploadedFile> {
        self.file
            .ok_or_else(|| ApiErrorResponse::bad_request("file is required"))
    }
}

/// multipart 본문 전체를 읽습니다.
///
/// 이름과 내용이 모두 빈 파일 필드는 첨부하지 않은 것으로 봅니다.
pub async fn read_multipart(
    payload: Result<Multipart, MultipartRejection>,
) -> ApiResult<MultipartForm> {
    let mut multipart =
        payload.map_err(|rejection| ApiErrorResponse::bad_request(rejection.body_text()))?;
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiErrorResponse::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiErrorResponse::bad_request(e.body_text()))?;

            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiErrorResponse::bad_request(e.body_text()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// 파일을 버킷에 올리고 공개 URL을 반환합니다.
pub async fn upload_to(state: &AppState, bucket: &str, file: UploadedFile) -> ApiResult<String> {
    let size = file.bytes.len();
    let url = state
        .storage
        .upload(bucket, &file.file_name, &file.content_type, file.bytes.to_vec())
        .await
        .map_err(storage_error)?;

    debug!(bucket, size, url = %url, "Image uploaded");
    Ok(url)
}
