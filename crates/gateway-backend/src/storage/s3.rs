//! S3 호환 오브젝트 스토리지 클라이언트 (MinIO 등).
//!
//! path-style 주소(`{endpoint}/{bucket}/{key}`)로 SigV4 서명된 `PUT`을 보냅니다.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gateway_core::StorageConfig;
use reqwest::{header, Client, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use super::sigv4::{self, SigningParams};
use super::{object_key, ObjectStorage};
use crate::error::{StorageError, StorageResult};

const SERVICE: &str = "s3";

/// S3 호환 스토리지 클라이언트.
pub struct S3Storage {
    client: Client,
    endpoint: String,
    host: String,
    region: String,
    access_key: String,
    secret_key: SecretString,
}

impl S3Storage {
    /// 설정에서 클라이언트를 생성합니다.
    ///
    /// 엔드포인트는 경로 없는 `scheme://host[:port]` 형식이어야 합니다.
    /// 자격 증명이 비어 있으면 생성은 되지만 업로드는 `InvalidConfig`로 실패합니다.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let url = Url::parse(&endpoint)
            .map_err(|e| StorageError::InvalidConfig(format!("storage.endpoint: {}", e)))?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(StorageError::InvalidConfig(
                    "storage.endpoint has no host".to_string(),
                ))
            }
        };
        if url.path() != "/" {
            return Err(StorageError::InvalidConfig(
                "storage.endpoint must not contain a path".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        info!(endpoint = %endpoint, region = %config.region, "Object storage client created");

        Ok(Self {
            client,
            endpoint,
            host,
            region: config.region.clone(),
            access_key: config.access_key.clone(),
            secret_key: SecretString::from(config.secret_key.clone()),
        })
    }

    /// 업로드된 객체의 공개 URL.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        if self.access_key.is_empty() || self.secret_key.expose_secret().is_empty() {
            return Err(StorageError::InvalidConfig(
                "storage credentials are not configured".to_string(),
            ));
        }

        let key = object_key(file_name);
        let path = format!("/{}/{}", bucket, key);
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let content_hash = sigv4::payload_hash(&bytes);

        let mut signed = BTreeMap::new();
        signed.insert("host".to_string(), self.host.clone());
        signed.insert("x-amz-content-sha256".to_string(), content_hash.clone());
        signed.insert("x-amz-date".to_string(), amz_date.clone());

        let params = SigningParams {
            access_key: &self.access_key,
            secret_key: self.secret_key.expose_secret(),
            region: &self.region,
            service: SERVICE,
            amz_date: &amz_date,
        };
        let authorization = sigv4::authorization(&params, "PUT", &path, "", &signed, &content_hash)?;

        let size = bytes.len();
        let response = self
            .client
            .put(format!("{}{}", self.endpoint, path))
            .header(header::AUTHORIZATION, authorization)
            .header("x-amz-content-sha256", content_hash)
            .header("x-amz-date", amz_date)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(bucket, key = %key, %status, "Object upload rejected");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bucket, key = %key, size, "Object uploaded");
        Ok(self.object_url(bucket, &key))
    }
}
