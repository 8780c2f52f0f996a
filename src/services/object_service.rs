//! Object-store gateway over S3.
//!
//! Nothing is cached: every call is a single request (or one paginated
//! listing) against the store, and store errors keep the store's own message.

use crate::{
    config::S3Settings,
    errors::{GatewayError, GatewayResult},
    models::{
        bucket::BucketSummary,
        object::{ObjectSummary, Upload, UploadReceipt},
    },
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::{ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime as SmithyDateTime},
};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Operations the HTTP layer may run against the object store.
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    async fn ping(&self) -> GatewayResult<()>;
    async fn list_buckets(&self) -> GatewayResult<Vec<BucketSummary>>;
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<String>,
    ) -> GatewayResult<Vec<ObjectSummary>>;
    async fn upload(&self, upload: Upload) -> GatewayResult<UploadReceipt>;
    async fn delete_object(&self, bucket: &str, key: &str) -> GatewayResult<()>;
}

#[derive(Clone)]
pub struct S3ObjectGateway {
    client: Client,
}

impl S3ObjectGateway {
    /// Build a client from explicit region and static credentials.
    ///
    /// `endpoint` switches to path-style addressing for S3-compatible servers.
    pub async fn connect(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            settings.session_token.clone(),
            None,
            "store-gateway-env",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectGateway for S3ObjectGateway {
    async fn ping(&self) -> GatewayResult<()> {
        self.client
            .list_buckets()
            .send()
            .await
            .map_err(|err| store_fault("Falha ao conectar ao S3", err))?;
        Ok(())
    }

    async fn list_buckets(&self) -> GatewayResult<Vec<BucketSummary>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| store_fault("Erro ao listar buckets", err))?;

        Ok(output
            .buckets()
            .iter()
            .map(|bucket| BucketSummary {
                name: bucket.name().unwrap_or_default().to_string(),
                creation_date: bucket.creation_date().and_then(to_chrono),
            })
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<String>,
    ) -> GatewayResult<Vec<ObjectSummary>> {
        let pages: Vec<_> = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix)
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(|err| store_fault("Erro ao listar objetos", err))?;
        debug!(bucket, pages = pages.len(), "listed objects");

        Ok(pages
            .iter()
            .flat_map(|page| page.contents())
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or_default(),
                last_modified: object.last_modified().and_then(to_chrono),
                etag: object.e_tag().map(str::to_string),
                storage_class: object.storage_class().map(|c| c.as_str().to_string()),
            })
            .collect())
    }

    async fn upload(&self, upload: Upload) -> GatewayResult<UploadReceipt> {
        if upload.content.is_empty() {
            return Err(GatewayError::client("Arquivo não enviado"));
        }
        let size = upload.content.len();
        let output = self
            .client
            .put_object()
            .bucket(&upload.bucket)
            .key(&upload.key)
            .content_md5(content_md5(&upload.content))
            .set_content_type(upload.content_type)
            .body(ByteStream::from(upload.content))
            .send()
            .await
            .map_err(|err| store_fault("Erro ao enviar arquivo", err))?;

        Ok(UploadReceipt {
            bucket: upload.bucket,
            key: upload.key,
            size,
            etag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> GatewayResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| store_fault("Erro ao deletar arquivo", err))?;
        Ok(())
    }
}

/// Turn an SDK error into a store fault that carries the store's message,
/// falling back to `fallback` when the store sent none (e.g. network errors).
fn store_fault<E, R>(fallback: &str, err: SdkError<E, R>) -> GatewayError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = err.message().unwrap_or(fallback).to_string();
    GatewayError::store(message, err)
}

/// Base64 MD5 digest sent as `Content-MD5` so the store rejects corrupt bodies.
pub fn content_md5(content: &[u8]) -> String {
    general_purpose::STANDARD.encode(md5::compute(content).0)
}

fn to_chrono(ts: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}
