//! HTTP handlers for bucket and object operations.
//! Upload bodies are read from multipart form data and handed to the
//! `ObjectGateway` unchanged.

use crate::{
    errors::{AppError, GatewayError},
    models::object::Upload,
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Form field that carries the uploaded file.
const FILE_FIELD: &str = "file";
const FILE_MISSING: &str = "Arquivo não enviado";
const FILE_TOO_LARGE: &str = "Arquivo excede o tamanho máximo permitido";

/// Query params accepted by `GET /buckets/{bucketName}`.
#[derive(Debug, Deserialize)]
pub struct ListObjectsQuery {
    pub prefix: Option<String>,
}

/// `GET /buckets`
pub async fn list_buckets(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let buckets = state.objects.list_buckets().await?;
    info!(count = buckets.len(), "buckets listed");
    Ok(Json(buckets))
}

/// `GET /buckets/{bucketName}` — list every object, optionally under `?prefix=`.
pub async fn list_objects(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(q): Query<ListObjectsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let objects = state.objects.list_objects(&bucket, q.prefix).await?;
    info!(bucket = %bucket, count = objects.len(), "objects listed");
    Ok(Json(objects))
}

/// `POST /buckets/{bucketName}/upload` with the file in multipart field `file`.
///
/// A request without that field is rejected before the store is contacted,
/// so the outcome does not depend on whether the bucket exists.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let multipart = multipart.map_err(|_| GatewayError::client(FILE_MISSING))?;
    let (key, content_type, content) = read_file_field(multipart).await?;

    let upload = Upload {
        bucket,
        key,
        content,
        content_type,
    };
    let receipt = state.objects.upload(upload).await?;
    info!(
        bucket = %receipt.bucket,
        key = %receipt.key,
        size = receipt.size,
        "file uploaded"
    );

    Ok(Json(json!({
        "message": "Arquivo enviado com sucesso",
        "data": receipt,
    })))
}

/// `DELETE /buckets/{bucketName}/file/{fileName}`
pub async fn delete_file(
    State(state): State<AppState>,
    Path((bucket, file_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.objects.delete_object(&bucket, &file_name).await?;
    info!(bucket = %bucket, key = %file_name, "file deleted");
    Ok(Json(json!({ "message": "Arquivo deletado com sucesso" })))
}

/// Find the `file` field and return its file name, content type and bytes.
///
/// Other fields are skipped. A missing field, a missing file name or an empty
/// payload are all client errors.
async fn read_file_field(
    mut multipart: Multipart,
) -> Result<(String, Option<String>, bytes::Bytes), GatewayError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(form_error)?
            .ok_or_else(|| GatewayError::client(FILE_MISSING))?;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let key = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| GatewayError::client("Nome do arquivo não informado"))?;
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(form_error)?;

        if content.is_empty() {
            return Err(GatewayError::client(FILE_MISSING));
        }
        return Ok((key, content_type, content));
    }
}

/// Bodies cut off by the upload limit keep their 413; anything else is a
/// malformed form.
fn form_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::too_large(FILE_TOO_LARGE)
    } else {
        GatewayError::client(format!("Formulário inválido: {}", err.body_text()))
    }
}
