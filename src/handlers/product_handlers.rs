//! `/produtos` and `/init-db` routes backed by the relational store.

use crate::{
    errors::AppError,
    handlers::{json_body, path_param},
    models::product::{CreatedProduct, NewProduct},
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

/// `POST /init-db` — create the database and `produtos` table if absent.
pub async fn init_db(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.products.init_schema().await?;
    Ok(Json(json!({
        "message": "Banco de dados e tabela verificados com sucesso"
    })))
}

/// `POST /produtos`
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let product = json_body(payload)?;
    let id = state.products.create(product).await?;
    info!(product_id = id, "product created");
    Ok((StatusCode::CREATED, Json(CreatedProduct { id })))
}

/// `GET /produtos`
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list().await?;
    info!(count = products.len(), "products listed");
    Ok(Json(products))
}

/// `GET /produtos/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let product = state.products.get(id).await?;
    info!(product_id = id, "product fetched");
    Ok(Json(product))
}

/// `PUT /produtos/{id}` — full replacement of the row.
pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    let product = json_body(payload)?;
    state.products.update(id, product).await?;
    info!(product_id = id, "product updated");
    Ok(Json(json!({ "message": "Produto atualizado com sucesso" })))
}

/// `DELETE /produtos/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_param(id)?;
    state.products.delete(id).await?;
    info!(product_id = id, "product deleted");
    Ok(Json(json!({ "message": "Produto deletado com sucesso" })))
}
