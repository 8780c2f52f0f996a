//! `/usuarios` routes backed by the document store.
//!
//! Messages on these routes are rendered as bare JSON strings.

use crate::{
    errors::{AppError, GatewayError},
    handlers::json_body,
    models::user::{NewUser, UserPatch},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

fn plain(err: GatewayError) -> AppError {
    AppError::from(err).plain()
}

/// `GET /mongodb/testar-conexao`
pub async fn test_connection(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.users.ping().await.map_err(plain)?;
    info!("mongodb ping succeeded");
    Ok((StatusCode::OK, "Conexão com o MongoDB estabelecida com sucesso!"))
}

/// `POST /usuarios`
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user = json_body(payload).map_err(plain)?;
    let created = state.users.create(user).await.map_err(plain)?;
    info!(user_id = %created.id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /usuarios`
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.users.list().await.map_err(plain)?;
    info!(count = users.len(), "users listed");
    Ok(Json(users))
}

/// `GET /usuarios/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get(&id).await.map_err(plain)?;
    info!(user_id = %user.id, "user fetched");
    Ok(Json(user))
}

/// `PUT /usuarios/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let patch = json_body(payload).map_err(plain)?;
    let user = state.users.update(&id, patch).await.map_err(plain)?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(user))
}

/// `DELETE /usuarios/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.users.delete(&id).await.map_err(plain)?;
    info!(user_id = %id, "user deleted");
    Ok(Json("Usuário deletado com sucesso"))
}
