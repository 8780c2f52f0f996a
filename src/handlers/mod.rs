//! HTTP handlers, one module per backend plus health probes.
//!
//! Every handler calls exactly one gateway operation and converts its error
//! through `AppError`, which owns the status mapping.

pub mod health_handlers;
pub mod object_handlers;
pub mod product_handlers;
pub mod user_handlers;

use crate::errors::GatewayError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
};

/// Unwrap a JSON body, turning any rejection into a client error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            GatewayError::client(format!("Corpo inválido: {}", rejection.body_text()))
        })
}

/// Unwrap a path parameter, turning any rejection into a client error.
pub(crate) fn path_param<T>(
    param: Result<axum::extract::Path<T>, PathRejection>,
) -> Result<T, GatewayError> {
    param
        .map(|axum::extract::Path(value)| value)
        .map_err(|rejection| {
            GatewayError::client(format!("Parâmetro inválido: {}", rejection.body_text()))
        })
}
