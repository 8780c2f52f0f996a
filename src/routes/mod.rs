//! Route table.
//!
//! ## Structure
//! - **Document store**
//!   - `GET    /mongodb/testar-conexao`
//!   - `POST   /usuarios`, `GET /usuarios`
//!   - `GET | PUT | DELETE /usuarios/{id}`
//!
//! - **Object store**
//!   - `GET    /buckets`
//!   - `GET    /buckets/{bucketName}`
//!   - `POST   /buckets/{bucketName}/upload` (multipart field `file`)
//!   - `DELETE /buckets/{bucketName}/file/{fileName}`
//!
//! - **Relational store**
//!   - `POST   /init-db`
//!   - `POST   /produtos`, `GET /produtos`
//!   - `GET | PUT | DELETE /produtos/{id}`

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        object_handlers::{delete_file, list_buckets, list_objects, upload_file},
        product_handlers::{
            create_product, delete_product, get_product, init_db, list_products, update_product,
        },
        user_handlers::{
            create_user, delete_user, get_user, list_users, test_connection, update_user,
        },
    },
    state::AppState,
    telemetry,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Build the route table without state or middleware.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // document store
        .route("/mongodb/testar-conexao", get(test_connection))
        .route("/usuarios", post(create_user).get(list_users))
        .route(
            "/usuarios/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // object store
        .route("/buckets", get(list_buckets))
        .route("/buckets/{bucket_name}", get(list_objects))
        .route(
            "/buckets/{bucket_name}/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/buckets/{bucket_name}/file/{file_name}",
            delete(delete_file),
        )
        // relational store
        .route("/init-db", post(init_db))
        .route("/produtos", post(create_product).get(list_products))
        .route(
            "/produtos/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// The complete application: routes, shared state, request ids and tracing.
///
/// Layers run outside-in: a request id is assigned first, the trace span
/// picks it up, and the id is copied onto the response.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    routes(max_upload_bytes)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(telemetry::request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
