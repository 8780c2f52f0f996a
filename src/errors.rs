use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Boxed driver error kept as the source of a store fault.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error categories shared by every gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ClientError,
    PayloadTooLarge,
    StoreFault,
    ConfigurationFault,
}

impl ErrorKind {
    /// The one place where a gateway outcome becomes an HTTP status.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ClientError => StatusCode::BAD_REQUEST,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::StoreFault | ErrorKind::ConfigurationFault => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Failure of a single gateway operation.
///
/// `NotFound` and `ClientError` carry a message that is safe to show to the
/// client. `Store` carries a separate public message; the driver error stays
/// in `source` and only reaches the logs.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ClientError(String),
    /// Request body went over the configured upload limit.
    #[error("{0}")]
    TooLarge(String),
    #[error("{message}: {source}")]
    Store {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("{backend} is not configured (missing {})", .missing.join(", "))]
    Config {
        backend: &'static str,
        missing: Vec<&'static str>,
    },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn client(msg: impl Into<String>) -> Self {
        Self::ClientError(msg.into())
    }

    pub fn too_large(msg: impl Into<String>) -> Self {
        Self::TooLarge(msg.into())
    }

    /// Wrap a driver error behind a public message.
    pub fn store(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Store {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ClientError(_) => ErrorKind::ClientError,
            Self::TooLarge(_) => ErrorKind::PayloadTooLarge,
            Self::Store { .. } => ErrorKind::StoreFault,
            Self::Config { .. } => ErrorKind::ConfigurationFault,
        }
    }

    /// Message returned to the client. Never includes driver detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::ClientError(msg) | Self::TooLarge(msg) => msg.clone(),
            Self::Store { message, .. } => message.clone(),
            Self::Config { .. } => "Erro de configuração do servidor".into(),
        }
    }
}

/// HTTP-facing error: a status plus the message the client gets.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// Render the message as a bare JSON string instead of `{"message": ..}`.
    pub plain: bool,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            plain: false,
        }
    }

    pub fn plain(mut self) -> Self {
        self.plain = true;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.plain {
            (self.status, Json(self.message)).into_response()
        } else {
            (self.status, Json(json!({ "message": self.message }))).into_response()
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let status = err.kind().status();
        match &err {
            GatewayError::Store { message, source } => {
                tracing::error!(status = status.as_u16(), error = ?source, "{}", message);
            }
            GatewayError::Config { .. } => {
                tracing::error!(status = status.as_u16(), "{}", err);
            }
            GatewayError::NotFound(_)
            | GatewayError::ClientError(_)
            | GatewayError::TooLarge(_) => {
                tracing::warn!(status = status.as_u16(), "{}", err);
            }
        }
        AppError::new(status, err.public_message())
    }
}
