use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

use crate::application::AppError;

pub const GENERATE_FAILED: &str = "Error al generar los gastos";
pub const PAYMENT_FAILED: &str = "Error al registrar el pago";
pub const PAYMENTS_QUERY_FAILED: &str = "Error al consultar los pagos";
pub const CHARGES_QUERY_FAILED: &str = "Error al consultar los gastos";
pub const UNPAID_QUERY_FAILED: &str = "Error al consultar los gastos no pagados";
pub const DELETE_FAILED: &str = "Error al eliminar los datos";

pub const CHARGE_NOT_FOUND: &str = "Gasto no encontrado";

/// Everything a handler can fail with.
/// This is the only place where errors become HTTP status codes.
#[derive(Debug)]
pub enum ApiError {
    /// An application error tagged with the operation that failed.
    Failed {
        operation: &'static str,
        source: AppError,
    },
    /// The request body or query string could not be decoded.
    Rejected { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn new(operation: &'static str, source: AppError) -> Self {
        Self::Failed { operation, source }
    }

    /// Adapter for `map_err`.
    pub fn during(operation: &'static str) -> impl Fn(AppError) -> Self {
        move |source| Self::new(operation, source)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Failed { source, .. } if source.is_not_found() => StatusCode::NOT_FOUND,
            Self::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Failed { source, .. } if source.is_not_found() => CHARGE_NOT_FOUND.to_string(),
            Self::Failed { operation, source } => format!("{}: {}", operation, source),
            Self::Rejected { detail, .. } => detail.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { operation, source } => write!(f, "{}: {}", operation, source),
            Self::Rejected { detail, .. } => write!(f, "{}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if matches!(self, Self::Rejected { .. }) {
            warn!(status = %status, error = %self, "request rejected");
        }

        let body = Json(json!({ "detail": self.detail() }));
        (status, body).into_response()
    }
}
