//! Maps [`AppError`] to the `{error, code, detail?}` JSON body the facade
//! promises every handler (spec §4.6/§7), using the error's own
//! `status_code` rather than re-deriving one from `kind`.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nutvault_common::AppError;
use serde::Serialize;

/// Wrapper so handlers can return `Result<Json<T>, AppErrorResponse>` and
/// `?` straight out of an `AppError`-returning call.
#[derive(Debug)]
pub struct AppErrorResponse(pub AppError);

impl From<AppError> for AppErrorResponse {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<nutvault_store::StoreError> for AppErrorResponse {
    fn from(err: nutvault_store::StoreError) -> Self {
        Self(err.into())
    }
}

impl From<nutvault_mint_client::MintClientError> for AppErrorResponse {
    fn from(err: nutvault_mint_client::MintClientError) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<HashMap<String, String>>,
}

impl IntoResponse for AppErrorResponse {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let detail = if err.params.is_empty() { None } else { Some(err.params.clone()) };
        let body = ErrorBody { error: err.message.clone(), code: err.kind.to_string(), detail };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use nutvault_common::ErrorKind;

    use super::*;

    /// A9: every `ErrorKind` maps to exactly one status through the facade.
    #[test]
    fn every_error_kind_maps_to_one_status() {
        let kinds = [
            ErrorKind::Connection,
            ErrorKind::Database,
            ErrorKind::Validation,
            ErrorKind::Unknown,
            ErrorKind::Timeout,
            ErrorKind::NotFound,
            ErrorKind::AlreadyExists,
            ErrorKind::Unauthorized,
            ErrorKind::Server,
            ErrorKind::Limit,
        ];
        for kind in kinds {
            let resp = AppErrorResponse(AppError::new(kind, "boom")).into_response();
            assert_eq!(resp.status(), StatusCode::from_u16(kind.default_status()).unwrap());
        }
    }

    #[test]
    fn melt_timeout_reports_202_not_408() {
        let resp = AppErrorResponse(AppError::timeout_pending("pending")).into_response();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }
}
