//! Server-side print proxy.
//!
//! `POST /api/print` with `{zpl, printer, labelType}`. The ZPL is copied to
//! the named printer share with the configured OS command.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::{body_object, error, str_field};
use crate::error::EtiketError;
use crate::server::state::AppState;

pub const MISSING_ZPL: &str = "ZPL kodu gerekli";
pub const PRINT_FAILED: &str = "Yazdırma başarısız";
pub const DEFAULT_LABEL_TYPE: &str = "Etiket";

/// Handle /api/print - any method; only POST prints.
pub async fn print(State(state): State<Arc<AppState>>, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let body = body_object(&body);
    let Some(zpl) = str_field(&body, "zpl") else {
        return error(StatusCode::BAD_REQUEST, MISSING_ZPL);
    };
    let printer = str_field(&body, "printer").unwrap_or(state.config.default_printer.as_str());
    let label_type = str_field(&body, "labelType").unwrap_or(DEFAULT_LABEL_TYPE);

    match state.proxy.print(zpl, printer).await {
        Ok(()) => {
            info!(printer, label_type, "label printed");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": format!("{} başarıyla yazdırıldı", label_type),
                    "printer": printer,
                })),
            )
                .into_response()
        }
        Err(EtiketError::Validation(issue)) => {
            warn!(printer, issue = %issue, "print request rejected");
            error(StatusCode::BAD_REQUEST, &issue.to_string())
        }
        Err(e) => {
            warn!(printer, error = %e, "proxy print failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": PRINT_FAILED,
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
