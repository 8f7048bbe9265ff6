//! Local print agent handlers.
//!
//! | Route | Body | Success |
//! |-------|------|---------|
//! | `POST /print` | `{zpl, host, port}` | `{"success": true}` |
//! | `GET /printers` | | `{"printers": [...]}` |
//! | `POST /print-local` | `{zpl, printerName}` | `{"success": true}` |
//!
//! Failures are `{"error": "<message>"}` with 400 for missing fields and
//! 500 for anything the printer or spooler reported.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use super::{body_object, error, str_field};
use crate::server::state::AgentState;

pub const MISSING_PRINT_FIELDS: &str = "zpl, host ve port zorunludur";
pub const MISSING_LOCAL_FIELDS: &str = "zpl ve printerName zorunludur";

fn success() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

/// Port as a number or numeric string; 0 and out-of-range count as missing.
fn port_field(body: &serde_json::Map<String, Value>) -> Option<u16> {
    let port = match body.get("port")? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u16::try_from(port).ok().filter(|p| *p != 0)
}

/// Handle POST /print - raw TCP to the printer.
pub async fn print(State(state): State<Arc<AgentState>>, body: Bytes) -> Response {
    let body = body_object(&body);
    let (Some(zpl), Some(host), Some(port)) =
        (str_field(&body, "zpl"), str_field(&body, "host"), port_field(&body))
    else {
        return error(StatusCode::BAD_REQUEST, MISSING_PRINT_FIELDS);
    };

    match state.raw.send(host, port, zpl.as_bytes()).await {
        Ok(()) => success(),
        Err(e) => {
            warn!(host, port, error = %e, "print failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Handle GET /printers - spooler printer list.
pub async fn printers(State(state): State<Arc<AgentState>>) -> Response {
    match state.spooler.printers().await {
        Ok(printers) => (StatusCode::OK, Json(json!({ "printers": printers }))).into_response(),
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// Handle POST /print-local - raw job through the spooler.
pub async fn print_local(State(state): State<Arc<AgentState>>, body: Bytes) -> Response {
    let body = body_object(&body);
    let (Some(zpl), Some(printer)) = (str_field(&body, "zpl"), str_field(&body, "printerName"))
    else {
        return error(StatusCode::BAD_REQUEST, MISSING_LOCAL_FIELDS);
    };

    match state.spooler.submit_raw(printer, zpl.as_bytes()).await {
        Ok(()) => {
            info!(printer, "printed via spooler");
            success()
        }
        Err(e) => {
            warn!(printer, error = %e, "spooler print failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
