//! HTTP handlers for the server.

pub mod agent;
pub mod label;
pub mod label_types;
pub mod print;

use axum::{
    Json,
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// `{"error": message}` with a status.
pub fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Fallback for unknown paths and methods.
pub async fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Not found")
}

/// Permissive CORS; `OPTIONS` on any path is answered here with 204.
pub async fn cors(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut res = StatusCode::NO_CONTENT.into_response();
        add_cors_headers(res.headers_mut());
        return res;
    }
    let mut res = next.run(req).await;
    add_cors_headers(res.headers_mut());
    res
}

fn add_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

/// Request body as a JSON object. Anything unparsable reads as `{}` so the
/// caller reports the missing fields.
pub(crate) fn body_object(body: &[u8]) -> serde_json::Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

/// Non-empty string field.
pub(crate) fn str_field<'a>(body: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_object() {
        let body = body_object(br#"{"zpl":"^XA^XZ","host":""}"#);
        assert_eq!(str_field(&body, "zpl"), Some("^XA^XZ"));
        assert_eq!(str_field(&body, "host"), None);
        assert!(body_object(b"not json").is_empty());
        assert!(body_object(b"[1,2]").is_empty());
    }
}
