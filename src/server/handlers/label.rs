//! Designer API: ZPL generation and PNG preview for a posted document.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::error;
use crate::assets::{AssetSource, Assets};
use crate::error::ValidationIssue;
use crate::layout::LabelDocument;
use crate::render::{self, RenderOptions};
use crate::server::state::AppState;
use crate::zpl;

/// Load what the document references; failures surface later as
/// missing-image issues or placeholders. Server-side file paths are never
/// opened for a client.
async fn load_assets(state: &AppState, doc: &LabelDocument) -> Assets {
    let mut assets = Assets::new();
    let failures = assets
        .fetch_for_document(&state.http_client, doc, AssetSource::Remote)
        .await;
    for (reference, e) in failures {
        warn!(reference = %reference, error = %e, "image asset not loaded");
    }
    assets
}

/// 400 with the issues when the document is past the size limits.
fn reject_oversize(issues: Vec<ValidationIssue>) -> Option<Response> {
    let first = issues.first()?;
    warn!(issue = %first, "label document rejected");
    Some(
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": first.to_string(), "issues": issues })),
        )
            .into_response(),
    )
}

/// Handle POST /api/label/zpl - `{zpl, issues}` for a document.
pub async fn zpl(State(state): State<Arc<AppState>>, Json(doc): Json<LabelDocument>) -> Response {
    if let Some(rejected) = reject_oversize(doc.oversize_issues()) {
        return rejected;
    }
    let assets = load_assets(&state, &doc).await;
    Json(zpl::generate(&doc, &assets)).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewQuery {
    pub zoom: Option<f32>,
    pub grid_mm: Option<f32>,
}

/// Handle POST /api/label/preview - PNG of a document.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
    Json(doc): Json<LabelDocument>,
) -> Response {
    let zoom = query.zoom.unwrap_or(1.0);
    let mut issues = doc.oversize_issues();
    issues.extend(render::preview_issue(&doc, zoom));
    if let Some(rejected) = reject_oversize(issues) {
        return rejected;
    }
    let assets = load_assets(&state, &doc).await;
    let options = RenderOptions {
        zoom,
        grid_mm: query.grid_mm,
        selection: None,
    };
    match render::render_png(&doc, &assets, &options) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Preview render failed: {}", e),
        ),
    }
}
