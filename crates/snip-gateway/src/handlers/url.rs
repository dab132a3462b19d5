use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use jiff::Timestamp;
use snip_core::ShortCode;

fn parse_expire_at(raw: &str) -> Result<u64> {
    let ts: Timestamp = raw
        .parse()
        .map_err(|e| AppError::BadRequest(format!("invalid expireAt '{raw}': {e}")))?;
    u64::try_from(ts.as_second())
        .map_err(|_| AppError::BadRequest(format!("expireAt '{raw}' is before the epoch")))
}

pub async fn create_url_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let expires_at = parse_expire_at(&request.expire_at)?;

    let created = state
        .shortener()
        .create(&request.url, expires_at)
        .await
        .map_err(AppError::Create)?;

    Ok(Json(CreateUrlResponse {
        id: created.code.to_string(),
        short_url: created.short_url,
    }))
}

pub async fn resolve_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    let code = ShortCode::new(code).map_err(AppError::Resolve)?;

    let resolved = state
        .shortener()
        .get(&code)
        .await
        .map_err(AppError::Resolve)?;

    Ok(Redirect::temporary(&resolved.target_url))
}
