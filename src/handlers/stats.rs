//! Statistics handlers: summary, CSV export, log erasure

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::middleware::auth::{authorize_admin, extract_token};
use crate::stats::{export, summarize, StatisticsSummary};
use crate::{AppError, AppResult, AppState};

/// GET /stats/summary
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<StatisticsSummary>> {
    let summary = state.log.with_reader(|reader| summarize(reader))?;
    Ok(Json(summary))
}

/// GET /stats/export/csv (admin)
pub async fn export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = extract_token(&headers)?;
    let username = authorize_admin(&state.users, token)?;

    let csv = state.log.with_reader(|reader| match reader {
        None => Ok(Err(AppError::NotFound("No statistics found".to_string()))),
        Some(reader) => Ok(export::to_csv(reader)),
    })??;

    tracing::info!("Statistics exported as CSV by '{}'", username);

    let filename = format!(
        "ECGTM_stats_{}.csv",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        csv,
    )
        .into_response())
}

/// DELETE /stats (admin)
pub async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let token = extract_token(&headers)?;
    let username = authorize_admin(&state.users, token)?;

    state
        .log
        .erase()
        .map_err(|e| AppError::IoFailure(e.to_string()))?;

    tracing::info!("Statistics log erased by '{}'", username);
    Ok(Json(json!({ "message": "Statistics cleared." })))
}
