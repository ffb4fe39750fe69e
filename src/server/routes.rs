use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::batch::split_codes;
use crate::error::QuoteError;

const MISSING_CODE: &str = "証券コードが指定されていません";
const MISSING_CODES: &str = "証券コードのリストが指定されていません";

/// Health check body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Error body; `code` names the offending ticker when there is one.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

fn error_response(status: StatusCode, error: impl Into<String>, code: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            code,
        }),
    )
        .into_response()
}

fn batch_validation_message(error: &QuoteError) -> String {
    match error {
        QuoteError::EmptyBatch => MISSING_CODES.to_string(),
        QuoteError::BatchTooLarge { max, .. } => {
            format!("一度に取得できる証券コードは最大{}件までです", max)
        }
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StockQuery {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchQuery {
    codes: Option<String>,
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Stock data server is running.".to_string(),
    })
}

pub(crate) async fn stock_data(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Response {
    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_CODE, None);
    };

    let service = state.service.clone();
    let job_code = code.clone();
    let job = state
        .pool
        .spawn(async move { service.get_stock_data(&job_code).await });
    let result = job.await.unwrap_or_else(|e| {
        Err(QuoteError::TaskFailed {
            code: code.trim().to_string(),
            reason: e.to_string(),
        })
    });

    match result {
        Ok(record) => Json(record).into_response(),
        Err(e) => {
            tracing::warn!("Stock data request for {} failed: {}", code, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                Some(code.trim().to_string()),
            )
        }
    }
}

pub(crate) async fn multiple_stock_data(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Response {
    let codes = query.codes.as_deref().map(split_codes).unwrap_or_default();

    if let Err(e) = state.batch.validate(&codes) {
        return error_response(StatusCode::BAD_REQUEST, batch_validation_message(&e), None);
    }

    match state.batch.get_many(codes).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, batch_validation_message(&e), None),
    }
}
