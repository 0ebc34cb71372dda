use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use movequote_core::DomainError;
use movequote_infra::{IngestError, StoreError};
use movequote_orders::ResolveError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn resolve_error_to_response(err: ResolveError) -> axum::response::Response {
    match err {
        ResolveError::EmptySelection => json_error(
            StatusCode::BAD_REQUEST,
            "empty_selection",
            "selectedProducts must contain at least one selection",
        ),
        ResolveError::InvalidQuantity(id) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_quantity",
            format!("quantity for item {id} must be a positive integer"),
        ),
        ResolveError::ItemNotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "item_not_found",
            format!("product with id {id} not found"),
        ),
        ResolveError::Lookup(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn ingest_error_to_response(err: IngestError) -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "ingestion_error",
        err.to_string(),
    )
}
