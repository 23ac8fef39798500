use actix_web::{web, error::{JsonPayloadError, QueryPayloadError}};

use crate::errors::AppError;

/// Malformed JSON bodies and query strings answer with the usual `{"error": …}` shape.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        json_payload_error(err).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        query_payload_error(err).into()
    }));
}

fn json_payload_error(err: JsonPayloadError) -> AppError {
    tracing::debug!("Rejected JSON payload: {}", err);
    match err {
        JsonPayloadError::ContentType => AppError::InvalidInput("Expected an application/json body".into()),
        JsonPayloadError::Deserialize(e) => AppError::InvalidInput(format!("JSON error: {}", e)),
        other => AppError::InvalidInput(format!("JSON payload error: {}", other)),
    }
}

fn query_payload_error(err: QueryPayloadError) -> AppError {
    AppError::InvalidInput(format!("Query error: {}", err))
}
