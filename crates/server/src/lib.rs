use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::ErrorBody;
pub use server::{ServerState, router, run, run_with_listener};

mod accounts;
mod budgets;
mod categories;
mod convert;
mod server;
mod transactions;
mod user;

pub enum ServerError {
    Engine(EngineError),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
        err if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError::Engine(err) = self;
        let status = status_for_engine_error(&err);
        let error = message_for_engine_error(err);

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
