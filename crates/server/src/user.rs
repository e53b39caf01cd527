//! Registration and profile endpoints.

use api_types::user::{RegisterRequest, UserProfile};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{RegisterUserCmd, User};

use crate::{ServerError, convert::user_profile, server::ServerState};

/// Public: creates a user with the `USER` role.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ServerError> {
    let user = state
        .engine
        .register_user(RegisterUserCmd::new(
            payload.email,
            payload.name,
            payload.password,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(user_profile(&user))))
}

pub async fn profile(Extension(user): Extension<User>) -> Json<UserProfile> {
    Json(user_profile(&user))
}
