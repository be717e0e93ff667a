use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ErrorResponse};

/// Delete the caller's account and every task they own.
#[utoipa::path(
    delete,
    path = "/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<StatusCode> {
    state.repo.delete_user(user.id)?;
    Ok(StatusCode::NO_CONTENT)
}
