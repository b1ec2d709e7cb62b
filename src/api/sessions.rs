use super::{users::UserResponse, JsonBody, MessageResponse};
use crate::{
    auth::{self, CurrentUser, SessionId, SharedSessions},
    error::{AppError, AppResult},
    store::SharedStore,
};
use axum::{
    http::{header::SET_COOKIE, HeaderName, StatusCode},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct LoginRequest {
    /// A username, or an email address when it contains `@`.
    login: String,
    password: String,
}

async fn login(
    Extension(store): Extension<SharedStore>,
    Extension(sessions): Extension<SharedSessions>,
    SessionId(previous): SessionId,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<([(HeaderName, String); 1], Json<UserResponse>)> {
    let login = req.login.trim();
    let user = if login.contains('@') {
        store.find_user_by_email(&login.to_lowercase()).await?
    } else {
        store.find_user_by_username(login).await?
    };

    if let Some(user) = user {
        if auth::verify_password(&req.password, &user.password_hash)? {
            let mut sessions = sessions.lock().await;
            if let Some(previous) = previous {
                sessions.destroy(&previous);
            }
            let sid = sessions.create(user.id);
            drop(sessions);

            tracing::info!(user_id = user.id, "user logged in");
            return Ok(([(SET_COOKIE, auth::session_cookie(&sid))], Json(user.into())));
        }
    }

    Err(AppError::from(
        StatusCode::UNAUTHORIZED,
        "invalid username or password",
    ))
}

async fn current(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

async fn logout(
    Extension(sessions): Extension<SharedSessions>,
    SessionId(sid): SessionId,
) -> ([(HeaderName, String); 1], Json<MessageResponse>) {
    if let Some(sid) = sid {
        if let Some(user_id) = sessions.lock().await.destroy(&sid) {
            tracing::info!(user_id, "user logged out");
        }
    }

    (
        [(SET_COOKIE, auth::expired_session_cookie())],
        Json(MessageResponse::new("You have successfully logged out")),
    )
}

pub fn app() -> Router {
    Router::new().route("/session", get(current).post(login).delete(logout))
}
