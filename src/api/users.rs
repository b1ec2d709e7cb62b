use super::JsonBody;
use crate::{
    auth::{self, SessionId, SharedSessions},
    error::{AppError, AppResult},
    models::{NewUser, User},
    store::SharedStore,
};
use axum::{
    extract::Path,
    http::{header::SET_COOKIE, HeaderName, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}$").expect("email regex is valid");
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    username: String,
    email: String,
    password: String,
    password_confirmation: Option<String>,
}

impl SignUpRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        let username_len = self.username.trim().chars().count();
        if username_len == 0 {
            errors.push("username can't be blank".to_string());
        } else if !(3..=20).contains(&username_len) {
            errors.push("username must be between 3 and 20 characters".to_string());
        }
        // logins containing `@` are looked up by email
        if self.username.contains('@') {
            errors.push("username can't contain @".to_string());
        }

        if self.email.trim().is_empty() {
            errors.push("email can't be blank".to_string());
        } else if !EMAIL_REGEX.is_match(self.email.trim()) {
            errors.push("email is invalid".to_string());
        }

        if !(6..=20).contains(&self.password.chars().count()) {
            errors.push("password must be between 6 and 20 characters".to_string());
        }
        if let Some(confirmation) = &self.password_confirmation {
            if confirmation != &self.password {
                errors.push("password confirmation doesn't match password".to_string());
            }
        }

        errors
    }
}

/// The logged-in user's own account.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    id: i32,
    username: String,
    review_count: i64,
    created_at: NaiveDateTime,
}

async fn sign_up(
    Extension(store): Extension<SharedStore>,
    Extension(sessions): Extension<SharedSessions>,
    SessionId(previous): SessionId,
    JsonBody(req): JsonBody<SignUpRequest>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<UserResponse>)> {
    let errors = req.validate();
    if !errors.is_empty() {
        return Err(AppError::invalid(errors));
    }

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    let new_user = store
        .create_user(NewUser {
            username: username.clone(),
            email,
            password_hash: auth::hash_password(req.password)?,
        })
        .await?;

    let Some(new_user) = new_user else {
        let message = if store.find_user_by_username(&username).await?.is_some() {
            "username has been taken"
        } else {
            "email has been taken"
        };
        return Err(AppError::from(StatusCode::CONFLICT, message));
    };

    tracing::info!(user_id = new_user.id, "registered user {}", new_user.username);

    let mut sessions = sessions.lock().await;
    if let Some(previous) = previous {
        sessions.destroy(&previous);
    }
    let sid = sessions.create(new_user.id);
    drop(sessions);

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, auth::session_cookie(&sid))],
        Json(new_user.into()),
    ))
}

async fn profile(
    Extension(store): Extension<SharedStore>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ProfileResponse>> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    let review_count = store.count_reviews_by_user(user.id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        review_count,
        created_at: user.created_at,
    }))
}

pub fn app() -> Router {
    Router::new()
        .route("/users", post(sign_up))
        .route("/users/:user_id", get(profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: None,
        }
    }

    #[test]
    fn accepts_a_well_formed_sign_up() {
        assert!(request("alice", "Alice@Example.edu", "secret1")
            .validate()
            .is_empty());
    }

    #[test]
    fn rejects_short_and_long_usernames() {
        assert_eq!(request("al", "a@b.com", "secret1").validate().len(), 1);
        assert_eq!(
            request(&"a".repeat(21), "a@b.com", "secret1").validate().len(),
            1
        );
    }

    #[test]
    fn rejects_at_sign_in_username() {
        let errors = request("al@ice", "alice@example.edu", "secret1").validate();
        assert_eq!(errors, vec!["username can't contain @".to_string()]);
    }

    #[test]
    fn rejects_malformed_email() {
        let errors = request("alice", "alice@localhost", "secret1").validate();
        assert_eq!(errors, vec!["email is invalid".to_string()]);
    }

    #[test]
    fn enforces_password_length_and_confirmation() {
        assert_eq!(request("alice", "a@b.com", "short").validate().len(), 1);

        let mut req = request("alice", "a@b.com", "secret1");
        req.password_confirmation = Some("secret2".to_string());
        assert_eq!(
            req.validate(),
            vec!["password confirmation doesn't match password".to_string()]
        );
    }
}
