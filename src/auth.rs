use std::{collections::HashMap, sync::Arc};

use argon2::Argon2;
use axum::{
    async_trait,
    extract::{FromRequest, RequestParts},
    headers::Cookie,
    http::StatusCode,
    Extension, TypedHeader,
};
use nanoid::nanoid;
use password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::User,
    store::SharedStore,
};

pub const SESSION_COOKIE: &str = "session_id";

pub fn hash_password(password: impl AsRef<[u8]>) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_ref(), &salt)
        .map(|h| h.to_string())
}

pub fn verify_password(
    password: impl AsRef<[u8]>,
    password_hash: impl AsRef<str>,
) -> password_hash::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash.as_ref())?;
    Ok(Argon2::default()
        .verify_password(password.as_ref(), &parsed_hash)
        .is_ok())
}

/// Server-side sessions: session id -> user id. Sessions never expire.
#[derive(Default)]
pub struct Sessions(HashMap<String, i32>);

pub type SharedSessions = Arc<Mutex<Sessions>>;

impl Sessions {
    /// Starts a session for `user_id` and returns its id.
    pub fn create(&mut self, user_id: i32) -> String {
        let sid = nanoid!(32);
        self.0.insert(sid.clone(), user_id);
        sid
    }

    pub fn user_id(&self, sid: &str) -> Option<i32> {
        self.0.get(sid).copied()
    }

    pub fn destroy(&mut self, sid: &str) -> Option<i32> {
        self.0.remove(sid)
    }
}

pub fn session_cookie(sid: &str) -> String {
    format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// The session id sent with the request, if any.
pub struct SessionId(pub Option<String>);

#[async_trait]
impl<B: Send> FromRequest<B> for SessionId {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> AppResult<Self> {
        let sid = match Option::<TypedHeader<Cookie>>::from_request(req).await {
            Ok(Some(TypedHeader(cookie))) => cookie.get(SESSION_COOKIE).map(str::to_owned),
            _ => None,
        };
        Ok(SessionId(sid))
    }
}

/// The logged-in user. Rejects with 401 when the request has no live session.
pub struct CurrentUser(pub User);

#[async_trait]
impl<B: Send> FromRequest<B> for CurrentUser {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> AppResult<Self> {
        let unauthorized = || AppError::from(StatusCode::UNAUTHORIZED, "you must be logged in");

        let SessionId(sid) = SessionId::from_request(req).await?;
        let sid = sid.ok_or_else(unauthorized)?;

        let Extension(sessions) = Extension::<SharedSessions>::from_request(req)
            .await
            .map_err(|_| anyhow::anyhow!("session store extension is missing"))?;
        let Extension(store) = Extension::<SharedStore>::from_request(req)
            .await
            .map_err(|_| anyhow::anyhow!("store extension is missing"))?;

        let user_id = sessions.lock().await.user_id(&sid).ok_or_else(unauthorized)?;
        let user = store.find_user(user_id).await?.ok_or_else(unauthorized)?;

        Ok(CurrentUser(user))
    }
}
