use axum::{
    async_trait,
    body::HttpBody,
    extract::{FromRequest, RequestParts},
    response::IntoResponse,
    BoxError, Extension, Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{auth::SharedSessions, error::AppError};

pub mod categories;
pub mod clubs;
pub mod orgpages;
pub mod reviews;
pub mod sessions;
pub mod users;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A JSON request body whose rejections use the API's error shape.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for JsonBody<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                let message = rejection.to_string();
                let status = rejection.into_response().status();
                Err(AppError::from(status, message))
            }
        }
    }
}

pub fn app() -> Router {
    let shared_sessions = SharedSessions::default();

    Router::new()
        .merge(users::app())
        .merge(sessions::app())
        .merge(categories::app())
        .merge(clubs::app())
        .merge(reviews::app())
        .merge(orgpages::app())
        .layer(Extension(shared_sessions))
}
