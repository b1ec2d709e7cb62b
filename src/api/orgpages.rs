use super::{JsonBody, MessageResponse};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::{NewOrgpage, Orgpage, OrgpageEdit},
    store::SharedStore,
};
use axum::{extract::Path, http::StatusCode, routing::get, Extension, Json, Router};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrgpageResponse {
    id: i32,
    title: String,
    body: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<Orgpage> for OrgpageResponse {
    fn from(page: Orgpage) -> Self {
        Self {
            id: page.id,
            title: page.title,
            body: page.body,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct OrgpageRequest {
    title: String,
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
struct OrgpageEditRequest {
    title: Option<String>,
    body: Option<String>,
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::invalid(vec!["title can't be blank".to_string()]));
    }
    Ok(())
}

async fn list(Extension(store): Extension<SharedStore>) -> AppResult<Json<Vec<OrgpageResponse>>> {
    Ok(Json(
        store
            .list_orgpages()
            .await?
            .into_iter()
            .map(OrgpageResponse::from)
            .collect(),
    ))
}

async fn show(
    Extension(store): Extension<SharedStore>,
    Path(page_id): Path<i32>,
) -> AppResult<Json<OrgpageResponse>> {
    let page = store
        .find_orgpage(page_id)
        .await?
        .ok_or_else(|| AppError::not_found("org page"))?;
    Ok(Json(page.into()))
}

async fn create(
    Extension(store): Extension<SharedStore>,
    CurrentUser(_): CurrentUser,
    JsonBody(req): JsonBody<OrgpageRequest>,
) -> AppResult<(StatusCode, Json<OrgpageResponse>)> {
    validate_title(&req.title)?;

    let page = store
        .create_orgpage(NewOrgpage {
            title: req.title.trim().to_string(),
            body: req.body,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(page.into())))
}

async fn edit(
    Extension(store): Extension<SharedStore>,
    Path(page_id): Path<i32>,
    CurrentUser(_): CurrentUser,
    JsonBody(req): JsonBody<OrgpageEditRequest>,
) -> AppResult<Json<OrgpageResponse>> {
    if store.find_orgpage(page_id).await?.is_none() {
        return Err(AppError::not_found("org page"));
    }

    if let Some(title) = &req.title {
        validate_title(title)?;
    }

    let page = store
        .update_orgpage(
            page_id,
            OrgpageEdit {
                title: req.title.map(|t| t.trim().to_string()),
                body: req.body,
                updated_at: Some(Utc::now().naive_utc()),
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("org page"))?;

    Ok(Json(page.into()))
}

async fn destroy(
    Extension(store): Extension<SharedStore>,
    Path(page_id): Path<i32>,
    CurrentUser(_): CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    if !store.delete_orgpage(page_id).await? {
        return Err(AppError::not_found("org page"));
    }
    Ok(Json(MessageResponse::new("Org Page was successfully destroyed.")))
}

pub fn app() -> Router {
    Router::new()
        .route("/orgpages", get(list).post(create))
        .route("/orgpages/:page_id", get(show).put(edit).delete(destroy))
}
