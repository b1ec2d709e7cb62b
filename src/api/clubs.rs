use std::collections::HashMap;

use super::{reviews::ReviewResponse, JsonBody, MessageResponse};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::{average_rating, Category, Club, ClubEdit, ClubFilter, NewClub, Review},
    store::{SharedStore, Store},
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    id: i32,
    name: String,
    admin: String,
    number_of_members: i32,
    description: Option<String>,
    category: String,
    owner_id: Option<i32>,
    average_rating: Option<f64>,
    review_count: usize,
}

impl ClubResponse {
    fn from(club: Club, genre: String, reviews: &[Review]) -> Self {
        Self {
            id: club.id,
            name: club.name,
            admin: club.admin,
            number_of_members: club.number_of_members,
            description: club.description,
            category: genre,
            owner_id: club.user_id,
            average_rating: average_rating(reviews),
            review_count: reviews.len(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClubDetailResponse {
    #[serde(flatten)]
    club: ClubResponse,
    reviews: Vec<ReviewResponse>,
}

/// Attaches each club's category and its review aggregate.
pub async fn load_clubs(store: &dyn Store, clubs: Vec<Club>) -> AppResult<Vec<ClubResponse>> {
    let genres: HashMap<i32, String> = store
        .list_categories()
        .await?
        .into_iter()
        .map(|c| (c.id, c.genre))
        .collect();

    let club_ids: Vec<i32> = clubs.iter().map(|c| c.id).collect();
    let mut reviews = store
        .list_reviews(&club_ids)
        .await?
        .into_iter()
        .map(|r| (r.club_id, r))
        .into_group_map();

    clubs
        .into_iter()
        .map(|club| -> AppResult<ClubResponse> {
            let genre = genres
                .get(&club.category_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("club {} has no category", club.id))?;
            let reviews = reviews.remove(&club.id).unwrap_or_default();
            Ok(ClubResponse::from(club, genre, &reviews))
        })
        .collect()
}

async fn find_category(store: &dyn Store, genre: &str) -> AppResult<Category> {
    store
        .find_category_by_genre(genre)
        .await?
        .ok_or_else(|| AppError::from(StatusCode::BAD_REQUEST, "invalid category"))
}

fn validate_name(name: &str, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("name can't be blank".to_string());
    }
}

fn validate_members(number_of_members: i32, errors: &mut Vec<String>) {
    if number_of_members < 0 {
        errors.push("number of members can't be negative".to_string());
    }
}

#[derive(Deserialize)]
struct ClubQuery {
    category: Option<String>,
    name: Option<String>,
}

async fn list(
    Extension(store): Extension<SharedStore>,
    Query(query): Query<ClubQuery>,
) -> AppResult<Json<Vec<ClubResponse>>> {
    let clubs = store
        .list_clubs(ClubFilter {
            genre: query.category,
            name: query.name,
        })
        .await?;

    Ok(Json(load_clubs(store.as_ref(), clubs).await?))
}

async fn info(
    Extension(store): Extension<SharedStore>,
    Path(club_id): Path<i32>,
) -> AppResult<Json<ClubDetailResponse>> {
    let club = store
        .find_club(club_id)
        .await?
        .ok_or_else(|| AppError::not_found("club"))?;
    let reviews = store.list_reviews(&[club.id]).await?;
    let genre = store
        .find_category(club.category_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("club {} has no category", club.id))?
        .genre;

    Ok(Json(ClubDetailResponse {
        club: ClubResponse::from(club, genre, &reviews),
        reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubRequest {
    name: String,
    #[serde(default)]
    admin: String,
    #[serde(default)]
    number_of_members: i32,
    category: String,
    description: Option<String>,
}

async fn create(
    Extension(store): Extension<SharedStore>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<ClubRequest>,
) -> AppResult<(StatusCode, Json<ClubResponse>)> {
    let mut errors = vec![];
    validate_name(&req.name, &mut errors);
    validate_members(req.number_of_members, &mut errors);
    if !errors.is_empty() {
        return Err(AppError::invalid(errors));
    }

    let category = find_category(store.as_ref(), &req.category).await?;

    let club = store
        .create_club(NewClub {
            name: req.name.trim().to_string(),
            admin: req.admin,
            number_of_members: req.number_of_members,
            description: req.description,
            category_id: category.id,
            user_id: Some(user.id),
        })
        .await?;

    tracing::info!(club_id = club.id, user_id = user.id, "created club {}", club.name);

    Ok((
        StatusCode::CREATED,
        Json(ClubResponse::from(club, category.genre, &[])),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubEditRequest {
    name: Option<String>,
    admin: Option<String>,
    number_of_members: Option<i32>,
    category: Option<String>,
    description: Option<String>,
}

async fn edit(
    Extension(store): Extension<SharedStore>,
    Path(club_id): Path<i32>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<ClubEditRequest>,
) -> AppResult<Json<ClubResponse>> {
    if store.find_club(club_id).await?.is_none() {
        return Err(AppError::not_found("club"));
    }

    let mut errors = vec![];
    if let Some(name) = &req.name {
        validate_name(name, &mut errors);
    }
    if let Some(number_of_members) = req.number_of_members {
        validate_members(number_of_members, &mut errors);
    }
    if !errors.is_empty() {
        return Err(AppError::invalid(errors));
    }

    let category_id = match &req.category {
        Some(genre) => Some(find_category(store.as_ref(), genre).await?.id),
        None => None,
    };

    let club = store
        .update_club(
            club_id,
            ClubEdit {
                name: req.name.map(|n| n.trim().to_string()),
                admin: req.admin,
                number_of_members: req.number_of_members,
                description: req.description,
                category_id,
                updated_at: Some(Utc::now().naive_utc()),
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("club"))?;

    tracing::info!(club_id, user_id = user.id, "updated club");

    Ok(Json(load_clubs(store.as_ref(), vec![club]).await?.pop().ok_or_else(
        || anyhow::anyhow!("`load_clubs` should return one club"),
    )?))
}

async fn destroy(
    Extension(store): Extension<SharedStore>,
    Path(club_id): Path<i32>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    if !store.delete_club(club_id).await? {
        return Err(AppError::not_found("club"));
    }

    tracing::info!(club_id, user_id = user.id, "destroyed club");

    Ok(Json(MessageResponse::new("Club was successfully destroyed.")))
}

pub fn app() -> Router {
    Router::new()
        .route("/clubs", get(list).post(create))
        .route("/clubs/:club_id", get(info).put(edit).delete(destroy))
}
