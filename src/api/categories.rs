use super::clubs::{load_clubs, ClubResponse};
use crate::{
    error::{AppError, AppResult},
    models::{Category, ClubFilter},
    store::SharedStore,
};
use axum::{extract::Path, routing::get, Extension, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct CategoryResponse {
    id: i32,
    genre: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            genre: category.genre,
        }
    }
}

#[derive(Serialize)]
struct CategoryClubsResponse {
    id: i32,
    genre: String,
    clubs: Vec<ClubResponse>,
}

async fn list(Extension(store): Extension<SharedStore>) -> AppResult<Json<Vec<CategoryResponse>>> {
    Ok(Json(
        store
            .list_categories()
            .await?
            .into_iter()
            .map(CategoryResponse::from)
            .collect(),
    ))
}

// exact, case-sensitive match on the genre name
async fn show(
    Extension(store): Extension<SharedStore>,
    Path(genre): Path<String>,
) -> AppResult<Json<CategoryClubsResponse>> {
    let category = store
        .find_category_by_genre(&genre)
        .await?
        .ok_or_else(|| AppError::not_found("category"))?;

    let clubs = store
        .list_clubs(ClubFilter {
            genre: Some(category.genre.clone()),
            name: None,
        })
        .await?;

    Ok(Json(CategoryClubsResponse {
        id: category.id,
        genre: category.genre,
        clubs: load_clubs(store.as_ref(), clubs).await?,
    }))
}

pub fn app() -> Router {
    Router::new()
        .route("/categories", get(list))
        .route("/categories/:genre", get(show))
}
