use super::JsonBody;
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    models::{average_rating, NewReview, Review, ReviewEdit},
    store::SharedStore,
};
use axum::{extract::Path, http::StatusCode, routing::{get, put}, Extension, Json, Router};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const MIN_RATING: i32 = 1;
const MAX_RATING: i32 = 5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    id: i32,
    club_id: i32,
    user_id: i32,
    rating: i32,
    title: Option<String>,
    comment: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            club_id: review.club_id,
            user_id: review.user_id,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClubReviewsResponse {
    average_rating: Option<f64>,
    reviews: Vec<ReviewResponse>,
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::invalid(vec![format!(
            "rating must be between {MIN_RATING} and {MAX_RATING} stars"
        )]))
    }
}

async fn ensure_club_exists(store: &SharedStore, club_id: i32) -> AppResult<()> {
    match store.find_club(club_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("club")),
    }
}

async fn list(
    Extension(store): Extension<SharedStore>,
    Path(club_id): Path<i32>,
) -> AppResult<Json<ClubReviewsResponse>> {
    ensure_club_exists(&store, club_id).await?;

    let reviews = store.list_reviews(&[club_id]).await?;

    Ok(Json(ClubReviewsResponse {
        average_rating: average_rating(&reviews),
        reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
struct ReviewRequest {
    rating: i32,
    title: Option<String>,
    comment: Option<String>,
}

async fn create(
    Extension(store): Extension<SharedStore>,
    Path(club_id): Path<i32>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    ensure_club_exists(&store, club_id).await?;
    validate_rating(req.rating)?;

    let review = store
        .create_review(NewReview {
            club_id,
            user_id: user.id,
            rating: req.rating,
            title: req.title,
            comment: req.comment,
        })
        .await?;

    tracing::info!(
        review_id = review.id,
        club_id,
        user_id = user.id,
        rating = review.rating,
        "posted review"
    );

    Ok((StatusCode::CREATED, Json(review.into())))
}

#[derive(Deserialize)]
struct ReviewEditRequest {
    rating: Option<i32>,
    title: Option<String>,
    comment: Option<String>,
}

async fn edit(
    Extension(store): Extension<SharedStore>,
    Path((club_id, review_id)): Path<(i32, i32)>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<ReviewEditRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = store
        .find_review(review_id)
        .await?
        .filter(|r| r.club_id == club_id)
        .ok_or_else(|| AppError::not_found("review"))?;

    if review.user_id != user.id {
        return Err(AppError::from(
            StatusCode::FORBIDDEN,
            "only the author can edit a review",
        ));
    }

    if let Some(rating) = req.rating {
        validate_rating(rating)?;
    }

    let review = store
        .update_review(
            review.id,
            ReviewEdit {
                rating: req.rating,
                title: req.title,
                comment: req.comment,
                updated_at: Some(Utc::now().naive_utc()),
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("review"))?;

    Ok(Json(review.into()))
}

pub fn app() -> Router {
    Router::new()
        .route("/clubs/:club_id/reviews", get(list).post(create))
        .route("/clubs/:club_id/reviews/:review_id", put(edit))
}
