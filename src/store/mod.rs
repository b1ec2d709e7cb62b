//! Persistence behind the handlers.
//!
//! Every query a handler makes goes through [`Store`]. [`PgStore`] talks to
//! PostgreSQL through diesel-async; [`MemoryStore`] keeps the same tables in
//! process memory and backs the test suite and database-less runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::*;

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::{connect_to_db, DbPool, PgStore};

pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Inserts a user. Returns `None` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> anyhow::Result<Option<User>>;
    async fn find_user(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn count_reviews_by_user(&self, user_id: i32) -> anyhow::Result<i64>;

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>>;
    async fn find_category(&self, id: i32) -> anyhow::Result<Option<Category>>;
    async fn find_category_by_genre(&self, genre: &str) -> anyhow::Result<Option<Category>>;

    async fn list_clubs(&self, filter: ClubFilter) -> anyhow::Result<Vec<Club>>;
    async fn find_club(&self, id: i32) -> anyhow::Result<Option<Club>>;
    async fn create_club(&self, club: NewClub) -> anyhow::Result<Club>;
    async fn update_club(&self, id: i32, edit: ClubEdit) -> anyhow::Result<Option<Club>>;
    /// Deletes the club and its reviews. Returns `false` if it did not exist.
    async fn delete_club(&self, id: i32) -> anyhow::Result<bool>;

    async fn list_reviews(&self, club_ids: &[i32]) -> anyhow::Result<Vec<Review>>;
    async fn find_review(&self, id: i32) -> anyhow::Result<Option<Review>>;
    async fn create_review(&self, review: NewReview) -> anyhow::Result<Review>;
    async fn update_review(&self, id: i32, edit: ReviewEdit) -> anyhow::Result<Option<Review>>;

    async fn list_orgpages(&self) -> anyhow::Result<Vec<Orgpage>>;
    async fn find_orgpage(&self, id: i32) -> anyhow::Result<Option<Orgpage>>;
    async fn create_orgpage(&self, page: NewOrgpage) -> anyhow::Result<Orgpage>;
    async fn update_orgpage(&self, id: i32, edit: OrgpageEdit)
        -> anyhow::Result<Option<Orgpage>>;
    async fn delete_orgpage(&self, id: i32) -> anyhow::Result<bool>;
}
