use async_trait::async_trait;
use deadpool::managed::Pool;
use diesel::{pg::Pg, prelude::*};
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection, RunQueryDsl};

use super::Store;
use crate::{models::*, schema::*};

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn connect_to_db(db_url: &str) -> anyhow::Result<DbPool> {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Pool::builder(db_config)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build database pool: {e}"))
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::insert_into(users::table)
            .values(user)
            .on_conflict_do_nothing()
            .get_result::<User>(conn)
            .await
            .optional()?)
    }

    async fn find_user(&self, id: i32) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(users::table
            .find(id)
            .first::<User>(conn)
            .await
            .optional()?)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(users::table
            .filter(users::username.eq(username))
            .first::<User>(conn)
            .await
            .optional()?)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let conn = &mut self.pool.get().await?;

        Ok(users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .await
            .optional()?)
    }

    async fn count_reviews_by_user(&self, user_id: i32) -> anyhow::Result<i64> {
        let conn = &mut self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::user_id.eq(user_id))
            .count()
            .get_result::<i64>(conn)
            .await?)
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let conn = &mut self.pool.get().await?;

        Ok(categories::table
            .order(categories::id)
            .load::<Category>(conn)
            .await?)
    }

    async fn find_category(&self, id: i32) -> anyhow::Result<Option<Category>> {
        let conn = &mut self.pool.get().await?;

        Ok(categories::table
            .find(id)
            .first::<Category>(conn)
            .await
            .optional()?)
    }

    async fn find_category_by_genre(&self, genre: &str) -> anyhow::Result<Option<Category>> {
        let conn = &mut self.pool.get().await?;

        Ok(categories::table
            .filter(categories::genre.eq(genre))
            .first::<Category>(conn)
            .await
            .optional()?)
    }

    async fn list_clubs(&self, filter: ClubFilter) -> anyhow::Result<Vec<Club>> {
        let conn = &mut self.pool.get().await?;

        let mut query = clubs::table
            .inner_join(categories::table)
            .select(clubs::all_columns)
            .order(clubs::id)
            .into_boxed::<Pg>();
        if let Some(genre) = filter.genre {
            query = query.filter(categories::genre.eq(genre));
        }
        if let Some(name) = filter.name {
            query = query.filter(clubs::name.eq(name));
        }

        Ok(query.load::<Club>(conn).await?)
    }

    async fn find_club(&self, id: i32) -> anyhow::Result<Option<Club>> {
        let conn = &mut self.pool.get().await?;

        Ok(clubs::table
            .find(id)
            .first::<Club>(conn)
            .await
            .optional()?)
    }

    async fn create_club(&self, club: NewClub) -> anyhow::Result<Club> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::insert_into(clubs::table)
            .values(club)
            .get_result::<Club>(conn)
            .await?)
    }

    async fn update_club(&self, id: i32, edit: ClubEdit) -> anyhow::Result<Option<Club>> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::update(clubs::table.find(id))
            .set(edit)
            .get_result::<Club>(conn)
            .await
            .optional()?)
    }

    async fn delete_club(&self, id: i32) -> anyhow::Result<bool> {
        let conn = &mut self.pool.get().await?;

        // reviews go with it through ON DELETE CASCADE
        let deleted = diesel::delete(clubs::table.find(id))
            .execute(conn)
            .await?;
        Ok(deleted > 0)
    }

    async fn list_reviews(&self, club_ids: &[i32]) -> anyhow::Result<Vec<Review>> {
        let conn = &mut self.pool.get().await?;

        Ok(reviews::table
            .filter(reviews::club_id.eq_any(club_ids.to_vec()))
            .order(reviews::id)
            .load::<Review>(conn)
            .await?)
    }

    async fn find_review(&self, id: i32) -> anyhow::Result<Option<Review>> {
        let conn = &mut self.pool.get().await?;

        Ok(reviews::table
            .find(id)
            .first::<Review>(conn)
            .await
            .optional()?)
    }

    async fn create_review(&self, review: NewReview) -> anyhow::Result<Review> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::insert_into(reviews::table)
            .values(review)
            .get_result::<Review>(conn)
            .await?)
    }

    async fn update_review(&self, id: i32, edit: ReviewEdit) -> anyhow::Result<Option<Review>> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::update(reviews::table.find(id))
            .set(edit)
            .get_result::<Review>(conn)
            .await
            .optional()?)
    }

    async fn list_orgpages(&self) -> anyhow::Result<Vec<Orgpage>> {
        let conn = &mut self.pool.get().await?;

        Ok(orgpages::table
            .order(orgpages::id)
            .load::<Orgpage>(conn)
            .await?)
    }

    async fn find_orgpage(&self, id: i32) -> anyhow::Result<Option<Orgpage>> {
        let conn = &mut self.pool.get().await?;

        Ok(orgpages::table
            .find(id)
            .first::<Orgpage>(conn)
            .await
            .optional()?)
    }

    async fn create_orgpage(&self, page: NewOrgpage) -> anyhow::Result<Orgpage> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::insert_into(orgpages::table)
            .values(page)
            .get_result::<Orgpage>(conn)
            .await?)
    }

    async fn update_orgpage(
        &self,
        id: i32,
        edit: OrgpageEdit,
    ) -> anyhow::Result<Option<Orgpage>> {
        let conn = &mut self.pool.get().await?;

        Ok(diesel::update(orgpages::table.find(id))
            .set(edit)
            .get_result::<Orgpage>(conn)
            .await
            .optional()?)
    }

    async fn delete_orgpage(&self, id: i32) -> anyhow::Result<bool> {
        let conn = &mut self.pool.get().await?;

        let deleted = diesel::delete(orgpages::table.find(id))
            .execute(conn)
            .await?;
        Ok(deleted > 0)
    }
}
