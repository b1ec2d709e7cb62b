use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::Store;
use crate::models::*;

/// Rows keyed by primary key, with the next serial value.
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert_with(&mut self, row: impl FnOnce(i32) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.entry(id).or_insert(row(id))
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    categories: Table<Category>,
    clubs: Table<Club>,
    reviews: Table<Review>,
    orgpages: Table<Orgpage>,
}

/// In-process store with the same constraints as the SQL schema.
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store with the genres already seeded.
    pub fn new() -> Self {
        let mut tables = Tables::default();
        for genre in GENRES {
            tables.categories.insert_with(|id| Category {
                id,
                genre: genre.to_string(),
            });
        }
        Self {
            tables: Mutex::new(tables),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut tables = self.tables.lock().await;

        let taken = tables
            .users
            .rows
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Ok(None);
        }

        let now = Utc::now().naive_utc();
        Ok(Some(
            tables
                .users
                .insert_with(|id| User {
                    id,
                    username: user.username,
                    email: user.email,
                    password_hash: user.password_hash,
                    created_at: now,
                    updated_at: now,
                })
                .clone(),
        ))
    }

    async fn find_user(&self, id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.tables.lock().await.users.rows.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn count_reviews_by_user(&self, user_id: i32) -> anyhow::Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .rows
            .values()
            .filter(|r| r.user_id == user_id)
            .count() as i64)
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.rows.values().cloned().collect())
    }

    async fn find_category(&self, id: i32) -> anyhow::Result<Option<Category>> {
        Ok(self.tables.lock().await.categories.rows.get(&id).cloned())
    }

    async fn find_category_by_genre(&self, genre: &str) -> anyhow::Result<Option<Category>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .rows
            .values()
            .find(|c| c.genre == genre)
            .cloned())
    }

    async fn list_clubs(&self, filter: ClubFilter) -> anyhow::Result<Vec<Club>> {
        let tables = self.tables.lock().await;

        let category_id = match &filter.genre {
            Some(genre) => match tables.categories.rows.values().find(|c| &c.genre == genre) {
                Some(category) => Some(category.id),
                None => return Ok(vec![]),
            },
            None => None,
        };

        Ok(tables
            .clubs
            .rows
            .values()
            .filter(|c| category_id.map_or(true, |id| c.category_id == id))
            .filter(|c| filter.name.as_ref().map_or(true, |name| &c.name == name))
            .cloned()
            .collect())
    }

    async fn find_club(&self, id: i32) -> anyhow::Result<Option<Club>> {
        Ok(self.tables.lock().await.clubs.rows.get(&id).cloned())
    }

    async fn create_club(&self, club: NewClub) -> anyhow::Result<Club> {
        let mut tables = self.tables.lock().await;

        if !tables.categories.rows.contains_key(&club.category_id) {
            anyhow::bail!("clubs.category_id {} has no category", club.category_id);
        }

        let now = Utc::now().naive_utc();
        Ok(tables
            .clubs
            .insert_with(|id| Club {
                id,
                name: club.name,
                admin: club.admin,
                number_of_members: club.number_of_members,
                description: club.description,
                category_id: club.category_id,
                user_id: club.user_id,
                created_at: now,
                updated_at: now,
            })
            .clone())
    }

    async fn update_club(&self, id: i32, edit: ClubEdit) -> anyhow::Result<Option<Club>> {
        let mut tables = self.tables.lock().await;

        let Some(club) = tables.clubs.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = edit.name {
            club.name = name;
        }
        if let Some(admin) = edit.admin {
            club.admin = admin;
        }
        if let Some(number_of_members) = edit.number_of_members {
            club.number_of_members = number_of_members;
        }
        if let Some(description) = edit.description {
            club.description = Some(description);
        }
        if let Some(category_id) = edit.category_id {
            club.category_id = category_id;
        }
        if let Some(updated_at) = edit.updated_at {
            club.updated_at = updated_at;
        }
        Ok(Some(club.clone()))
    }

    async fn delete_club(&self, id: i32) -> anyhow::Result<bool> {
        let mut tables = self.tables.lock().await;

        if tables.clubs.rows.remove(&id).is_none() {
            return Ok(false);
        }
        tables.reviews.rows.retain(|_, r| r.club_id != id);
        Ok(true)
    }

    async fn list_reviews(&self, club_ids: &[i32]) -> anyhow::Result<Vec<Review>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .rows
            .values()
            .filter(|r| club_ids.contains(&r.club_id))
            .cloned()
            .collect())
    }

    async fn find_review(&self, id: i32) -> anyhow::Result<Option<Review>> {
        Ok(self.tables.lock().await.reviews.rows.get(&id).cloned())
    }

    async fn create_review(&self, review: NewReview) -> anyhow::Result<Review> {
        let mut tables = self.tables.lock().await;

        if !tables.clubs.rows.contains_key(&review.club_id) {
            anyhow::bail!("reviews.club_id {} has no club", review.club_id);
        }
        if !tables.users.rows.contains_key(&review.user_id) {
            anyhow::bail!("reviews.user_id {} has no user", review.user_id);
        }

        let now = Utc::now().naive_utc();
        Ok(tables
            .reviews
            .insert_with(|id| Review {
                id,
                club_id: review.club_id,
                user_id: review.user_id,
                rating: review.rating,
                title: review.title,
                comment: review.comment,
                created_at: now,
                updated_at: now,
            })
            .clone())
    }

    async fn update_review(&self, id: i32, edit: ReviewEdit) -> anyhow::Result<Option<Review>> {
        let mut tables = self.tables.lock().await;

        let Some(review) = tables.reviews.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(rating) = edit.rating {
            review.rating = rating;
        }
        if let Some(title) = edit.title {
            review.title = Some(title);
        }
        if let Some(comment) = edit.comment {
            review.comment = Some(comment);
        }
        if let Some(updated_at) = edit.updated_at {
            review.updated_at = updated_at;
        }
        Ok(Some(review.clone()))
    }

    async fn list_orgpages(&self) -> anyhow::Result<Vec<Orgpage>> {
        let tables = self.tables.lock().await;
        Ok(tables.orgpages.rows.values().cloned().collect())
    }

    async fn find_orgpage(&self, id: i32) -> anyhow::Result<Option<Orgpage>> {
        Ok(self.tables.lock().await.orgpages.rows.get(&id).cloned())
    }

    async fn create_orgpage(&self, page: NewOrgpage) -> anyhow::Result<Orgpage> {
        let mut tables = self.tables.lock().await;

        let now = Utc::now().naive_utc();
        Ok(tables
            .orgpages
            .insert_with(|id| Orgpage {
                id,
                title: page.title,
                body: page.body,
                created_at: now,
                updated_at: now,
            })
            .clone())
    }

    async fn update_orgpage(
        &self,
        id: i32,
        edit: OrgpageEdit,
    ) -> anyhow::Result<Option<Orgpage>> {
        let mut tables = self.tables.lock().await;

        let Some(page) = tables.orgpages.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = edit.title {
            page.title = title;
        }
        if let Some(body) = edit.body {
            page.body = body;
        }
        if let Some(updated_at) = edit.updated_at {
            page.updated_at = updated_at;
        }
        Ok(Some(page.clone()))
    }

    async fn delete_orgpage(&self, id: i32) -> anyhow::Result<bool> {
        Ok(self.tables.lock().await.orgpages.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_club(name: &str, category_id: i32) -> NewClub {
        NewClub {
            name: name.to_string(),
            admin: "admin".to_string(),
            number_of_members: 3,
            description: None,
            category_id,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn seeds_every_genre_in_order() {
        let store = MemoryStore::new();
        let genres: Vec<_> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.genre)
            .collect();
        assert_eq!(genres, GENRES);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let store = MemoryStore::new();
        assert!(store
            .create_user(new_user("alice", "alice@example.com"))
            .await
            .unwrap()
            .is_some());
        assert!(store
            .create_user(new_user("alice", "other@example.com"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .create_user(new_user("bob", "alice@example.com"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn filters_clubs_by_genre_and_name() {
        let store = MemoryStore::new();
        let sports = store.find_category_by_genre("Sports").await.unwrap().unwrap();
        let greek = store.find_category_by_genre("Greek").await.unwrap().unwrap();
        store.create_club(new_club("Tennis", sports.id)).await.unwrap();
        store.create_club(new_club("Alpha Xi Delta", greek.id)).await.unwrap();

        let filter = ClubFilter {
            genre: Some("Sports".to_string()),
            name: None,
        };
        let clubs = store.list_clubs(filter).await.unwrap();
        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].name, "Tennis");

        let filter = ClubFilter {
            genre: None,
            name: Some("Alpha Xi Delta".to_string()),
        };
        assert_eq!(store.list_clubs(filter).await.unwrap().len(), 1);

        let filter = ClubFilter {
            genre: Some("sports".to_string()),
            name: None,
        };
        assert!(store.list_clubs(filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_club_removes_its_reviews() {
        let store = MemoryStore::new();
        let user = store
            .create_user(new_user("alice", "alice@example.com"))
            .await
            .unwrap()
            .unwrap();
        let club = store.create_club(new_club("Drama", 8)).await.unwrap();
        store
            .create_review(NewReview {
                club_id: club.id,
                user_id: user.id,
                rating: 4,
                title: None,
                comment: Some("fun".to_string()),
            })
            .await
            .unwrap();

        assert!(store.delete_club(club.id).await.unwrap());
        assert!(store.list_reviews(&[club.id]).await.unwrap().is_empty());
        assert!(!store.delete_club(club.id).await.unwrap());
    }
}
