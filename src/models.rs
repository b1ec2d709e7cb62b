use crate::schema::*;
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Genres seeded into `categories`, in seed order.
pub const GENRES: [&str; 14] = [
    "Academics",
    "Engineering",
    "Cultural",
    "Religious",
    "Science",
    "Other",
    "Service and Social Justice",
    "Performing Arts",
    "Greek",
    "Arts",
    "Health",
    "Music",
    "Politics",
    "Sports",
];

#[derive(Debug, Clone, Queryable, Identifiable)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub genre: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(belongs_to(Category))]
#[diesel(belongs_to(User))]
pub struct Club {
    pub id: i32,
    pub name: String,
    pub admin: String,
    pub number_of_members: i32,
    pub description: Option<String>,
    pub category_id: i32,
    pub user_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clubs)]
pub struct NewClub {
    pub name: String,
    pub admin: String,
    pub number_of_members: i32,
    pub description: Option<String>,
    pub category_id: i32,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = clubs)]
pub struct ClubEdit {
    pub name: Option<String>,
    pub admin: Option<String>,
    pub number_of_members: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Narrows a club listing. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    pub genre: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(belongs_to(Club))]
#[diesel(belongs_to(User))]
pub struct Review {
    pub id: i32,
    pub club_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub club_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = reviews)]
pub struct ReviewEdit {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
pub struct Orgpage {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orgpages)]
pub struct NewOrgpage {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = orgpages)]
pub struct OrgpageEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Mean star rating over `reviews`, or `None` for a club nobody has reviewed.
pub fn average_rating<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Option<f64> {
    let (sum, count) = reviews
        .into_iter()
        .fold((0i64, 0u32), |(sum, count), r| (sum + r.rating as i64, count + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32) -> Review {
        let now = chrono::Utc::now().naive_utc();
        Review {
            id: 0,
            club_id: 1,
            user_id: 1,
            rating,
            title: None,
            comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn average_of_no_reviews_is_none() {
        assert_eq!(average_rating(&Vec::<Review>::new()), None);
    }

    #[test]
    fn average_is_arithmetic_mean() {
        let reviews = [review(5), review(4), review(2)];
        let avg = average_rating(&reviews).unwrap();
        assert!((avg - 11.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn genres_are_unique() {
        let mut genres = GENRES.to_vec();
        genres.sort_unstable();
        genres.dedup();
        assert_eq!(genres.len(), GENRES.len());
    }
}
