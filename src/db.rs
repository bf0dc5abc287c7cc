mod schema;

pub use schema::Database;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email, unique across users.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account creation timestamp.
    pub created_at: i64,
    /// Last update timestamp.
    pub updated_at: i64,
}

impl User {
    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Authentication session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session token.
    pub token: String,
    /// User ID.
    pub user_id: i64,
    /// Expiration timestamp.
    pub expires_at: i64,
}

/// Book author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Unique author ID.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last update timestamp.
    pub updated_at: i64,
}

impl Author {
    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Book owned by a single author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique book ID.
    pub id: i64,
    /// Title, unique per author.
    pub title: String,
    /// Owning author.
    pub author_id: i64,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last update timestamp.
    pub updated_at: i64,
}

/// A user's rated comment on a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique review ID.
    pub id: i64,
    /// Review text (1-500 characters).
    pub description: String,
    /// Star rating (1-5).
    pub rating: u8,
    /// Reviewer.
    pub user_id: i64,
    /// Reviewed book.
    pub book_id: i64,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last update timestamp.
    pub updated_at: i64,
}

impl Review {
    /// Creation date formatted for pages.
    pub fn posted_on(&self) -> String {
        timestamp_to_datetime(self.created_at)
            .format("%B %-d, %Y")
            .to_string()
    }
}

/// Book joined with its author's name.
#[derive(Debug, Clone, Serialize)]
pub struct BookListing {
    /// The book.
    pub book: Book,
    /// Author full name.
    pub author_name: String,
}

/// Review joined with the names pages display next to it.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetail {
    /// The review.
    pub review: Review,
    /// Title of the reviewed book.
    pub book_title: String,
    /// Author of the reviewed book.
    pub author_name: String,
    /// Reviewer's first name.
    pub reviewer_name: String,
}

/// Rows written by [`Database::record_review`].
#[derive(Debug, Clone)]
pub struct RecordedReview {
    /// Author the book belongs to.
    pub author: Author,
    /// Whether the author was inserted.
    pub author_created: bool,
    /// Reviewed book.
    pub book: Book,
    /// Whether the book was inserted.
    pub book_created: bool,
    /// The new review.
    pub review: Review,
}

/// Timestamp helper.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Convert timestamp to DateTime.
pub fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}
