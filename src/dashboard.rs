//! Page data: dashboard, book page and user profile.

use crate::db::{BookListing, Database, ReviewDetail, User};
use crate::error::{AppError, Result};
use serde::Serialize;

/// Number of reviews shown on the dashboard.
pub const RECENT_REVIEWS: usize = 3;

/// Highest star rating.
pub const MAX_STARS: u8 = 5;

/// Star positions to draw for a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarDisplay {
    /// One entry per filled star.
    pub filled: Vec<u8>,
    /// One entry per empty star.
    pub empty: Vec<u8>,
}

impl StarDisplay {
    /// Stars for a rating, clamped to 1..=5.
    pub fn for_rating(rating: u8) -> Self {
        let filled = rating.clamp(1, MAX_STARS);
        Self {
            filled: (0..filled).collect(),
            empty: (0..MAX_STARS - filled).collect(),
        }
    }
}

/// Review with its star display attached.
#[derive(Debug, Clone, Serialize)]
pub struct StarredReview {
    /// Review and display names.
    pub detail: ReviewDetail,
    /// Stars to draw.
    pub stars: StarDisplay,
}

/// Attach star display data to each review.
pub fn attach_star_display(reviews: Vec<ReviewDetail>) -> Vec<StarredReview> {
    reviews
        .into_iter()
        .map(|detail| StarredReview {
            stars: StarDisplay::for_rating(detail.review.rating),
            detail,
        })
        .collect()
}

/// Dashboard contents.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Logged in user.
    pub current_user: User,
    /// Latest reviews, newest first.
    pub recent_reviews: Vec<StarredReview>,
    /// Every book with at least one review.
    pub reviewed_books: Vec<BookListing>,
}

/// A book with all of its reviews.
#[derive(Debug, Clone)]
pub struct BookPage {
    /// Book and author name.
    pub book: BookListing,
    /// Reviews, newest first.
    pub reviews: Vec<StarredReview>,
}

/// A user with their review history.
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// Profiled user.
    pub user: User,
    /// Number of reviews written.
    pub total_reviews: i64,
    /// Distinct books the user reviewed.
    pub reviewed_books: Vec<BookListing>,
}

/// Assembles page data from the store.
#[derive(Clone)]
pub struct DashboardService {
    db: Database,
}

impl DashboardService {
    /// Create a new dashboard service.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Dashboard for the logged in user.
    pub fn build_dashboard(&self, current_user_id: i64) -> Result<Dashboard> {
        let current_user = self.user(current_user_id)?;
        let recent_reviews = attach_star_display(self.db.recent_reviews(RECENT_REVIEWS)?);
        let reviewed_books = self.db.reviewed_books()?;

        Ok(Dashboard {
            current_user,
            recent_reviews,
            reviewed_books,
        })
    }

    /// Book with its reviews.
    pub fn book_page(&self, book_id: i64) -> Result<BookPage> {
        let book = self
            .db
            .get_book_listing(book_id)?
            .ok_or_else(|| AppError::NotFound("Book".to_string()))?;
        let reviews = attach_star_display(self.db.book_reviews(book_id)?);

        Ok(BookPage { book, reviews })
    }

    /// User with their review history.
    pub fn user_profile(&self, user_id: i64) -> Result<UserProfile> {
        let user = self.user(user_id)?;
        let total_reviews = self.db.count_user_reviews(user_id)?;
        let reviewed_books = self.db.books_reviewed_by(user_id)?;

        Ok(UserProfile {
            user,
            total_reviews,
            reviewed_books,
        })
    }

    fn user(&self, user_id: i64) -> Result<User> {
        self.db
            .get_user_by_id(user_id)?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}
