//! Review submission and removal.

use crate::catalog::CatalogService;
use crate::db::{Database, Review};
use crate::error::{AppError, Result};
use crate::validation::{BookReviewForm, NewReviewForm};

/// Review service.
#[derive(Clone)]
pub struct ReviewService {
    db: Database,
    catalog: CatalogService,
}

impl ReviewService {
    /// Create a new review service.
    pub fn new(db: Database, catalog: CatalogService) -> Self {
        Self { db, catalog }
    }

    /// Review a book by title and author, creating either if needed.
    ///
    /// Nothing is written unless every check passes.
    pub fn submit_new_review(&self, form: &NewReviewForm, user_id: i64) -> Result<Review> {
        let mut checked = form.check();

        if let Some(selection) = &checked.author
            && let Some(problem) = self.catalog.check_author(selection)?
        {
            checked.errors.push(problem.to_string());
        }

        let (Some(selection), Some(rating), true) =
            (checked.author, checked.rating, checked.errors.is_empty())
        else {
            tracing::debug!(errors = ?checked.errors, "Review rejected");
            return Err(AppError::Validation(checked.errors));
        };

        self.require_user(user_id)?;

        let recorded = self.db.record_review(
            &selection,
            &checked.title,
            &form.description,
            rating,
            user_id,
        )?;

        if recorded.author_created {
            tracing::info!(
                author_id = recorded.author.id,
                name = %recorded.author.full_name(),
                "Created author"
            );
        }
        if recorded.book_created {
            tracing::info!(
                book_id = recorded.book.id,
                author_id = recorded.author.id,
                title = %recorded.book.title,
                "Created book"
            );
        }

        let review = recorded.review;
        tracing::info!(review_id = review.id, book_id = review.book_id, user_id, "Created review");
        Ok(review)
    }

    /// Review a book that already exists.
    pub fn submit_review_for_existing_book(
        &self,
        book_id: i64,
        form: &BookReviewForm,
        user_id: i64,
    ) -> Result<Review> {
        let rating = form.check().map_err(|errors| {
            tracing::debug!(?errors, "Review rejected");
            AppError::Validation(errors)
        })?;

        let book = self
            .db
            .get_book(book_id)?
            .ok_or_else(|| AppError::NotFound("Book".to_string()))?;
        self.require_user(user_id)?;

        let review = self
            .db
            .create_review(&form.description, rating, user_id, book.id)?;

        tracing::info!(review_id = review.id, book_id = book.id, user_id, "Created review");
        Ok(review)
    }

    /// Get review by ID.
    pub fn get_review(&self, review_id: i64) -> Result<Review> {
        self.db
            .get_review(review_id)?
            .ok_or_else(|| AppError::NotFound("Review".to_string()))
    }

    /// Remove a review and return it. Its book stays.
    pub fn delete_review(&self, review_id: i64) -> Result<Review> {
        let review = self.get_review(review_id)?;

        if !self.db.delete_review(review.id)? {
            return Err(AppError::NotFound("Review".to_string()));
        }

        tracing::info!(review_id = review.id, book_id = review.book_id, "Deleted review");
        Ok(review)
    }

    fn require_user(&self, user_id: i64) -> Result<()> {
        self.db
            .get_user_by_id(user_id)?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}
