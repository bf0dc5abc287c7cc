//! Form validation.
//!
//! Every rule here works on plain form structs. Lookups that need storage
//! (is this email taken?) are passed in as closures, so the rules can be
//! exercised without a database.

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static LETTERS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]*$").unwrap());

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.+_-]+@[a-zA-Z0-9._-]+\.[a-zA-Z]*$").unwrap());

/// Longest accepted review text, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Longest accepted book title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

pub(crate) const NAME_TOO_SHORT: &str =
    "First and last name are required and must be at least 2 characters.";
pub(crate) const NAME_NOT_LETTERS: &str = "First and last name must be letters only.";
pub(crate) const EMAIL_REQUIRED: &str = "Email field is required.";
pub(crate) const EMAIL_INVALID: &str = "Email format is invalid.";
pub(crate) const EMAIL_TAKEN: &str = "Email address already registered.";
pub(crate) const PASSWORD_TOO_SHORT: &str =
    "Password fields are required and must be at least 8 characters.";
pub(crate) const PASSWORD_MISMATCH: &str = "Password and confirmation password must match.";
pub(crate) const LOGIN_FIELDS_REQUIRED: &str = "All fields are required.";
pub(crate) const TITLE_AND_REVIEW_REQUIRED: &str = "A book title and book review is required.";
pub(crate) const REVIEW_REQUIRED: &str = "A review is required.";
pub(crate) const REVIEW_TOO_LONG: &str = "Review must be less than 500 characters.";
pub(crate) const TITLE_TOO_LONG: &str = "Title must be less than 100 characters.";
pub(crate) const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5.";
pub(crate) const AUTHOR_NAME_SHAPE: &str =
    "New Author may contain a first and last name only. Middle names or initials are not allowed.";
pub(crate) const AUTHOR_EXISTS: &str = "This author already exists in the dropdown.";
pub(crate) const AUTHOR_REQUIRED: &str = "Please select an existing author or add a new one.";

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Registration form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Collect every failing rule, in form order.
    ///
    /// Dependent checks are skipped once an earlier one fails: the email
    /// format is only checked for a plausibly long email, and the
    /// registration lookup only for a well-formed one. Likewise the
    /// confirmation is only compared for a long enough password.
    pub fn check<F>(&self, is_registered: F) -> Result<Vec<String>>
    where
        F: FnOnce(&str) -> Result<bool>,
    {
        let mut errors = Vec::new();

        if char_len(&self.first_name) < 2 || char_len(&self.last_name) < 2 {
            errors.push(NAME_TOO_SHORT.to_string());
        }

        if !LETTERS_ONLY.is_match(&self.first_name) || !LETTERS_ONLY.is_match(&self.last_name) {
            errors.push(NAME_NOT_LETTERS.to_string());
        }

        if char_len(&self.email) < 5 {
            errors.push(EMAIL_REQUIRED.to_string());
        } else if !EMAIL.is_match(&self.email) {
            errors.push(EMAIL_INVALID.to_string());
        } else if is_registered(&self.email)? {
            errors.push(EMAIL_TAKEN.to_string());
        }

        if char_len(&self.password) < 8 {
            errors.push(PASSWORD_TOO_SHORT.to_string());
        } else if self.password != self.confirm_password {
            errors.push(PASSWORD_MISMATCH.to_string());
        }

        Ok(errors)
    }
}

/// Login form fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl LoginForm {
    /// Presence check; credentials themselves are checked against the store.
    pub fn check(&self) -> Vec<String> {
        if char_len(&self.email) < 5 || char_len(&self.password) < 8 {
            vec![LOGIN_FIELDS_REQUIRED.to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Which author a new review's book belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorSelection {
    /// An author picked from the existing list.
    Existing(i64),
    /// A new author typed in as "First Last".
    New {
        /// Given name.
        first_name: String,
        /// Family name.
        last_name: String,
    },
}

impl AuthorSelection {
    /// Interpret the dropdown value and the free-text field.
    ///
    /// Non-empty free text wins over the dropdown.
    pub fn from_fields(
        existing: &str,
        new_name: &str,
    ) -> std::result::Result<Self, &'static str> {
        if !new_name.trim().is_empty() {
            let (first_name, last_name) = parse_author_name(new_name).ok_or(AUTHOR_NAME_SHAPE)?;
            return Ok(AuthorSelection::New {
                first_name,
                last_name,
            });
        }

        existing
            .trim()
            .parse()
            .map(AuthorSelection::Existing)
            .map_err(|_| AUTHOR_REQUIRED)
    }
}

/// Split "First Last" into its two names. Any other token count is refused.
pub fn parse_author_name(name: &str) -> Option<(String, String)> {
    let mut tokens = name.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(first), Some(last), None) => Some((first.to_string(), last.to_string())),
        _ => None,
    }
}

/// Parse a submitted star rating.
pub fn parse_rating(value: &str) -> Option<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|rating| (1..=5).contains(rating))
}

/// Form for reviewing a book that may not exist yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReviewForm {
    /// Book title.
    pub book: String,
    /// Selected existing author ID (dropdown).
    pub author: String,
    /// Free-text new author name.
    pub add_author: String,
    /// Review text.
    pub description: String,
    /// Star rating.
    pub rating: String,
}

/// Field-level outcome of a [`NewReviewForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedNewReview {
    /// Trimmed title.
    pub title: String,
    /// Parsed rating, if valid.
    pub rating: Option<u8>,
    /// Parsed author selection, if valid.
    pub author: Option<AuthorSelection>,
    /// Messages collected so far.
    pub errors: Vec<String>,
}

impl NewReviewForm {
    /// Check the fields that need no lookups.
    ///
    /// Missing title or text stops here with a single message; otherwise
    /// length, rating and author-shape messages accumulate.
    pub fn check(&self) -> CheckedNewReview {
        let title = self.book.trim().to_string();

        if title.is_empty() || self.description.trim().is_empty() {
            return CheckedNewReview {
                title,
                rating: None,
                author: None,
                errors: vec![TITLE_AND_REVIEW_REQUIRED.to_string()],
            };
        }

        let mut errors = Vec::new();

        if char_len(&self.description) > MAX_DESCRIPTION_CHARS {
            errors.push(REVIEW_TOO_LONG.to_string());
        }

        if char_len(&title) > MAX_TITLE_CHARS {
            errors.push(TITLE_TOO_LONG.to_string());
        }

        let rating = parse_rating(&self.rating);
        if rating.is_none() {
            errors.push(RATING_OUT_OF_RANGE.to_string());
        }

        let author = match AuthorSelection::from_fields(&self.author, &self.add_author) {
            Ok(selection) => Some(selection),
            Err(message) => {
                errors.push(message.to_string());
                None
            }
        };

        CheckedNewReview {
            title,
            rating,
            author,
            errors,
        }
    }
}

/// Form for reviewing an existing book.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookReviewForm {
    /// Review text.
    pub description: String,
    /// Star rating.
    pub rating: String,
}

impl BookReviewForm {
    /// Collect every failing rule. Returns the rating when all pass.
    pub fn check(&self) -> std::result::Result<u8, Vec<String>> {
        let mut errors = Vec::new();

        if self.description.trim().is_empty() {
            errors.push(REVIEW_REQUIRED.to_string());
        }

        if char_len(&self.description) > MAX_DESCRIPTION_CHARS {
            errors.push(REVIEW_TOO_LONG.to_string());
        }

        let rating = parse_rating(&self.rating);
        if rating.is_none() {
            errors.push(RATING_OUT_OF_RANGE.to_string());
        }

        match rating {
            Some(rating) if errors.is_empty() => Ok(rating),
            _ => Err(errors),
        }
    }
}
