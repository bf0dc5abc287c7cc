//! Page templates.

use crate::dashboard::{BookPage, Dashboard, UserProfile};
use crate::db::{Author, User};
use crate::error::Result;
use askama::Template;
use axum::response::Html;

/// Render a template into an HTML response body.
pub fn render(page: &impl Template) -> Result<Html<String>> {
    Ok(Html(page.render()?))
}

/// Registration and login page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    /// Site title.
    pub title: String,
    /// Registration form errors.
    pub registration_errors: Vec<String>,
    /// Login form errors.
    pub login_errors: Vec<String>,
    /// Informational messages.
    pub notices: Vec<String>,
}

/// Logged in landing page.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    /// Site title.
    pub title: String,
    /// Dashboard contents.
    pub dashboard: Dashboard,
}

/// Form for reviewing a new or existing book.
#[derive(Template)]
#[template(path = "add_review.html")]
pub struct AddReviewPage {
    /// Site title.
    pub title: String,
    /// Logged in user.
    pub user: User,
    /// Authors offered in the dropdown.
    pub authors: Vec<Author>,
    /// Errors from the last submission.
    pub errors: Vec<String>,
}

/// A book and its reviews.
#[derive(Template)]
#[template(path = "book.html")]
pub struct BookView {
    /// Site title.
    pub title: String,
    /// Logged in user.
    pub user: User,
    /// Book contents.
    pub page: BookPage,
    /// Errors from the last submission.
    pub errors: Vec<String>,
}

/// A user's profile.
#[derive(Template)]
#[template(path = "user.html")]
pub struct UserView {
    /// Site title.
    pub title: String,
    /// Logged in user.
    pub user: User,
    /// Profiled user.
    pub profile: UserProfile,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    /// Status code.
    pub code: u16,
    /// Status reason phrase.
    pub reason: &'a str,
    /// User-facing message.
    pub message: &'a str,
}
