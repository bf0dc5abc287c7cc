//! HTTP request handlers.

use crate::db::User;
use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::server::pages::{
    AddReviewPage, BookView, DashboardPage, IndexPage, UserView, render,
};
use crate::server::session::{
    FLASH_COOKIE, Flash, FlashKind, SESSION_COOKIE, expired_cookie, session_cookie,
    session_token,
};
use crate::validation::{BookReviewForm, LoginForm, NewReviewForm, RegistrationForm};
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};

/// Shown after a successful logout.
const LOGGED_OUT: &str = "Successfully logged out.";

// ============================================================================
// HELPERS
// ============================================================================

/// Redirect, setting the given cookies.
fn redirect_with(location: &str, cookies: Vec<String>) -> Response {
    (
        AppendHeaders(cookies.into_iter().map(|c| (header::SET_COOKIE, c))),
        Redirect::to(location),
    )
        .into_response()
}

/// Rendered page that also consumes the request's flash, if it had one.
fn page_response(html: Html<String>, flash: &Option<Flash>) -> Response {
    let cookies = flash
        .as_ref()
        .map(|_| expired_cookie(FLASH_COOKIE))
        .into_iter();
    (
        AppendHeaders(cookies.map(|c| (header::SET_COOKIE, c))),
        html,
    )
        .into_response()
}

/// Send user-facing errors back to a form page; propagate anything else.
fn flash_or_fail(err: AppError, kind: FlashKind, location: &str) -> Result<Response> {
    match err.user_messages() {
        Some(messages) => Ok(redirect_with(
            location,
            vec![Flash::new(kind, messages).cookie()],
        )),
        None => Err(err),
    }
}

/// Open a session for a user and send them to the dashboard.
fn start_session(state: &AppState, user: &User) -> Result<Response> {
    let token = state.auth.start_session(user.id)?;
    Ok(redirect_with(
        "/books",
        vec![
            session_cookie(&token, state.auth.session_seconds()),
            expired_cookie(FLASH_COOKIE),
        ],
    ))
}

/// Parse a record id from the path. Anything else names no record.
fn record_id(raw: &str, kind: &str) -> Result<i64> {
    raw.parse().map_err(|_| AppError::NotFound(kind.to_string()))
}

/// Get the logged in user from the session cookie.
fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let token = session_token(headers).ok_or(AppError::Unauthorized)?;

    state
        .auth
        .validate_token(&token)?
        .ok_or(AppError::Unauthorized)
}

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Registration and login page.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let flash = Flash::from_headers(&headers);
    let page = IndexPage {
        title: state.title(),
        registration_errors: Flash::messages_for(&flash, FlashKind::Registration),
        login_errors: Flash::messages_for(&flash, FlashKind::Login),
        notices: Flash::messages_for(&flash, FlashKind::Logout),
    };

    Ok(page_response(render(&page)?, &flash))
}

/// Register and log in.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    match state.auth.register(&form) {
        Ok(user) => start_session(&state, &user),
        Err(err) => flash_or_fail(err, FlashKind::Registration, "/"),
    }
}

/// Log in.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.auth.authenticate(&form) {
        Ok(user) => start_session(&state, &user),
        Err(err) => flash_or_fail(err, FlashKind::Login, "/"),
    }
}

/// Log out.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let Some(token) = session_token(&headers) else {
        return Ok(Redirect::to("/").into_response());
    };

    state.auth.logout(&token)?;
    let flash = Flash::new(FlashKind::Logout, vec![LOGGED_OUT.to_string()]);

    Ok(redirect_with(
        "/",
        vec![expired_cookie(SESSION_COOKIE), flash.cookie()],
    ))
}

// ============================================================================
// BOOKS AND REVIEWS
// ============================================================================

/// Dashboard.
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let user = current_user(&state, &headers)?;
    let page = DashboardPage {
        title: state.title(),
        dashboard: state.dashboard.build_dashboard(user.id)?,
    };

    Ok(render(&page)?.into_response())
}

/// Form for reviewing a new book.
pub async fn add_review_form(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let user = current_user(&state, &headers)?;
    let flash = Flash::from_headers(&headers);
    let page = AddReviewPage {
        title: state.title(),
        authors: state.catalog.list_authors()?,
        errors: Flash::messages_for(&flash, FlashKind::Review),
        user,
    };

    Ok(page_response(render(&page)?, &flash))
}

/// Review a new or existing book.
pub async fn add_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<NewReviewForm>,
) -> Result<Response> {
    let user = current_user(&state, &headers)?;

    match state.reviews.submit_new_review(&form, user.id) {
        Ok(review) => Ok(Redirect::to(&format!("/books/{}", review.book_id)).into_response()),
        Err(err) => flash_or_fail(err, FlashKind::Review, "/books/add"),
    }
}

/// Book and its reviews.
pub async fn show_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let user = current_user(&state, &headers)?;
    let id = record_id(&id, "Book")?;
    let flash = Flash::from_headers(&headers);
    let page = BookView {
        title: state.title(),
        page: state.dashboard.book_page(id)?,
        errors: Flash::messages_for(&flash, FlashKind::Review),
        user,
    };

    Ok(page_response(render(&page)?, &flash))
}

/// Add a review to a book.
pub async fn review_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<BookReviewForm>,
) -> Result<Response> {
    let user = current_user(&state, &headers)?;
    let id = record_id(&id, "Book")?;
    let location = format!("/books/{}", id);

    match state
        .reviews
        .submit_review_for_existing_book(id, &form, user.id)
    {
        Ok(_) => Ok(Redirect::to(&location).into_response()),
        Err(err) => flash_or_fail(err, FlashKind::Review, &location),
    }
}

/// User profile.
pub async fn show_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let user = current_user(&state, &headers)?;
    let id = record_id(&id, "User")?;
    let page = UserView {
        title: state.title(),
        profile: state.dashboard.user_profile(id)?,
        user,
    };

    Ok(render(&page)?.into_response())
}

/// Delete one of the current user's reviews.
pub async fn delete_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let user = current_user(&state, &headers)?;
    let review = state.reviews.get_review(record_id(&id, "Review")?)?;

    if review.user_id != user.id {
        return Err(AppError::Forbidden(
            "You can only delete your own reviews.".to_string(),
        ));
    }

    state.reviews.delete_review(review.id)?;
    Ok(Redirect::to(&format!("/books/{}", review.book_id)).into_response())
}
