use crate::auth::AuthService;
use crate::config::Config;
use crate::db::{Database, Session, User, now_timestamp};
use crate::error::AppError;
use crate::server::session::{FLASH_COOKIE, Flash, FlashKind};
use crate::server::{AppState, create_router};
use crate::validation::{
    AUTHOR_EXISTS, AUTHOR_REQUIRED, AuthorSelection, BookReviewForm, NewReviewForm,
    RegistrationForm,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

fn test_db() -> Database {
    Database::open_memory().unwrap()
}

fn test_state() -> AppState {
    AppState::new_with_db(Config::default(), test_db())
}

fn create_user(db: &Database, first: &str, email: &str) -> User {
    db.create_user(first, "Tester", email, "hash").unwrap()
}

fn new_review(book: &str, author: &str, add_author: &str, rating: &str) -> NewReviewForm {
    NewReviewForm {
        book: book.to_string(),
        author: author.to_string(),
        add_author: add_author.to_string(),
        description: format!("Thoughts on {}", book),
        rating: rating.to_string(),
    }
}

fn registration(first: &str, email: &str) -> RegistrationForm {
    RegistrationForm {
        first_name: first.to_string(),
        last_name: "Tester".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        confirm_password: "password123".to_string(),
    }
}

// ========== DATABASE ==========

#[test]
fn db_create_and_get_user() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");

    let by_email = db.get_user_by_email("alice@example.com").unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.full_name(), "Alice Tester");

    let by_id = db.get_user_by_id(user.id).unwrap().unwrap();
    assert_eq!(by_id.email, "alice@example.com");
    assert!(db.email_exists("alice@example.com").unwrap());
    assert!(!db.email_exists("bob@example.com").unwrap());
}

#[test]
fn db_on_disk_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("reviews.db");

    {
        let db = Database::open(&path).unwrap();
        db.create_author("Aldous", "Huxley").unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert!(db.find_author("Aldous", "Huxley").unwrap().is_some());
    assert_eq!(db.count_authors().unwrap(), 1);
}

#[test]
fn db_duplicate_email_fails() {
    let db = test_db();
    create_user(&db, "Alice", "alice@example.com");

    let err = db
        .create_user("Other", "Person", "alice@example.com", "hash")
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn db_delete_user_removes_reviews_and_sessions() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");
    let author = db.create_author("Ray", "Bradbury").unwrap();
    let book = db.create_book("Fahrenheit 451", author.id).unwrap();
    let review = db.create_review("Great", 5, user.id, book.id).unwrap();
    db.create_session(&Session {
        token: "tok".to_string(),
        user_id: user.id,
        expires_at: now_timestamp() + 3600,
    })
    .unwrap();

    assert!(db.delete_user("alice@example.com").unwrap());
    assert!(!db.delete_user("alice@example.com").unwrap());

    assert!(db.get_review(review.id).unwrap().is_none());
    assert!(db.get_session("tok").unwrap().is_none());
    assert!(db.get_book(book.id).unwrap().is_some());
}

#[test]
fn db_duplicate_author_fails() {
    let db = test_db();
    db.create_author("Ray", "Bradbury").unwrap();

    let err = db.create_author("Ray", "Bradbury").unwrap_err();
    assert_eq!(err.user_messages(), Some(vec![AUTHOR_EXISTS.to_string()]));
}

#[test]
fn db_same_title_under_different_authors() {
    let db = test_db();
    let king = db.create_author("Stephen", "King").unwrap();
    let huxley = db.create_author("Aldous", "Huxley").unwrap();

    let first = db.create_book("Collected Essays", king.id).unwrap();
    let second = db.create_book("Collected Essays", huxley.id).unwrap();
    assert_ne!(first.id, second.id);

    let found = db.find_book("Collected Essays", huxley.id).unwrap().unwrap();
    assert_eq!(found.id, second.id);
}

#[test]
fn db_rating_constraint() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");
    let author = db.create_author("Ray", "Bradbury").unwrap();
    let book = db.create_book("Fahrenheit 451", author.id).unwrap();

    assert!(db.create_review("Too good", 6, user.id, book.id).is_err());
    assert!(db.create_review("Too bad", 0, user.id, book.id).is_err());
    assert!(db.create_review("Fine", 3, user.id, book.id).is_ok());
}

#[test]
fn db_recent_reviews_newest_first() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");
    let author = db.create_author("Ray", "Bradbury").unwrap();
    let book = db.create_book("Fahrenheit 451", author.id).unwrap();

    let ids: Vec<i64> = (1..=4)
        .map(|n| {
            db.create_review(&format!("Review {}", n), 4, user.id, book.id)
                .unwrap()
                .id
        })
        .collect();

    let recent = db.recent_reviews(3).unwrap();
    let recent_ids: Vec<i64> = recent.iter().map(|r| r.review.id).collect();
    assert_eq!(recent_ids, vec![ids[3], ids[2], ids[1]]);
    assert_eq!(recent[0].book_title, "Fahrenheit 451");
    assert_eq!(recent[0].author_name, "Ray Bradbury");
    assert_eq!(recent[0].reviewer_name, "Alice");
}

#[test]
fn db_reviewed_books_are_distinct() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");
    let author = db.create_author("Ray", "Bradbury").unwrap();
    let reviewed = db.create_book("Fahrenheit 451", author.id).unwrap();
    db.create_book("The Martian Chronicles", author.id).unwrap();

    db.create_review("One", 4, user.id, reviewed.id).unwrap();
    db.create_review("Two", 5, user.id, reviewed.id).unwrap();

    let books = db.reviewed_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].book.id, reviewed.id);
    assert_eq!(db.books_reviewed_by(user.id).unwrap().len(), 1);
    assert_eq!(db.count_user_reviews(user.id).unwrap(), 2);
}

#[test]
fn db_expired_sessions_cleanup() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");

    db.create_session(&Session {
        token: "expired".to_string(),
        user_id: user.id,
        expires_at: now_timestamp() - 3600,
    })
    .unwrap();
    db.create_session(&Session {
        token: "valid".to_string(),
        user_id: user.id,
        expires_at: now_timestamp() + 3600,
    })
    .unwrap();

    assert_eq!(db.cleanup_expired_sessions().unwrap(), 1);
    assert!(db.get_session("expired").unwrap().is_none());
    assert!(db.get_session("valid").unwrap().is_some());
}

#[test]
fn db_find_or_create_book_reuses_existing() {
    let db = test_db();
    let author = db.create_author("Ray", "Bradbury").unwrap();

    let (first, created) = db.find_or_create_book("Fahrenheit 451", author.id).unwrap();
    assert!(created);
    let (again, created) = db.find_or_create_book("Fahrenheit 451", author.id).unwrap();
    assert!(!created);
    assert_eq!(again.id, first.id);
}

#[test]
fn db_record_review_rolls_back_on_failure() {
    let db = test_db();
    let herbert = AuthorSelection::New {
        first_name: "Frank".to_string(),
        last_name: "Herbert".to_string(),
    };

    // No such reviewer, so the review insert fails after author and book.
    assert!(db.record_review(&herbert, "Dune", "Spice", 5, 999).is_err());

    assert!(db.find_author("Frank", "Herbert").unwrap().is_none());
    assert_eq!(db.count_authors().unwrap(), 0);
    assert!(db.reviewed_books().unwrap().is_empty());

    let user = create_user(&db, "Alice", "alice@example.com");
    let recorded = db.record_review(&herbert, "Dune", "Spice", 5, user.id).unwrap();
    assert!(recorded.author_created);
    assert!(recorded.book_created);
    assert_eq!(recorded.review.book_id, recorded.book.id);
}

#[test]
fn db_record_review_with_existing_author() {
    let db = test_db();
    let user = create_user(&db, "Alice", "alice@example.com");
    let author = db.create_author("Ray", "Bradbury").unwrap();
    let existing = AuthorSelection::Existing(author.id);

    let first = db.record_review(&existing, "Fahrenheit 451", "One", 4, user.id).unwrap();
    let second = db.record_review(&existing, "Fahrenheit 451", "Two", 3, user.id).unwrap();
    assert!(!first.author_created);
    assert!(first.book_created);
    assert!(!second.book_created);
    assert_eq!(first.book.id, second.book.id);

    let missing = db
        .record_review(&AuthorSelection::Existing(author.id + 100), "Dune", "x", 4, user.id)
        .unwrap_err();
    assert_eq!(missing.user_messages(), Some(vec![AUTHOR_REQUIRED.to_string()]));
}

// ========== REVIEW WORKFLOW ==========

#[test]
fn review_creates_author_and_book() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");

    let review = state
        .reviews
        .submit_new_review(&new_review("Dune", "", "Frank Herbert", "5"), user.id)
        .unwrap();

    let author = state.db.find_author("Frank", "Herbert").unwrap().unwrap();
    let book = state.db.get_book(review.book_id).unwrap().unwrap();
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author_id, author.id);
    assert_eq!(review.rating, 5);
}

#[test]
fn review_attaches_to_existing_book() {
    let state = test_state();
    let alice = create_user(&state.db, "Alice", "alice@example.com");
    let bob = create_user(&state.db, "Bob", "bob@example.com");
    let author = state.db.create_author("Ray", "Bradbury").unwrap();
    let author_id = author.id.to_string();

    let first = state
        .reviews
        .submit_new_review(&new_review("Fahrenheit 451", &author_id, "", "4"), alice.id)
        .unwrap();
    let second = state
        .reviews
        .submit_new_review(&new_review(" Fahrenheit 451 ", &author_id, "", "2"), bob.id)
        .unwrap();

    assert_eq!(first.book_id, second.book_id);
    assert_eq!(state.db.book_reviews(first.book_id).unwrap().len(), 2);
}

#[test]
fn rejected_review_writes_nothing() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");

    let err = state
        .reviews
        .submit_new_review(&new_review("Dune", "", "Frank Herbert", "9"), user.id)
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(state.db.find_author("Frank", "Herbert").unwrap().is_none());
    assert_eq!(state.db.count_authors().unwrap(), 0);
}

#[test]
fn review_with_existing_new_author_is_rejected() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");
    state.db.create_author("Ray", "Bradbury").unwrap();

    let err = state
        .reviews
        .submit_new_review(&new_review("Dandelion Wine", "", "Ray Bradbury", "4"), user.id)
        .unwrap_err();

    assert_eq!(err.user_messages(), Some(vec![AUTHOR_EXISTS.to_string()]));
    assert!(state.db.reviewed_books().unwrap().is_empty());
}

#[test]
fn review_without_author_is_rejected() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");

    let err = state
        .reviews
        .submit_new_review(&new_review("Dune", "", "", "4"), user.id)
        .unwrap_err();

    assert_eq!(err.user_messages(), Some(vec![AUTHOR_REQUIRED.to_string()]));
}

#[test]
fn review_for_missing_book_is_not_found() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");
    let form = BookReviewForm {
        description: "Nice".to_string(),
        rating: "3".to_string(),
    };

    let err = state
        .reviews
        .submit_review_for_existing_book(404, &form, user.id)
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn delete_review_keeps_book_and_other_reviews() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");

    let first = state
        .reviews
        .submit_new_review(&new_review("Dune", "", "Frank Herbert", "5"), user.id)
        .unwrap();
    let form = BookReviewForm {
        description: "Second look".to_string(),
        rating: "3".to_string(),
    };
    let second = state
        .reviews
        .submit_review_for_existing_book(first.book_id, &form, user.id)
        .unwrap();

    let deleted = state.reviews.delete_review(first.id).unwrap();
    assert_eq!(deleted.book_id, first.book_id);

    assert!(state.db.get_book(first.book_id).unwrap().is_some());
    let remaining = state.db.book_reviews(first.book_id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].review.id, second.id);

    assert!(matches!(
        state.reviews.delete_review(first.id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn dashboard_shows_three_most_recent() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");

    for (title, author) in [
        ("Dune", "Frank Herbert"),
        ("Carrie", "Stephen King"),
        ("Island", "Aldous Huxley"),
        ("Fahrenheit 451", "Ray Bradbury"),
    ] {
        state
            .reviews
            .submit_new_review(&new_review(title, "", author, "4"), user.id)
            .unwrap();
    }

    let dashboard = state.dashboard.build_dashboard(user.id).unwrap();
    let titles: Vec<&str> = dashboard
        .recent_reviews
        .iter()
        .map(|r| r.detail.book_title.as_str())
        .collect();

    assert_eq!(titles, vec!["Fahrenheit 451", "Island", "Carrie"]);
    assert_eq!(dashboard.reviewed_books.len(), 4);
    assert_eq!(dashboard.current_user.id, user.id);
    assert_eq!(dashboard.recent_reviews[0].stars.filled.len(), 4);
    assert_eq!(dashboard.recent_reviews[0].stars.empty.len(), 1);
}

#[test]
fn user_profile_counts_reviews() {
    let state = test_state();
    let user = create_user(&state.db, "Alice", "alice@example.com");
    let review = state
        .reviews
        .submit_new_review(&new_review("Dune", "", "Frank Herbert", "5"), user.id)
        .unwrap();
    let again = BookReviewForm {
        description: "Still great".to_string(),
        rating: "5".to_string(),
    };
    state
        .reviews
        .submit_review_for_existing_book(review.book_id, &again, user.id)
        .unwrap();

    let profile = state.dashboard.user_profile(user.id).unwrap();
    assert_eq!(profile.total_reviews, 2);
    assert_eq!(profile.reviewed_books.len(), 1);

    assert!(matches!(
        state.dashboard.user_profile(999),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn seeding_runs_once() {
    let state = test_state();

    assert_eq!(state.seed().unwrap(), 3);
    assert_eq!(state.seed().unwrap(), 0);
    assert_eq!(state.db.count_authors().unwrap(), 3);
    assert!(state.db.find_author("Stephen", "King").unwrap().is_some());
}

#[test]
fn auth_register_then_validate_session() {
    let auth = AuthService::new(test_db(), 14, true);
    let user = auth.register(&registration("Alice", "alice@example.com")).unwrap();

    let token = auth.start_session(user.id).unwrap();
    let found = auth.validate_token(&token).unwrap().unwrap();
    assert_eq!(found.id, user.id);

    auth.logout(&token).unwrap();
    assert!(auth.validate_token(&token).unwrap().is_none());
}

// ========== HTTP ==========

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// `name=value` pair of a cookie set by the response.
fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(|pair| pair.to_string())
}

fn flash(response: &Response) -> Flash {
    let pair = set_cookie(response, FLASH_COOKIE).unwrap();
    let value = pair.trim_start_matches("flash=");
    Flash::decode(value).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn register(app: &Router, first: &str, email: &str) -> String {
    let body = format!(
        "first_name={}&last_name=Tester&email={}&password=password123&confirm_password=password123",
        first,
        urlencoding::encode(email)
    );
    let response = send(app, post_form("/", None, &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");
    set_cookie(&response, "session").unwrap()
}

#[tokio::test]
async fn http_index_renders() {
    let app = create_router(test_state());

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response, FLASH_COOKIE).is_none());

    let body = body_text(response).await;
    assert!(body.contains("Book Reviews"));
    assert!(body.contains("action=\"/login\""));
}

#[tokio::test]
async fn http_protected_route_redirects_to_login() {
    let app = create_router(test_state());

    for uri in ["/books", "/books/add", "/books/1", "/users/1", "/delete/1"] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/");

        let flash = flash(&response);
        assert_eq!(flash.kind, FlashKind::Login);
        assert_eq!(
            flash.messages,
            vec!["You must be logged in to view this page.".to_string()]
        );
    }
}

#[tokio::test]
async fn http_flash_is_shown_once() {
    let app = create_router(test_state());
    let response = send(&app, get("/books", Some("session=bogus"))).await;
    let cookie = set_cookie(&response, FLASH_COOKIE).unwrap();

    let response = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(
        set_cookie(&response, FLASH_COOKIE),
        Some(format!("{}=", FLASH_COOKIE))
    );
    let body = body_text(response).await;
    assert!(body.contains("You must be logged in to view this page."));
}

#[tokio::test]
async fn http_register_reaches_dashboard() {
    let app = create_router(test_state());
    let session = register(&app, "Alice", "alice@example.com").await;

    let response = send(&app, get("/books", Some(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Welcome, Alice!"));
    assert!(body.contains("No reviews yet."));
}

#[tokio::test]
async fn http_invalid_registration_flashes_errors() {
    let app = create_router(test_state());
    let body = "first_name=A&last_name=Tester&email=bad&password=short&confirm_password=short";

    let response = send(&app, post_form("/", None, body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookie(&response, "session").is_none());

    let flash = flash(&response);
    assert_eq!(flash.kind, FlashKind::Registration);
    assert_eq!(flash.messages.len(), 3);
}

#[tokio::test]
async fn http_login_and_logout() {
    let app = create_router(test_state());
    register(&app, "Alice", "alice@example.com").await;

    let wrong = "email=alice%40example.com&password=wrongpassword";
    let response = send(&app, post_form("/login", None, wrong)).await;
    assert_eq!(location(&response), "/");
    assert_eq!(flash(&response).messages, vec!["Login invalid.".to_string()]);

    let right = "email=alice%40example.com&password=password123";
    let response = send(&app, post_form("/login", None, right)).await;
    assert_eq!(location(&response), "/books");
    let session = set_cookie(&response, "session").unwrap();

    let response = send(&app, get("/logout", Some(&session))).await;
    assert_eq!(location(&response), "/");
    let flash = flash(&response);
    assert_eq!(flash.kind, FlashKind::Logout);
    assert_eq!(flash.messages, vec!["Successfully logged out.".to_string()]);

    let response = send(&app, get("/books", Some(&session))).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn http_add_review_and_show_book() {
    let app = create_router(test_state());
    let session = register(&app, "Alice", "alice@example.com").await;

    let body = "book=Dune&author=&add_author=Frank+Herbert&description=Spice&rating=5";
    let response = send(&app, post_form("/books/add", Some(&session), body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let book_uri = location(&response).to_string();
    assert!(book_uri.starts_with("/books/"));

    let response = send(&app, get(&book_uri, Some(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Dune"));
    assert!(body.contains("Frank Herbert"));
    assert!(body.contains("Spice"));
    assert!(body.contains("Delete this review"));
}

#[tokio::test]
async fn http_invalid_review_returns_to_form() {
    let app = create_router(test_state());
    let session = register(&app, "Alice", "alice@example.com").await;

    let body = "book=&author=&add_author=&description=&rating=5";
    let response = send(&app, post_form("/books/add", Some(&session), body)).await;
    assert_eq!(location(&response), "/books/add");

    let flash = flash(&response);
    assert_eq!(flash.kind, FlashKind::Review);
    assert_eq!(flash.messages.len(), 1);
}

#[tokio::test]
async fn http_missing_book_is_404() {
    let app = create_router(test_state());
    let session = register(&app, "Alice", "alice@example.com").await;

    let response = send(&app, get("/books/999", Some(&session))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Book not found"));
}

#[tokio::test]
async fn http_cannot_delete_someone_elses_review() {
    let state = test_state();
    let app = create_router(state.clone());
    let alice = register(&app, "Alice", "alice@example.com").await;
    let bob = register(&app, "Bob", "bob@example.com").await;

    let body = "book=Dune&author=&add_author=Frank+Herbert&description=Spice&rating=5";
    send(&app, post_form("/books/add", Some(&alice), body)).await;
    let review = state.db.recent_reviews(1).unwrap().remove(0).review;

    let response = send(&app, get(&format!("/delete/{}", review.id), Some(&bob))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(state.db.get_review(review.id).unwrap().is_some());

    let response = send(&app, get(&format!("/delete/{}", review.id), Some(&alice))).await;
    assert_eq!(location(&response), format!("/books/{}", review.book_id));
    assert!(state.db.get_review(review.id).unwrap().is_none());
}

#[tokio::test]
async fn http_non_numeric_ids_are_404() {
    let app = create_router(test_state());
    let session = register(&app, "Alice", "alice@example.com").await;

    for uri in ["/books/abc", "/users/abc", "/delete/abc"] {
        let response = send(&app, get(uri, Some(&session))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }

    let body = "description=Nice&rating=4";
    let response = send(&app, post_form("/books/abc", Some(&session), body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_text(response).await;
    assert!(body.contains("Book not found"));
}
