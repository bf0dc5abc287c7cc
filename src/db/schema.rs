use crate::db::*;
use crate::error::{AppError, Result};
use crate::validation::{AUTHOR_EXISTS, AUTHOR_REQUIRED, AuthorSelection, EMAIL_TAKEN};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Arc;

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, created_at, updated_at";
const AUTHOR_COLUMNS: &str = "id, first_name, last_name, created_at, updated_at";

/// Selects a review with the book, author and reviewer names pages show.
const REVIEW_DETAIL_SELECT: &str = "SELECT r.id, r.description, r.rating, r.user_id, r.book_id,
            r.created_at, r.updated_at, b.title, a.first_name || ' ' || a.last_name, u.first_name
     FROM reviews r
     JOIN books b ON b.id = r.book_id
     JOIN authors a ON a.id = b.author_id
     JOIN users u ON u.id = r.user_id";

/// Selects a book with its author's full name.
const BOOK_LISTING_SELECT: &str = "SELECT b.id, b.title, b.author_id, b.created_at, b.updated_at,
            a.first_name || ' ' || a.last_name
     FROM books b
     JOIN authors a ON a.id = b.author_id";

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Sessions table
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Authors table
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (first_name, last_name)
            );

            -- Books table
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (author_id, title),
                FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
            );

            -- Reviews table
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                user_id INTEGER NOT NULL,
                book_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
            CREATE INDEX IF NOT EXISTS idx_reviews_book ON reviews(book_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_created ON reviews(created_at);
            "#,
        )
        .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== USER OPERATIONS ==========

    /// Create a new user.
    pub fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let conn = self.conn.lock();
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO users (first_name, last_name, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![first_name, last_name, email, password_hash, now],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::invalid(EMAIL_TAKEN)
            } else {
                AppError::Internal(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(User {
            id: conn.last_insert_rowid(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get user by email (exact match).
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            Self::row_to_user,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// Get user by ID.
    pub fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            Self::row_to_user,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// Check whether an email is already registered.
    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Internal(format!("Failed to check email: {}", e)))
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY last_name, first_name"
            ))
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let users = stmt
            .query_map([], Self::row_to_user)
            .map_err(|e| AppError::Internal(format!("Failed to list users: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect users: {}", e)))?;

        Ok(users)
    }

    /// Delete user by email. Their reviews and sessions go with them.
    pub fn delete_user(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])
            .map_err(|e| AppError::Internal(format!("Failed to delete user: {}", e)))?;
        Ok(rows > 0)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    // ========== SESSION OPERATIONS ==========

    /// Create session.
    pub fn create_session(&self, session: &Session) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![session.token, session.user_id, session.expires_at],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create session: {}", e)))?;
        Ok(())
    }

    /// Get session by token.
    pub fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    expires_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get session: {}", e)))
    }

    /// Delete session.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .map_err(|e| AppError::Internal(format!("Failed to delete session: {}", e)))?;
        Ok(())
    }

    /// Cleanup expired sessions.
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                params![now_timestamp()],
            )
            .map_err(|e| AppError::Internal(format!("Failed to cleanup sessions: {}", e)))?;
        Ok(rows)
    }

    // ========== AUTHOR OPERATIONS ==========

    /// Create author.
    pub fn create_author(&self, first_name: &str, last_name: &str) -> Result<Author> {
        let conn = self.conn.lock();
        Self::insert_author(&conn, first_name, last_name)
    }

    fn insert_author(conn: &Connection, first_name: &str, last_name: &str) -> Result<Author> {
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO authors (first_name, last_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![first_name, last_name, now],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::invalid(AUTHOR_EXISTS)
            } else {
                AppError::Internal(format!("Failed to create author: {}", e))
            }
        })?;

        Ok(Author {
            id: conn.last_insert_rowid(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get author by ID.
    pub fn get_author(&self, id: i64) -> Result<Option<Author>> {
        let conn = self.conn.lock();
        Self::select_author(&conn, id)
    }

    fn select_author(conn: &Connection, id: i64) -> Result<Option<Author>> {
        conn.query_row(
            &format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?1"),
            params![id],
            Self::row_to_author,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get author: {}", e)))
    }

    /// Find author by exact first and last name.
    pub fn find_author(&self, first_name: &str, last_name: &str) -> Result<Option<Author>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!(
                "SELECT {AUTHOR_COLUMNS} FROM authors WHERE first_name = ?1 AND last_name = ?2"
            ),
            params![first_name, last_name],
            Self::row_to_author,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to find author: {}", e)))
    }

    /// List all authors.
    pub fn list_authors(&self) -> Result<Vec<Author>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY last_name, first_name"
            ))
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let authors = stmt
            .query_map([], Self::row_to_author)
            .map_err(|e| AppError::Internal(format!("Failed to list authors: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect authors: {}", e)))?;

        Ok(authors)
    }

    /// Count authors.
    pub fn count_authors(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .map_err(|e| AppError::Internal(format!("Failed to count authors: {}", e)))
    }

    fn row_to_author(row: &rusqlite::Row<'_>) -> rusqlite::Result<Author> {
        Ok(Author {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    // ========== BOOK OPERATIONS ==========

    /// Create book under an author.
    pub fn create_book(&self, title: &str, author_id: i64) -> Result<Book> {
        let conn = self.conn.lock();
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO books (title, author_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![title, author_id, now],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create book: {}", e)))?;

        Ok(Book {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            author_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Return the author's book with this title, inserting it if missing.
    ///
    /// The flag is true when this call created the book.
    pub fn find_or_create_book(&self, title: &str, author_id: i64) -> Result<(Book, bool)> {
        let conn = self.conn.lock();
        Self::upsert_book(&conn, title, author_id)
    }

    fn upsert_book(conn: &Connection, title: &str, author_id: i64) -> Result<(Book, bool)> {
        let inserted = conn
            .execute(
                "INSERT INTO books (title, author_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT (author_id, title) DO NOTHING",
                params![title, author_id, now_timestamp()],
            )
            .map_err(|e| AppError::Internal(format!("Failed to create book: {}", e)))?;

        let book = conn
            .query_row(
                "SELECT id, title, author_id, created_at, updated_at
                 FROM books WHERE title = ?1 AND author_id = ?2",
                params![title, author_id],
                Self::row_to_book,
            )
            .map_err(|e| AppError::Internal(format!("Failed to find book: {}", e)))?;

        Ok((book, inserted > 0))
    }

    /// Get book by ID.
    pub fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author_id, created_at, updated_at FROM books WHERE id = ?1",
            params![id],
            Self::row_to_book,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// Find an author's book by exact title.
    pub fn find_book(&self, title: &str, author_id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author_id, created_at, updated_at
             FROM books WHERE title = ?1 AND author_id = ?2",
            params![title, author_id],
            Self::row_to_book,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to find book: {}", e)))
    }

    /// Get book with its author's name.
    pub fn get_book_listing(&self, id: i64) -> Result<Option<BookListing>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{BOOK_LISTING_SELECT} WHERE b.id = ?1"),
            params![id],
            Self::row_to_book_listing,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// Distinct books that have at least one review.
    pub fn reviewed_books(&self) -> Result<Vec<BookListing>> {
        self.query_book_listings(
            &format!(
                "{BOOK_LISTING_SELECT}
                 WHERE EXISTS (SELECT 1 FROM reviews r WHERE r.book_id = b.id)
                 ORDER BY b.title"
            ),
            params![],
        )
    }

    /// Distinct books reviewed by a user.
    pub fn books_reviewed_by(&self, user_id: i64) -> Result<Vec<BookListing>> {
        self.query_book_listings(
            &format!(
                "{BOOK_LISTING_SELECT}
                 WHERE EXISTS (SELECT 1 FROM reviews r WHERE r.book_id = b.id AND r.user_id = ?1)
                 ORDER BY b.title"
            ),
            params![user_id],
        )
    }

    fn query_book_listings(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<BookListing>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let books = stmt
            .query_map(params, Self::row_to_book_listing)
            .map_err(|e| AppError::Internal(format!("Failed to list books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect books: {}", e)))?;

        Ok(books)
    }

    fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author_id: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn row_to_book_listing(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookListing> {
        Ok(BookListing {
            book: Self::row_to_book(row)?,
            author_name: row.get(5)?,
        })
    }

    // ========== REVIEW OPERATIONS ==========

    /// Create review.
    pub fn create_review(
        &self,
        description: &str,
        rating: u8,
        user_id: i64,
        book_id: i64,
    ) -> Result<Review> {
        let conn = self.conn.lock();
        Self::insert_review(&conn, description, rating, user_id, book_id)
    }

    fn insert_review(
        conn: &Connection,
        description: &str,
        rating: u8,
        user_id: i64,
        book_id: i64,
    ) -> Result<Review> {
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO reviews (description, rating, user_id, book_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![description, rating, user_id, book_id, now],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create review: {}", e)))?;

        Ok(Review {
            id: conn.last_insert_rowid(),
            description: description.to_string(),
            rating,
            user_id,
            book_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Write a review with its author and book in one transaction.
    ///
    /// A new author is inserted, an existing one must be present, and the
    /// book is found or created under that author. Nothing is kept if any
    /// step fails.
    pub fn record_review(
        &self,
        author: &AuthorSelection,
        title: &str,
        description: &str,
        rating: u8,
        user_id: i64,
    ) -> Result<RecordedReview> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Internal(format!("Failed to begin transaction: {}", e)))?;

        let (author, author_created) = match author {
            AuthorSelection::Existing(id) => {
                let author = Self::select_author(&tx, *id)?
                    .ok_or_else(|| AppError::invalid(AUTHOR_REQUIRED))?;
                (author, false)
            }
            AuthorSelection::New {
                first_name,
                last_name,
            } => (Self::insert_author(&tx, first_name, last_name)?, true),
        };
        let (book, book_created) = Self::upsert_book(&tx, title, author.id)?;
        let review = Self::insert_review(&tx, description, rating, user_id, book.id)?;

        tx.commit()
            .map_err(|e| AppError::Internal(format!("Failed to commit review: {}", e)))?;

        Ok(RecordedReview {
            author,
            author_created,
            book,
            book_created,
            review,
        })
    }

    /// Get review by ID.
    pub fn get_review(&self, id: i64) -> Result<Option<Review>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, description, rating, user_id, book_id, created_at, updated_at
             FROM reviews WHERE id = ?1",
            params![id],
            Self::row_to_review,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get review: {}", e)))
    }

    /// Delete review.
    pub fn delete_review(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM reviews WHERE id = ?1", params![id])
            .map_err(|e| AppError::Internal(format!("Failed to delete review: {}", e)))?;
        Ok(rows > 0)
    }

    /// Most recently created reviews, newest first.
    pub fn recent_reviews(&self, limit: usize) -> Result<Vec<ReviewDetail>> {
        self.query_review_details(
            &format!("{REVIEW_DETAIL_SELECT} ORDER BY r.created_at DESC, r.id DESC LIMIT ?1"),
            params![limit as i64],
        )
    }

    /// All reviews of a book, newest first.
    pub fn book_reviews(&self, book_id: i64) -> Result<Vec<ReviewDetail>> {
        self.query_review_details(
            &format!(
                "{REVIEW_DETAIL_SELECT} WHERE r.book_id = ?1 ORDER BY r.created_at DESC, r.id DESC"
            ),
            params![book_id],
        )
    }

    /// Number of reviews written by a user.
    pub fn count_user_reviews(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(|e| AppError::Internal(format!("Failed to count reviews: {}", e)))
    }

    fn query_review_details(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ReviewDetail>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let reviews = stmt
            .query_map(params, |row| {
                Ok(ReviewDetail {
                    review: Self::row_to_review(row)?,
                    book_title: row.get(7)?,
                    author_name: row.get(8)?,
                    reviewer_name: row.get(9)?,
                })
            })
            .map_err(|e| AppError::Internal(format!("Failed to list reviews: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect reviews: {}", e)))?;

        Ok(reviews)
    }

    fn row_to_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
        Ok(Review {
            id: row.get(0)?,
            description: row.get(1)?,
            rating: row.get(2)?,
            user_id: row.get(3)?,
            book_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}
