//! Authors and books.

use crate::db::{Author, Book, Database};
use crate::error::{AppError, Result};
use crate::validation::{AUTHOR_EXISTS, AUTHOR_REQUIRED, AuthorSelection, parse_author_name};

/// Catalog service: resolves and creates authors and books.
#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Check that a selection can be resolved without creating anything.
    pub fn check_author(&self, selection: &AuthorSelection) -> Result<Option<&'static str>> {
        let problem = match selection {
            AuthorSelection::Existing(id) => self
                .db
                .get_author(*id)?
                .is_none()
                .then_some(AUTHOR_REQUIRED),
            AuthorSelection::New {
                first_name,
                last_name,
            } => self
                .db
                .find_author(first_name, last_name)?
                .is_some()
                .then_some(AUTHOR_EXISTS),
        };
        Ok(problem)
    }

    /// Fetch the selected author or create the new one.
    ///
    /// A new author must not already exist; an existing one must.
    pub fn resolve_author(&self, selection: &AuthorSelection) -> Result<Author> {
        match selection {
            AuthorSelection::Existing(id) => self
                .db
                .get_author(*id)?
                .ok_or_else(|| AppError::invalid(AUTHOR_REQUIRED)),
            AuthorSelection::New {
                first_name,
                last_name,
            } => {
                if self.db.find_author(first_name, last_name)?.is_some() {
                    tracing::debug!(%first_name, %last_name, "Author already exists");
                    return Err(AppError::invalid(AUTHOR_EXISTS));
                }

                let author = self.db.create_author(first_name, last_name)?;
                tracing::info!(author_id = author.id, name = %author.full_name(), "Created author");
                Ok(author)
            }
        }
    }

    /// Return the author's book with this title, creating it if needed.
    pub fn resolve_book(&self, title: &str, author: &Author) -> Result<Book> {
        let (book, created) = self.db.find_or_create_book(title, author.id)?;
        if created {
            tracing::info!(book_id = book.id, author_id = author.id, title = %book.title, "Created book");
        } else {
            tracing::debug!(book_id = book.id, "Book already exists for author");
        }
        Ok(book)
    }

    /// All authors, by last then first name.
    pub fn list_authors(&self) -> Result<Vec<Author>> {
        self.db.list_authors()
    }

    /// Create the given "First Last" authors when the catalog is empty.
    ///
    /// Returns how many authors were created; zero once any author exists.
    pub fn seed_authors(&self, names: &[String]) -> Result<usize> {
        let existing = self.db.count_authors()?;
        if existing > 0 {
            tracing::debug!(existing, "Authors present, skipping seed");
            return Ok(0);
        }

        let mut created = 0;
        for name in names {
            let Some((first_name, last_name)) = parse_author_name(name) else {
                tracing::warn!(%name, "Skipping seed author without exactly a first and last name");
                continue;
            };

            if self.db.find_author(&first_name, &last_name)?.is_none() {
                self.resolve_author(&AuthorSelection::New {
                    first_name,
                    last_name,
                })?;
                created += 1;
            }
        }

        tracing::info!(created, "Seeded authors");
        Ok(created)
    }
}
