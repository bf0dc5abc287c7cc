//! book-reviewer: a small web site for reviewing books.
//!
//! Visitors register or log in, then review books by title and author.
//! Authors and books are created on first mention, and every review
//! carries a rating from 1 to 5 stars.
//!
//! # Features
//!
//! - Account registration with per-field validation
//! - Cookie sessions backed by SQLite
//! - Review submission for new or existing books
//! - Dashboard of recent reviews and reviewed books
//! - Author seeding from configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Authentication and user management.
pub mod auth;
/// Authors and books.
pub mod catalog;
/// Configuration and CLI.
pub mod config;
/// Page view models.
pub mod dashboard;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// Review submission.
pub mod reviews;
/// HTTP server.
pub mod server;
/// Form validation.
pub mod validation;

#[cfg(test)]
mod tests;

pub use config::{Cli, Command, Config};
pub use db::Database;
pub use error::{AppError, Result};
pub use server::AppState;
