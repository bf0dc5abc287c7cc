//! Authentication module.

use crate::db::{Database, Session, User, now_timestamp};
use crate::error::{AppError, Result};
use crate::validation::{LoginForm, RegistrationForm};
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Generic login failure, identical for unknown emails and wrong passwords.
pub const LOGIN_INVALID: &str = "Login invalid.";

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash.
///
/// Only a well-formed Argon2 hash with a salt and an output can say "wrong
/// password". Anything else stored for the account is reported as
/// [`AppError::CorruptAccount`].
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::CorruptAccount)?;
    if parsed_hash.salt.is_none() || parsed_hash.hash.is_none() {
        return Err(AppError::CorruptAccount);
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash cannot be verified");
            Err(AppError::CorruptAccount)
        }
    }
}

/// Generate a secure random token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Authentication service.
pub struct AuthService {
    db: Database,
    session_duration_days: u32,
    registration_enabled: bool,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(db: Database, session_duration_days: u32, registration_enabled: bool) -> Self {
        Self {
            db,
            session_duration_days,
            registration_enabled,
        }
    }

    /// Register a new user.
    pub fn register(&self, form: &RegistrationForm) -> Result<User> {
        if !self.registration_enabled {
            return Err(AppError::invalid("Registration is disabled."));
        }

        self.create_user(form)
    }

    /// Validate and create a user, regardless of the registration setting.
    pub fn create_user(&self, form: &RegistrationForm) -> Result<User> {
        let errors = form.check(|email| self.db.email_exists(email))?;
        if !errors.is_empty() {
            tracing::debug!(errors = ?errors, "Registration rejected");
            return Err(AppError::Validation(errors));
        }

        let password_hash = hash_password(&form.password)?;
        let user = self.db.create_user(
            &form.first_name,
            &form.last_name,
            &form.email,
            &password_hash,
        )?;

        tracing::info!(user_id = user.id, email = %user.email, "Registered user");
        Ok(user)
    }

    /// Check credentials and return the matching user.
    pub fn authenticate(&self, form: &LoginForm) -> Result<User> {
        let errors = form.check();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let Some(user) = self.db.get_user_by_email(&form.email)? else {
            tracing::warn!("Login attempt for unknown email");
            return Err(AppError::invalid(LOGIN_INVALID));
        };

        if !verify_password(&form.password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(AppError::invalid(LOGIN_INVALID));
        }

        Ok(user)
    }

    /// Open a session for a user and return its token.
    pub fn start_session(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        let session = Session {
            token: token.clone(),
            user_id,
            expires_at: now_timestamp() + self.session_seconds(),
        };

        self.db.create_session(&session)?;
        Ok(token)
    }

    /// Session lifetime in seconds.
    pub fn session_seconds(&self) -> i64 {
        self.session_duration_days as i64 * 24 * 60 * 60
    }

    /// Validate a session token and return the user.
    pub fn validate_token(&self, token: &str) -> Result<Option<User>> {
        let session = match self.db.get_session(token)? {
            Some(s) => s,
            None => return Ok(None),
        };

        // Check expiration
        if session.expires_at < now_timestamp() {
            self.db.delete_session(token)?;
            return Ok(None);
        }

        self.db.get_user_by_id(session.user_id)
    }

    /// Logout (delete session).
    pub fn logout(&self, token: &str) -> Result<()> {
        self.db.delete_session(token)
    }

    /// Delete a user by email.
    pub fn delete_user(&self, email: &str) -> Result<bool> {
        self.db.delete_user(email)
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.db.list_users()
    }
}
