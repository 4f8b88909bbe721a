/// Username / password checks
///
/// Passwords are stored as entered, in `password` and in the legacy
/// `password_hash` column. A login matches if either column equals the
/// submitted password.

use uuid::Uuid;

use crate::models::user::User;

/// Built-in login accepted when no database is configured
pub const FALLBACK_USERNAME: &str = "admin";
pub const FALLBACK_PASSWORD: &str = "123";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("New password is required")]
    MissingNewPassword,

    #[error("New passwords do not match")]
    ConfirmationMismatch,
}

/// Whether `password` matches either stored column of `user`
pub fn password_matches(user: &User, password: &str) -> bool {
    [user.password.as_deref(), user.password_hash.as_deref()]
        .into_iter()
        .flatten()
        .any(|stored| stored == password)
}

/// Checks a login against a looked-up user, handing the user back on success
pub fn verify_login(user: Option<User>, password: &str) -> Result<User, CredentialError> {
    match user {
        Some(user) if password_matches(&user, password) => Ok(user),
        _ => Err(CredentialError::InvalidCredentials),
    }
}

/// Checks the built-in login used without a database
///
/// The principal gets the nil id.
pub fn verify_fallback_login(username: &str, password: &str) -> Result<Uuid, CredentialError> {
    if username == FALLBACK_USERNAME && password == FALLBACK_PASSWORD {
        Ok(Uuid::nil())
    } else {
        Err(CredentialError::InvalidCredentials)
    }
}

/// Validates a password change request
///
/// Returns the new password to store.
pub fn check_password_change<'a>(
    user: &User,
    current: Option<&str>,
    new: Option<&'a str>,
    confirm: Option<&str>,
) -> Result<&'a str, CredentialError> {
    let new = new
        .filter(|p| !p.is_empty())
        .ok_or(CredentialError::MissingNewPassword)?;

    if !current.is_some_and(|c| password_matches(user, c)) {
        return Err(CredentialError::WrongCurrentPassword);
    }

    if confirm.is_some_and(|c| c != new) {
        return Err(CredentialError::ConfirmationMismatch);
    }

    Ok(new)
}
