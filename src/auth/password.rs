//! Password validation and hashing.
//!
//! A raw password from a form must first become a [ValidatedPassword], which
//! checks its strength, before it can be hashed into a [PasswordHash] that is
//! stored in the database.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// The fewest characters a password may have.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// A password that is hard enough to guess, but not yet hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate a raw password string.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] if the password is shorter than
    /// [PASSWORD_MIN_LENGTH] characters or zxcvbn scores it below three. The
    /// error message suggests how to make the password stronger.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        if raw_password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(Error::TooWeak(format!(
                "La contraseña debe tener al menos {PASSWORD_MIN_LENGTH} caracteres."
            )));
        }

        let analysis = zxcvbn(raw_password, &[]);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => {
                let suggestions = analysis
                    .feedback()
                    .map(|feedback| feedback.to_string())
                    .unwrap_or_default();

                Err(Error::TooWeak(
                    format!("La contraseña es demasiado fácil de adivinar. {suggestions}")
                        .trim_end()
                        .to_owned(),
                ))
            }
        }
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Only for tooling and tests where a weak password is intended.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "********")
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used in production.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with the bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails, e.g. for an out of range cost.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash loaded from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Validate and hash `raw_password` in one step.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] for weak passwords or [Error::HashingError] if
    /// hashing fails.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        PasswordHash::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Check whether `raw_password` produced this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
