//! Port for one-way password hashing.
use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing or checking a password.
    pub enum PasswordHashError {
        /// Hash parameters were rejected.
        Parameters { message: String } => "password hash parameters rejected: {message}",
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// Stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Synchronous, CPU-bound hashing; callers move it off the async executor.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Whether `password` matches `hash`.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
