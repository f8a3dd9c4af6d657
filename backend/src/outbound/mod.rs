//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process store used when no database is configured
//! - **mapbox**: forward geocoding over HTTP
//! - **cloudinary**: signed image upload and deletion over HTTP
//! - **password_hashing**: Argon2id credential hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cloudinary;
pub(crate) mod http_body;
pub mod mapbox;
pub mod memory;
pub mod password_hashing;
pub mod persistence;
