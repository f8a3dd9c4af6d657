//! Campground listings: accounts, listings with photos and maps, reviews.
//!
//! The crate is laid out hexagonally: [`domain`] holds the entities, rules
//! and ports; [`inbound`] turns HTTP requests into port calls; [`outbound`]
//! implements the driven ports (PostgreSQL, Mapbox, Cloudinary, Argon2);
//! [`server`] wires them together.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
