//! HTTP inbound adapter serving the HTML pages and form mutations.

pub mod campgrounds;
pub mod error;
pub mod forms;
pub mod pages;
pub mod reviews;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod views;

pub use crate::domain::ApiResult;
