//! Middleware wrapped around every route: request tracing and the
//! `_method` override that lets HTML forms send `PUT` and `DELETE`.

pub mod method_override;
pub mod trace;

pub use method_override::MethodOverride;
pub use trace::Trace;
