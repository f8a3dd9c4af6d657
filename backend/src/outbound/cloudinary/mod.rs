//! Cloudinary outbound adapters.
//!
//! A thin HTTP implementation of the `ImageHost` port using signed uploads.

mod dto;
mod http_image_host;
mod signature;

pub use http_image_host::{CloudinaryCredentials, CloudinaryImageHost, DEFAULT_CLOUDINARY_ENDPOINT};
