//! DTOs for decoding Cloudinary upload and destroy responses.

use serde::Deserialize;

use crate::domain::Image;

#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    pub(super) public_id: String,
    pub(super) secure_url: String,
}

impl UploadResponseDto {
    pub(super) fn into_image(self) -> Result<Image, String> {
        if self.public_id.is_empty() || self.secure_url.is_empty() {
            return Err("upload response is missing public_id or secure_url".to_owned());
        }
        Ok(Image {
            url: self.secure_url,
            filename: self.public_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DestroyResponseDto {
    pub(super) result: String,
}

impl DestroyResponseDto {
    /// An asset that is already gone counts as destroyed.
    pub(super) fn is_destroyed(&self) -> bool {
        matches!(self.result.as_str(), "ok" | "not found")
    }
}
