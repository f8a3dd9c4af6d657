//! Port for the remote image host that stores listing photos.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Image;

use super::define_port_error;

/// Upload formats accepted by the image host.
pub const ALLOWED_IMAGE_FORMATS: [&str; 3] = ["jpeg", "png", "jpg"];

/// Folder every upload is filed under.
pub const IMAGE_FOLDER: &str = "YelpCamp";

define_port_error! {
    /// Errors raised by image host adapters.
    pub enum ImageHostError {
        /// The file's format is not on the allow-list.
        UnsupportedFormat { file_name: String } => "{file_name} is not a jpeg, png or jpg image",
        /// Request could not be sent or timed out.
        Transport { message: String } => "image host transport failed: {message}",
        /// Host answered with a non-success status.
        Status { status: u16, message: String } => "image host returned status {status}: {message}",
        /// Response body did not match the expected shape.
        Decode { message: String } => "image host response could not be decoded: {message}",
    }
}

/// One uploaded file held in memory until validation and ownership checks
/// have passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased format taken from the file extension, falling back to the
    /// `image/*` content type.
    pub fn format(&self) -> Option<String> {
        let from_extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty());
        from_extension.or_else(|| {
            self.content_type
                .as_deref()
                .and_then(|mime| mime.strip_prefix("image/"))
                .map(str::to_ascii_lowercase)
        })
    }

    /// Whether the file may be sent to the host.
    pub fn is_allowed(&self) -> bool {
        self.format()
            .is_some_and(|format| ALLOWED_IMAGE_FORMATS.contains(&format.as_str()))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store the file and return its public URL and remote identifier.
    async fn upload(&self, upload: &ImageUpload) -> Result<Image, ImageHostError>;

    /// Delete the asset identified by `filename`.
    async fn destroy(&self, filename: &str) -> Result<(), ImageHostError>;
}

/// Image host used when no provider credentials are configured.
///
/// Hands out Cloudinary-shaped URLs without storing the bytes anywhere.
#[derive(Debug, Clone, Default)]
pub struct FixtureImageHost;

#[async_trait]
impl ImageHost for FixtureImageHost {
    async fn upload(&self, upload: &ImageUpload) -> Result<Image, ImageHostError> {
        let Some(format) = upload.format().filter(|_| upload.is_allowed()) else {
            return Err(ImageHostError::unsupported_format(upload.file_name.clone()));
        };
        let filename = format!("{IMAGE_FOLDER}/{}", Uuid::new_v4().simple());
        Ok(Image {
            url: format!("https://res.cloudinary.com/fixture/image/upload/{filename}.{format}"),
            filename,
        })
    }

    async fn destroy(&self, _filename: &str) -> Result<(), ImageHostError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn upload(file_name: &str, content_type: Option<&str>) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_owned(),
            content_type: content_type.map(str::to_owned),
            bytes: vec![0xFF, 0xD8],
        }
    }

    #[rstest]
    #[case("tent.JPG", None, true)]
    #[case("tent.png", Some("image/png"), true)]
    #[case("tent", Some("image/jpeg"), true)]
    #[case("tent.gif", Some("image/gif"), false)]
    #[case("tent", None, false)]
    fn allow_list_checks_extension_then_mime(
        #[case] file_name: &str,
        #[case] content_type: Option<&str>,
        #[case] allowed: bool,
    ) {
        assert_eq!(upload(file_name, content_type).is_allowed(), allowed);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_host_files_uploads_under_folder() {
        let image = FixtureImageHost
            .upload(&upload("tent.png", None))
            .await
            .expect("allowed upload");
        assert!(image.filename.starts_with("YelpCamp/"));
        assert!(image.url.contains("/upload/YelpCamp/"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_host_rejects_disallowed_formats() {
        let err = FixtureImageHost
            .upload(&upload("tent.gif", None))
            .await
            .expect_err("gif is not allowed");
        assert_eq!(err, ImageHostError::unsupported_format("tent.gif"));
    }
}
