//! Reqwest-backed Cloudinary image host.
//!
//! Uploads go to `{endpoint}/{cloud}/image/upload` as signed multipart
//! requests restricted to the allowed formats and filed under the shared
//! folder. Deletion uses the signed `destroy` call keyed by public id.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{DestroyResponseDto, UploadResponseDto};
use super::signature::sign;
use crate::domain::Image;
use crate::domain::ports::{ALLOWED_IMAGE_FORMATS, IMAGE_FOLDER, ImageHost, ImageHostError, ImageUpload};
use crate::outbound::http_body::body_preview;

/// Public Cloudinary API base.
pub const DEFAULT_CLOUDINARY_ENDPOINT: &str = "https://api.cloudinary.com/v1_1/";

/// Account credentials for signed calls.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Image host storing listing photos on Cloudinary.
pub struct CloudinaryImageHost {
    client: Client,
    endpoint: Url,
    credentials: CloudinaryCredentials,
}

impl CloudinaryImageHost {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        credentials: CloudinaryCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    fn action_url(&self, action: &str) -> Result<Url, ImageHostError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ImageHostError::transport("image host endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend([self.credentials.cloud_name.as_str(), "image", action]);
        Ok(url)
    }

    /// Signed parameter set for a call made at `timestamp`.
    fn signed_params(
        &self,
        mut params: BTreeMap<&'static str, String>,
        timestamp: i64,
    ) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", timestamp.to_string());
        let signature = sign(&params, &self.credentials.api_secret);
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_owned());
        params.insert("api_key", self.credentials.api_key.clone());
        params
    }

    fn upload_params(&self, timestamp: i64) -> BTreeMap<&'static str, String> {
        let params = BTreeMap::from([
            ("allowed_formats", ALLOWED_IMAGE_FORMATS.join(",")),
            ("folder", IMAGE_FOLDER.to_owned()),
        ]);
        self.signed_params(params, timestamp)
    }

    fn destroy_params(&self, filename: &str, timestamp: i64) -> BTreeMap<&'static str, String> {
        let params = BTreeMap::from([("public_id", filename.to_owned())]);
        self.signed_params(params, timestamp)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, upload: &ImageUpload) -> Result<Image, ImageHostError> {
        if !upload.is_allowed() {
            return Err(ImageHostError::unsupported_format(upload.file_name.clone()));
        }
        let mut file = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        if let Some(content_type) = &upload.content_type {
            file = file
                .mime_str(content_type)
                .map_err(|err| ImageHostError::transport(err.to_string()))?;
        }
        let form = self
            .upload_params(now())
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part("file", file);

        let response = self
            .client
            .post(self.action_url("upload")?)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let image = parse_upload(body.as_ref())?;
        debug!(filename = %image.filename, "image uploaded");
        Ok(image)
    }

    async fn destroy(&self, filename: &str) -> Result<(), ImageHostError> {
        let response = self
            .client
            .post(self.action_url("destroy")?)
            .form(&self.destroy_params(filename, now()))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_destroy(body.as_ref())?;
        debug!(filename, "image destroyed");
        Ok(())
    }
}

fn parse_upload(body: &[u8]) -> Result<Image, ImageHostError> {
    let decoded: UploadResponseDto = serde_json::from_slice(body).map_err(|error| {
        ImageHostError::decode(format!("invalid upload response payload: {error}"))
    })?;
    decoded.into_image().map_err(ImageHostError::decode)
}

fn parse_destroy(body: &[u8]) -> Result<(), ImageHostError> {
    let decoded: DestroyResponseDto = serde_json::from_slice(body).map_err(|error| {
        ImageHostError::decode(format!("invalid destroy response payload: {error}"))
    })?;
    if decoded.is_destroyed() {
        Ok(())
    } else {
        Err(ImageHostError::decode(format!(
            "destroy reported {}",
            decoded.result
        )))
    }
}

fn map_transport_error(error: reqwest::Error) -> ImageHostError {
    ImageHostError::transport(error.without_url().to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageHostError {
    ImageHostError::status(status.as_u16(), body_preview(body))
}
