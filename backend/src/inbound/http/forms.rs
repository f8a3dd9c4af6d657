//! Reading HTML form submissions into a [`FormPayload`].
//!
//! Listing forms arrive as `multipart/form-data` because they carry image
//! files; everything else is `application/x-www-form-urlencoded`. Both land in
//! the same shape so the validation gate does not care which one was used.
//! Uploads stay in memory here; nothing leaves the process until the listing
//! service has validated and geocoded the submission.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpMessage, HttpRequest, web};
use futures_util::TryStreamExt;

use crate::domain::ports::ImageUpload;
use crate::domain::{Error, FormPayload};

/// File input name on the listing forms.
pub const IMAGE_FIELD: &str = "image";
/// Upper bound on the total size of one submission.
pub const MAX_SUBMISSION_BYTES: usize = 20 * 1024 * 1024;
const MAX_URLENCODED_BYTES: usize = 256 * 1024;

/// Text fields plus any uploaded image files.
#[derive(Debug, Default)]
pub struct FormSubmission {
    pub payload: FormPayload,
    pub uploads: Vec<ImageUpload>,
}

fn too_large() -> Error {
    Error::invalid_request("submission is too large")
}

/// Read the request body as a form submission.
pub async fn read_submission(
    req: &HttpRequest,
    body: web::Payload,
) -> Result<FormSubmission, Error> {
    match req.content_type() {
        "multipart/form-data" => read_multipart(Multipart::new(req.headers(), body)).await,
        "application/x-www-form-urlencoded" | "" => read_urlencoded(body).await,
        other => Err(Error::invalid_request(format!(
            "unsupported form content type: {other}"
        ))),
    }
}

async fn read_urlencoded(mut body: web::Payload) -> Result<FormSubmission, Error> {
    let mut bytes = web::BytesMut::new();
    while let Some(chunk) = body
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("failed to read form: {err}")))?
    {
        if bytes.len() + chunk.len() > MAX_URLENCODED_BYTES {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(FormSubmission {
        payload: parse_urlencoded(&bytes),
        uploads: Vec::new(),
    })
}

/// Decode `a=1&b=2` pairs, keeping repeated names in order.
pub fn parse_urlencoded(body: &[u8]) -> FormPayload {
    let mut payload = FormPayload::new();
    for (name, value) in url::form_urlencoded::parse(body) {
        payload.push(name.into_owned(), value.into_owned());
    }
    payload
}

async fn read_field(field: &mut Field, budget: &mut usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("failed to read form field: {err}")))?
    {
        *budget = budget.checked_sub(chunk.len()).ok_or_else(too_large)?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormSubmission, Error> {
    let mut submission = FormSubmission::default();
    let mut budget = MAX_SUBMISSION_BYTES;
    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("malformed multipart form: {err}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);
        let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());
        let bytes = read_field(&mut field, &mut budget).await?;

        match file_name {
            Some(file_name) if name == IMAGE_FIELD => {
                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                submission.uploads.push(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {
                let value = String::from_utf8(bytes).map_err(|_| {
                    Error::invalid_request(format!("\"{name}\" is not valid UTF-8"))
                })?;
                submission.payload.push(name, value);
            }
        }
    }
    Ok(submission)
}
