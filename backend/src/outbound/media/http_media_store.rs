//! Reqwest-backed media store adapter.
//!
//! Sends each photo as a `multipart/form-data` POST to the configured upload
//! endpoint and reads `secure_url` from the JSON answer. Transport details and
//! status mapping live here; the handler decides what a failure means for
//! the client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{MediaStore, MediaStoreError, PhotoUpload, UploadedMedia};

const API_KEY_FIELD: &str = "api_key";
const UPLOAD_PRESET_FIELD: &str = "upload_preset";
const FILE_FIELD: &str = "file";

/// Optional form fields sent with every upload.
#[derive(Debug, Clone, Default)]
pub struct MediaUploadSettings {
    pub upload_preset: Option<String>,
    pub api_key: Option<String>,
}

/// Media store adapter posting uploads to one endpoint.
pub struct HttpMediaStore {
    client: Client,
    endpoint: Url,
    settings: MediaUploadSettings,
}

impl HttpMediaStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        settings: MediaUploadSettings,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    fn form(&self, upload: PhotoUpload) -> Result<Form, MediaStoreError> {
        let PhotoUpload {
            file_name,
            content_type,
            bytes,
        } = upload;
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|err| MediaStoreError::transport(format!("invalid content type: {err}")))?;

        let mut form = Form::new().part(FILE_FIELD, part);
        if let Some(preset) = &self.settings.upload_preset {
            form = form.text(UPLOAD_PRESET_FIELD, preset.clone());
        }
        if let Some(api_key) = &self.settings.api_key {
            form = form.text(API_KEY_FIELD, api_key.clone());
        }
        Ok(form)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponseDto {
    secure_url: String,
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload_image(&self, upload: PhotoUpload) -> Result<UploadedMedia, MediaStoreError> {
        let size = upload.bytes.len();
        let form = self.form(upload)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|err| MediaStoreError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| MediaStoreError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let uploaded = parse_upload_response(body.as_ref())?;
        debug!(size, url = %uploaded.secure_url, "photo uploaded");
        Ok(uploaded)
    }
}

fn parse_upload_response(body: &[u8]) -> Result<UploadedMedia, MediaStoreError> {
    let decoded: UploadResponseDto = serde_json::from_slice(body)
        .map_err(|err| MediaStoreError::decode(format!("invalid upload response: {err}")))?;
    if decoded.secure_url.trim().is_empty() {
        return Err(MediaStoreError::decode("upload response has an empty secure_url"));
    }
    Ok(UploadedMedia {
        secure_url: decoded.secure_url,
    })
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MediaStoreError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let preview: String = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    MediaStoreError::rejected(status.as_u16(), preview)
}
