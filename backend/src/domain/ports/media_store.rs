//! Driven port for the remote media store that hosts profile photos.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// The upload request could not be delivered.
        Transport { message: String } => "media upload transport failed: {message}",
        /// The media service refused the upload.
        Rejected { status: u16, message: String } => "media upload rejected with status {status}: {message}",
        /// The media service answered with an unreadable body.
        Decode { message: String } => "media upload response could not be decoded: {message}",
    }
}

/// An image received from a client, ready to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Location of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub secure_url: String,
}

/// Port for uploading images to remote storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload_image(&self, upload: PhotoUpload) -> Result<UploadedMedia, MediaStoreError>;
}

/// Media store used when no upload endpoint is configured.
///
/// Returns a deterministic URL derived from the file name without contacting
/// any service.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMediaStore;

/// Base URL of fixture media locations.
pub const FIXTURE_MEDIA_BASE_URL: &str = "https://media.invalid/users";

#[async_trait]
impl MediaStore for FixtureMediaStore {
    async fn upload_image(&self, upload: PhotoUpload) -> Result<UploadedMedia, MediaStoreError> {
        Ok(UploadedMedia {
            secure_url: format!("{FIXTURE_MEDIA_BASE_URL}/{}", upload.file_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_store_derives_url_from_file_name() {
        let upload = PhotoUpload {
            file_name: "alice.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: vec![0x89, 0x50],
        };

        let media = FixtureMediaStore
            .upload_image(upload)
            .await
            .expect("fixture upload succeeds");

        assert_eq!(media.secure_url, "https://media.invalid/users/alice.png");
    }

    #[rstest]
    fn rejected_error_mentions_status() {
        let err = MediaStoreError::rejected(413_u16, "too large");
        assert_eq!(
            err.to_string(),
            "media upload rejected with status 413: too large"
        );
    }
}
