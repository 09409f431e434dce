//! Media store adapters for profile photo uploads.

mod http_media_store;

pub use http_media_store::{HttpMediaStore, MediaUploadSettings};
