//! Request parsing for `PATCH /api/protected/users/{name}`.
//!
//! The body is either JSON (`{ name?, fullname?, role?, photo? }`) or
//! `multipart/form-data` with the same text fields plus an optional `photo`
//! file part. Parsing yields the validated [`UserChanges`] and, when a file
//! was sent, the [`PhotoUpload`] that still has to go to the media store.

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{CONTENT_TYPE, HeaderMap};
use actix_web::web;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::PhotoUpload;
use crate::domain::{Error, UserChanges};
use crate::inbound::http::validation::{
    FieldName, file_too_large_error, invalid_value_error, parse_role, parse_user_name,
    unsupported_media_type_error,
};

const NAME: FieldName = FieldName::new("name");
const FULLNAME: FieldName = FieldName::new("fullname");
const ROLE: FieldName = FieldName::new("role");
const PHOTO: FieldName = FieldName::new("photo");

/// Upper bound on a JSON update body.
pub const JSON_BODY_LIMIT: usize = 64 * 1024;
/// Upper bound on a single multipart text field.
pub const TEXT_FIELD_LIMIT: usize = 4 * 1024;

/// JSON body for a profile update. Every field is optional.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New unique name.
    pub name: Option<String>,
    /// New display name.
    pub fullname: Option<String>,
    /// New role, one of `SUPERUSER`, `ADMIN`, `MEMBER`, `GUEST`.
    pub role: Option<String>,
    /// Photo URL. Ignored when a `photo` file part is uploaded.
    pub photo: Option<String>,
}

/// Validated update request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedUpdate {
    pub changes: UserChanges,
    pub photo_upload: Option<PhotoUpload>,
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

fn body_error(error: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("request body could not be read: {error}"))
}

/// Read and validate an update body of either supported shape.
pub async fn read_update_request(
    headers: &HeaderMap,
    payload: web::Payload,
    max_upload_bytes: usize,
) -> Result<ParsedUpdate, Error> {
    if is_multipart(headers) {
        let multipart = Multipart::new(headers, payload);
        read_multipart(multipart, max_upload_bytes).await
    } else {
        let request = read_json(payload).await?;
        parse_update_request(request, None)
    }
}

async fn read_json(mut payload: web::Payload) -> Result<UpdateUserRequest, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(body_error)?;
        if body.len() + chunk.len() > JSON_BODY_LIMIT {
            return Err(Error::invalid_request(format!(
                "request body must be at most {JSON_BODY_LIMIT} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpdateUserRequest::default());
    }
    serde_json::from_slice(&body)
        .map_err(|error| Error::invalid_request(format!("invalid JSON body: {error}")))
}

async fn read_field(
    field: &mut Field,
    limit: usize,
    too_large: impl Fn() -> Error,
) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(body_error)?;
        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field, name: FieldName) -> Result<String, Error> {
    let bytes = read_field(field, TEXT_FIELD_LIMIT, || {
        file_too_large_error(name, TEXT_FIELD_LIMIT)
    })
    .await?;
    String::from_utf8(bytes)
        .map_err(|_| invalid_value_error(name, "", "value must be valid UTF-8"))
}

async fn read_photo(
    field: &mut Field,
    file_name: String,
    limit: usize,
) -> Result<PhotoUpload, Error> {
    let content_type = field
        .content_type()
        .map(ToString::to_string)
        .unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(unsupported_media_type_error(PHOTO, &content_type));
    }
    let bytes = read_field(field, limit, || file_too_large_error(PHOTO, limit)).await?;
    Ok(PhotoUpload {
        file_name,
        content_type,
        bytes,
    })
}

async fn read_multipart(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<ParsedUpdate, Error> {
    let mut request = UpdateUserRequest::default();
    let mut photo_upload = None;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(body_error)?;
        let part_name = field.name().unwrap_or_default().to_owned();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        match (part_name.as_str(), file_name) {
            ("photo", Some(file_name)) => {
                photo_upload = Some(read_photo(&mut field, file_name, max_upload_bytes).await?);
            }
            ("photo", None) => request.photo = Some(read_text(&mut field, PHOTO).await?),
            ("name", _) => request.name = Some(read_text(&mut field, NAME).await?),
            ("fullname", _) => request.fullname = Some(read_text(&mut field, FULLNAME).await?),
            ("role", _) => request.role = Some(read_text(&mut field, ROLE).await?),
            (other, _) => {
                debug!(part = other, "skipping unknown multipart part");
                while let Some(chunk) = field.next().await {
                    chunk.map_err(body_error)?;
                }
            }
        }
    }

    parse_update_request(request, photo_upload)
}

/// Validate the text fields of an update.
///
/// A present `photo_upload` wins over any textual `photo`; the caller
/// replaces `changes.photo` with the uploaded URL.
pub fn parse_update_request(
    request: UpdateUserRequest,
    photo_upload: Option<PhotoUpload>,
) -> Result<ParsedUpdate, Error> {
    let UpdateUserRequest {
        name,
        fullname,
        role,
        photo,
    } = request;

    let changes = UserChanges {
        name: name.map(|value| parse_user_name(value, NAME)).transpose()?,
        fullname,
        role: role.map(|value| parse_role(&value, ROLE)).transpose()?,
        photo: if photo_upload.is_some() { None } else { photo },
    };
    Ok(ParsedUpdate {
        changes,
        photo_upload,
    })
}
