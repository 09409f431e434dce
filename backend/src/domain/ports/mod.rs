//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_verifier;
mod media_store;
mod user_record_store;
mod users_command;
mod users_query;

#[cfg(test)]
pub use access_token_verifier::MockAccessTokenVerifier;
pub use access_token_verifier::{AccessTokenVerifier, TokenVerificationError};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{
    FIXTURE_MEDIA_BASE_URL, FixtureMediaStore, MediaStore, MediaStoreError, PhotoUpload,
    UploadedMedia,
};
#[cfg(test)]
pub use user_record_store::MockUserRecordStore;
pub use user_record_store::{
    DeletionMark, RecordChanges, UserKey, UserRecordStore, UserStoreError,
};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::UsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
