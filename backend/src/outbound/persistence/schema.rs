//! Diesel table definitions generated from the migrations.

diesel::table! {
    /// Canonical user records.
    ///
    /// `name` and `email` carry unique constraints (`users_name_key`,
    /// `users_email_key`); `is_deleted` and `deleted_at` are kept consistent
    /// by a check constraint.
    users (id) {
        id -> Uuid,
        #[max_length = 64]
        name -> Varchar,
        #[max_length = 254]
        email -> Varchar,
        fullname -> Nullable<Varchar>,
        photo -> Nullable<Varchar>,
        #[max_length = 16]
        role -> Varchar,
        password_hash -> Nullable<Varchar>,
        refresh_token_hash -> Nullable<Varchar>,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        /// Maintained by the `users_touch_updated_at` trigger.
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}
