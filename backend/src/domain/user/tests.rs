//! Tests for the domain user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn alice(created_at: DateTime<Utc>) -> User {
    User {
        id: UserId::new(VALID_ID).expect("fixture id"),
        name: UserName::new("alice").expect("fixture name"),
        email: Email::new("a@x.com").expect("fixture email"),
        fullname: None,
        photo: None,
        role: Role::Member,
        is_deleted: false,
        created_at,
        updated_at: created_at,
        deleted_at: None,
    }
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
#[case("3FA85F64-5717-4562-B3FC-2C963F66AFA6")]
#[case("3fa85f6457174562b3fc2c963f66afa6")]
fn user_id_normalises_uuid_spelling(#[case] raw: &str) {
    let id = UserId::new(raw).expect("valid id");
    assert_eq!(id.as_ref(), VALID_ID);
    assert_eq!(id, UserId::new(VALID_ID).expect("valid id"));
}

#[rstest]
fn user_id_from_uuid_keeps_canonical_text() {
    let uuid = Uuid::parse_str(VALID_ID).expect("uuid");
    let id = UserId::from_uuid(uuid);
    assert_eq!(id.as_ref(), VALID_ID);
    assert_eq!(id.as_uuid(), &uuid);
}

#[rstest]
#[case("", UserValidationError::EmptyName)]
#[case("   ", UserValidationError::EmptyName)]
#[case(" alice", UserValidationError::NameHasSurroundingWhitespace)]
#[case("alice\t", UserValidationError::NameHasSurroundingWhitespace)]
fn user_name_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserName::new(raw), Err(expected));
}

#[rstest]
fn user_name_rejects_overlong_values() {
    let raw = "a".repeat(USER_NAME_MAX + 1);
    assert_eq!(
        UserName::new(raw),
        Err(UserValidationError::NameTooLong {
            max: USER_NAME_MAX
        })
    );
}

#[rstest]
fn user_name_is_case_sensitive() {
    let lower = UserName::new("alice").expect("lower");
    let upper = UserName::new("Alice").expect("upper");
    assert_ne!(lower, upper);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("two@@x.com", UserValidationError::InvalidEmail)]
#[case("spaced out@x.com", UserValidationError::InvalidEmail)]
fn email_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw), Err(expected));
}

#[rstest]
#[case("SUPERUSER", Role::Superuser)]
#[case("ADMIN", Role::Admin)]
#[case("MEMBER", Role::Member)]
#[case("GUEST", Role::Guest)]
fn role_parses_wire_values(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn role_rejects_lowercase_values() {
    assert_eq!(
        "member".parse::<Role>(),
        Err(UserValidationError::UnknownRole {
            value: "member".to_owned()
        })
    );
}

#[rstest]
fn user_serialises_standard_field_set(alice: User) {
    let value = serde_json::to_value(&alice).expect("user serialises");
    let object = value.as_object().expect("object");

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "createdAt",
            "deletedAt",
            "email",
            "fullname",
            "id",
            "isDeleted",
            "name",
            "photo",
            "role",
            "updatedAt",
        ]
    );
    assert_eq!(object.get("role"), Some(&json!("MEMBER")));
    assert_eq!(object.get("deletedAt"), Some(&Value::Null));
}

#[rstest]
fn record_serialises_credential_fields(alice: User) {
    let record = UserRecord {
        user: alice,
        password_hash: Some("hash".to_owned()),
        refresh_token_hash: None,
    };

    let value = serde_json::to_value(&record).expect("record serialises");
    assert_eq!(value.get("passwordHash"), Some(&json!("hash")));
    assert_eq!(value.get("refreshTokenHash"), Some(&Value::Null));
    assert_eq!(value.get("name"), Some(&json!("alice")));
}

#[rstest]
fn projection_drops_credentials(alice: User) {
    let record = UserRecord {
        user: alice.clone(),
        password_hash: Some("hash".to_owned()),
        refresh_token_hash: Some("refresh".to_owned()),
    };
    assert_eq!(record.into_projection(), alice);
}

#[rstest]
fn user_deserialisation_validates_name(alice: User) {
    let mut value = serde_json::to_value(&alice).expect("user serialises");
    value["name"] = json!("  ");
    assert!(serde_json::from_value::<User>(value).is_err());
}

#[rstest]
fn changes_apply_only_supplied_fields(alice: User) {
    let mut user = alice.clone();
    let changes = UserChanges {
        fullname: Some("Alice A.".to_owned()),
        ..UserChanges::default()
    };

    changes.apply_to(&mut user);

    assert_eq!(user.fullname.as_deref(), Some("Alice A."));
    assert_eq!(user.email, alice.email);
    assert_eq!(user.role, alice.role);
    assert_eq!(user.photo, alice.photo);
    assert_eq!(user.name, alice.name);
}

#[rstest]
fn empty_changes_report_empty() {
    assert!(UserChanges::default().is_empty());
    let changes = UserChanges {
        role: Some(Role::Guest),
        ..UserChanges::default()
    };
    assert!(!changes.is_empty());
}
