//! Authenticated caller identity and role checks.

use super::{Error, Role};

/// The verified caller behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    role: Role,
}

impl Principal {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// Token subject, usually the caller's user id.
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Require the caller's role to be in `allowed`.
    ///
    /// # Examples
    /// ```
    /// use user_directory::domain::{Principal, Role};
    ///
    /// let member = Principal::new("alice", Role::Member);
    /// assert!(member.require_any_role(&[Role::Superuser, Role::Member]).is_ok());
    /// assert!(member.require_any_role(&[Role::Superuser]).is_err());
    /// ```
    pub fn require_any_role(&self, allowed: &[Role]) -> Result<(), Error> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::forbidden("insufficient role for this operation"))
        }
    }
}
