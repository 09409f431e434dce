//! Listing filters and pagination for the user directory.
//!
//! A [`UserFilter`] is built once per listing and applied identically to the
//! page query and the count query, so the reported total always describes the
//! same record set as the returned page.

use std::fmt;

use super::{Role, User};

/// Default page number when the caller supplies none.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Which side of the soft-delete boundary a listing covers.
///
/// Deleted and active records are never mixed in one listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletedScope {
    #[default]
    Active,
    Deleted,
}

impl DeletedScope {
    /// Interpret the `onlyDeleted` flag: only the exact string `"true"`
    /// selects soft-deleted records.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("true") => Self::Deleted,
            _ => Self::Active,
        }
    }

    /// Value of `is_deleted` that records in this scope carry.
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Predicates applied to a user listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    name_contains: Option<String>,
    fullname_contains: Option<String>,
    role: Option<Role>,
    scope: DeletedScope,
}

impl UserFilter {
    /// Filter covering every record in `scope`.
    pub fn new(scope: DeletedScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Case-insensitive substring match on `name`.
    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    /// Case-insensitive substring match on `fullname`.
    pub fn with_fullname_contains(mut self, needle: impl Into<String>) -> Self {
        self.fullname_contains = Some(needle.into());
        self
    }

    /// Exact match on `role`.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn name_contains(&self) -> Option<&str> {
        self.name_contains.as_deref()
    }

    pub fn fullname_contains(&self) -> Option<&str> {
        self.fullname_contains.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn scope(&self) -> DeletedScope {
        self.scope
    }

    /// Evaluate the filter in memory.
    ///
    /// Adapters that cannot push predicates into a query engine use this to
    /// get the same semantics as the SQL store.
    pub fn matches(&self, user: &User) -> bool {
        if user.is_deleted != self.scope.is_deleted() {
            return false;
        }
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if let Some(needle) = &self.name_contains {
            if !contains_ignore_case(user.name.as_ref(), needle) {
                return false;
            }
        }
        if let Some(needle) = &self.fullname_contains {
            match &user.fullname {
                Some(fullname) if contains_ignore_case(fullname, needle) => {}
                _ => return false,
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Rejected pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequestError {
    ZeroPage,
    ZeroPageSize,
}

impl fmt::Display for PageRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPage => write!(f, "page must be at least 1"),
            Self::ZeroPageSize => write!(f, "page size must be at least 1"),
        }
    }
}

impl std::error::Error for PageRequestError {}

/// One-based page request.
///
/// ## Invariants
/// - `page >= 1` and `page_size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Examples
    /// ```
    /// use user_directory::domain::PageRequest;
    ///
    /// let window = PageRequest::new(3, 10).expect("valid page").window();
    /// assert_eq!(window.skip, 20);
    /// assert_eq!(window.take, 10);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset/limit pair for the store.
    pub fn window(&self) -> PageWindow {
        PageWindow {
            skip: u64::from(self.page - 1) * u64::from(self.page_size),
            take: self.page_size,
        }
    }
}

/// Offset/limit pair derived from a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub take: u32,
}

/// A page of users plus the total number of records matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total_count: u64,
}
