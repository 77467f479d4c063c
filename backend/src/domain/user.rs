//! Caller identity primitives.
//!
//! Users are owned by an external identity provider. The ride core only sees
//! an opaque subject identifier and the set of roles the caller holds.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum accepted length for a user identifier.
pub const USER_ID_MAX: usize = 255;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must not contain surrounding whitespace")]
    PaddedId,
    #[error("user id must be at most {max} characters")]
    IdTooLong { max: usize },
}

/// Opaque identifier of a driver or passenger, as issued by the identity
/// provider (`sub` claim).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use ride_service::domain::UserId;
    ///
    /// let id = UserId::new("driver-7").expect("valid id");
    /// assert_eq!(id.as_ref(), "driver-7");
    /// assert!(UserId::new("   ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::PaddedId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role granted to a caller by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// May publish and complete rides.
    Driver,
    /// May join rides as a passenger.
    Student,
    /// Any role this service does not act upon.
    Other(String),
}

impl Role {
    /// Wire representation of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Driver => "DRIVER",
            Self::Student => "STUDENT",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "DRIVER" => Self::Driver,
            "STUDENT" => Self::Student,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller: who is asking and what they may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    user_id: UserId,
    roles: BTreeSet<Role>,
}

impl CallerIdentity {
    /// Build an identity from a subject and its granted roles.
    pub fn new(user_id: UserId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// Subject identifier of the caller.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Roles held by the caller.
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Whether the caller holds `role`.
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
