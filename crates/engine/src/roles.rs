//! Roles and the verified identity attached to every request.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Authorization role of a user.
///
/// `Admin` bypasses ownership checks on movements and can manage users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Returns the canonical role string used by the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Narrows a stored role column into a [`Role`].
    ///
    /// Anything that is not a known role (empty, legacy or corrupted values)
    /// resolves to the least privileged variant.
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|raw| Self::try_from(raw).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "ADMIN" | "admin" => Ok(Self::Admin),
            "USER" | "user" => Ok(Self::User),
            other => Err(EngineError::InvalidRole(format!("unknown role: {other}"))),
        }
    }
}

/// An authenticated requester.
///
/// Built once by the authentication layer and trusted by the engine as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(Role::try_from("ADMIN").unwrap(), Role::Admin);
        assert_eq!(Role::try_from("user").unwrap(), Role::User);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(matches!(
            Role::try_from("ROOT"),
            Err(EngineError::InvalidRole(_))
        ));
    }

    #[test]
    fn stored_role_fails_closed() {
        assert_eq!(Role::from_stored(None), Role::User);
        assert_eq!(Role::from_stored(Some("")), Role::User);
        assert_eq!(Role::from_stored(Some("SUPERUSER")), Role::User);
        assert_eq!(Role::from_stored(Some("ADMIN")), Role::Admin);
    }

    #[test]
    fn role_round_trips_through_as_str() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
    }
}
