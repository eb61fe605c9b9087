//! Caller identity
//!
//! The authenticated principal as seen by the file endpoints. It is built by
//! the API layer from the bearer token's name-identifier and role claims.

/// Authenticated caller of a file endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Identity id (name-identifier claim)
    pub id: String,
    /// Role claims, in token order. Empty for ordinary users.
    pub roles: Vec<String>,
}

impl Caller {
    pub fn new(id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    /// First role claim, if any.
    pub fn role(&self) -> Option<&str> {
        self.roles
            .iter()
            .map(String::as_str)
            .find(|role| !role.is_empty())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
