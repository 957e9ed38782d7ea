use serde::{Deserialize, Serialize};

pub const ROLE_ADMINISTRATOR: &str = "Administrator";
pub const ROLE_CLIENT: &str = "Client";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    // "Administrator" | "Client"
    pub role: String,
}

/// The signed-in user, as placed into request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMINISTRATOR
    }

    /// Owners may touch their own orders, administrators may touch any.
    pub fn can_manage(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            role: u.role,
        }
    }
}
