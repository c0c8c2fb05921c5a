use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Server-side user identifier (a database object id string).
pub type UserId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Player,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
        }
    }

    /// Only decides which controls are offered. The server re-checks the
    /// role on every admin request.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
