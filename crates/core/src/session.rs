//! Login session model.

use serde::{Deserialize, Serialize};

use crate::Time;

/// Who is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// A stored login session. Nothing about it is verified server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Phone number or e-mail used to log in
    #[serde(alias = "phoneNumber", alias = "email")]
    pub identifier: String,

    /// Granted role
    pub role: Role,

    /// When the session started
    pub login_time: Time,

    /// Always true for stored sessions
    pub is_authenticated: bool,
}

impl Session {
    /// Start a session now.
    pub fn start(identifier: impl Into<String>, role: Role, at: Time) -> Self {
        Self {
            identifier: identifier.into(),
            role,
            login_time: at,
            is_authenticated: true,
        }
    }

    /// Whether the session grants admin access.
    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.role == Role::Admin
    }
}
