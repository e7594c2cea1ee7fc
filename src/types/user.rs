//! Portal users and roles.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user plays in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, sees the admin overview.
    Admin,
    /// Runs scans against projects.
    Tester,
    /// Owns projects and fixes findings.
    Developer,
}

impl Role {
    /// All roles in display order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Tester, Role::Developer];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Tester => write!(f, "tester"),
            Self::Developer => write!(f, "developer"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "tester" => Ok(Self::Tester),
            "developer" | "dev" => Ok(Self::Developer),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Login key. Not enforced unique.
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a freshly generated id.
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// The three demo accounts every fresh store starts with.
    pub fn demo_accounts() -> Vec<User> {
        let now = Utc::now();
        [
            ("admin-1", "admin@secportal.com", "Admin User", Role::Admin),
            ("tester-1", "tester@secportal.com", "Security Tester", Role::Tester),
            ("dev-1", "dev@secportal.com", "Developer", Role::Developer),
        ]
        .into_iter()
        .map(|(id, email, name, role)| User {
            id: UserId::from(id),
            email: email.to_string(),
            name: name.to_string(),
            role,
            created_at: now,
        })
        .collect()
    }
}

/// An authenticated session held in the session slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    /// Random bearer token identifying this login.
    pub token: String,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Open a session for `user` with a fresh token.
    pub fn open(user: User) -> Self {
        Self {
            user,
            token: uuid::Uuid::new_v4().simple().to_string(),
            started_at: Utc::now(),
        }
    }
}
