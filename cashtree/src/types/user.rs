use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CashtreeError, Result};

/// Account roles, ordered by privilege (enforced by backend convention only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Role {
    SuperAdmin,
    Admin,
    Partner,
    Assistant,
    #[default]
    User,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Partner,
        Role::Assistant,
        Role::User,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::Admin => "Admin",
            Role::Partner => "Partner",
            Role::Assistant => "Assistant",
            Role::User => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CashtreeError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CashtreeError::Validation(format!("unknown role: {s}")))
    }
}

/// A flat account record as returned by the user endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default, alias = "userdate")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub creator_info: Option<CreatorInfo>,
}

/// Creator summary embedded in all-users listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorInfo {
    pub username: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default, alias = "userdate")]
    pub created_at: Option<String>,
}

/// Username rule enforced before any network call: 4 to 16 characters from
/// letters, digits, dots, underscores, and dashes.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(4..=16).contains(&len) {
        return Err(CashtreeError::Validation(
            "username must be between 4 and 16 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(CashtreeError::Validation(
            "username may only contain letters, numbers, dots, underscores, and dashes".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_exact_spellings() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn test_role_from_str_case_insensitive() {
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_validate_username_accepts_charset() {
        assert!(validate_username("ab_c.d-4").is_ok());
        assert!(validate_username("user").is_ok());
        assert!(validate_username("a234567890123456").is_ok());
    }

    #[test]
    fn test_validate_username_rejects_length() {
        assert!(validate_username("abc").is_err());
        assert!(validate_username("a2345678901234567").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_username_rejects_charset() {
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("éloise").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_user_record_accepts_mongo_id_and_userdate() {
        let json = r#"{
            "_id": "64fa12",
            "username": "ops1",
            "role": "Partner",
            "balance": 120.5,
            "userdate": "2024-11-02T09:00:00Z"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "64fa12");
        assert_eq!(user.role, Role::Partner);
        assert_eq!(user.created_at.as_deref(), Some("2024-11-02T09:00:00Z"));
    }
}
