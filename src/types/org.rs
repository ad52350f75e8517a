use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Role held by a user at a single organization, department or team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "MEMBER" => Role::Member,
            "ADMIN" => Role::Admin,
            _ => bail!("unknown role '{s}'"),
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub create_time: u64,
    pub update_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub create_time: u64,
    pub update_time: u64,
}

/// A team is personal (no parent), organization-level (organization only) or
/// department-level (both set). The shape never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,

    pub create_time: u64,
    pub update_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

/// Body for creating or renaming an organization, department or team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutMemberRequest {
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchMemberRequest {
    pub role: Role,
}

pub const MAX_ENTITY_NAME_LENGTH: usize = 256;

pub fn validate_entity_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("name cannot be empty");
    }
    if name.chars().count() > MAX_ENTITY_NAME_LENGTH {
        bail!("name is too long, max length is {MAX_ENTITY_NAME_LENGTH}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("MEMBER".parse::<Role>().unwrap(), Role::Member);
        assert!("OWNER".parse::<Role>().is_err());

        let req: PutMemberRequest =
            serde_json::from_str(r#"{"user_id": "u1", "role": "ADMIN"}"#).unwrap();
        assert_eq!(req.role, Role::Admin);
        assert!(serde_json::from_str::<PatchMemberRequest>(r#"{"role": "admin"}"#).is_err());
    }

    #[test]
    fn test_team_shape_serialize() {
        let team = Team {
            id: String::from("t1"),
            name: String::from("Personal"),
            organization_id: None,
            department_id: None,
            create_time: 1,
            update_time: 1,
        };
        let json = serde_json::to_value(&team).unwrap();
        assert!(json.get("organization_id").is_none());
        assert!(json.get("department_id").is_none());
    }

    #[test]
    fn test_validate_entity_name() {
        assert!(validate_entity_name("Engineering").is_ok());
        assert!(validate_entity_name("   ").is_err());
        assert!(validate_entity_name(&"n".repeat(MAX_ENTITY_NAME_LENGTH + 1)).is_err());
    }
}
