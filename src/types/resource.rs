use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of resources owned by exactly one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Battle,
    Retro,
    Storyboard,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Project,
        ResourceKind::Battle,
        ResourceKind::Retro,
        ResourceKind::Storyboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Battle => "battle",
            ResourceKind::Retro => "retro",
            ResourceKind::Storyboard => "storyboard",
        }
    }

    /// Collection path segment, e.g. `projects`.
    pub fn from_collection(segment: &str) -> Option<Self> {
        Some(match segment {
            "projects" => ResourceKind::Project,
            "battles" => ResourceKind::Battle,
            "retros" => ResourceKind::Retro,
            "storyboards" => ResourceKind::Storyboard,
            _ => return None,
        })
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single owner of a scoped resource.
///
/// Encoded as a one-key object: `{"team": id}`, `{"department": id}`,
/// `{"organization": id}` or `{"user": id}`. Any other shape fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Team(String),
    Department(String),
    Organization(String),
    User(String),
}

impl Owner {
    /// Builds the owner from the four nullable owner columns. Returns `None`
    /// unless exactly one of them is set.
    pub fn from_columns(
        team_id: Option<String>,
        department_id: Option<String>,
        organization_id: Option<String>,
        user_id: Option<String>,
    ) -> Option<Self> {
        let owners: Vec<Owner> = [
            team_id.map(Owner::Team),
            department_id.map(Owner::Department),
            organization_id.map(Owner::Organization),
            user_id.map(Owner::User),
        ]
        .into_iter()
        .flatten()
        .collect();

        if owners.len() != 1 {
            return None;
        }
        owners.into_iter().next()
    }

    pub fn team_id(&self) -> Option<&str> {
        match self {
            Owner::Team(id) => Some(id),
            _ => None,
        }
    }

    pub fn department_id(&self) -> Option<&str> {
        match self {
            Owner::Department(id) => Some(id),
            _ => None,
        }
    }

    pub fn organization_id(&self) -> Option<&str> {
        match self {
            Owner::Organization(id) => Some(id),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Owner::User(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopedResource {
    pub id: String,
    pub kind: ResourceKind,
    pub name: String,
    pub owner: Owner,
    pub create_time: u64,
    pub update_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutResourceRequest {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchResourceRequest {
    pub name: String,
}
