//! Group assignment and group membership models.

use serde::{Deserialize, Serialize};

/// Links an application to a target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignment {
    #[serde(default)]
    pub id: Option<String>,
    /// Absent for assignments that do not target a concrete group.
    #[serde(default)]
    pub target_group_id: Option<String>,
}

/// Kind of directory object found in a group's member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    User,
    Group,
    Other,
}

impl MemberType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "#microsoft.graph.user" => Self::User,
            "#microsoft.graph.group" => Self::Group,
            _ => Self::Other,
        }
    }
}

/// An entry returned by `groups/{id}/members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "@odata.type", default)]
    pub type_tag: String,
}

impl GroupMember {
    pub fn member_type(&self) -> MemberType {
        MemberType::from_tag(&self.type_tag)
    }
}
