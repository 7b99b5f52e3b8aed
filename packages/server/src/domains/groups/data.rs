use juniper::GraphQLObject;

use super::models::Group;
use crate::common::{Email, LearningStyle, Mode};

/// API representation of a study group
#[derive(Debug, Clone, GraphQLObject)]
pub struct GroupData {
    pub id: String,
    pub name: String,
    pub max_members: i32,
    pub members: i32,
    pub is_full: bool,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub schedule: String,
    pub topics: Vec<String>,
    pub created_by: String,
    /// Whether the requesting user belongs to the group
    pub viewer_is_member: bool,
    pub created_at: String,
}

impl GroupData {
    pub fn for_viewer(group: Group, viewer: Option<&Email>) -> Self {
        let viewer_is_member =
            viewer.map_or(false, |email| group.member_ids.iter().any(|id| id == email.as_str()));
        let is_full = group.is_full();

        Self {
            id: group.id.to_string(),
            name: group.name,
            max_members: group.max_members,
            members: group.members,
            is_full,
            style: group.style,
            mode: group.mode,
            location: group.location,
            schedule: group.schedule,
            topics: group.topics,
            created_by: group.created_by.to_string(),
            viewer_is_member,
            created_at: group.created_at.to_rfc3339(),
        }
    }
}
