use juniper::GraphQLObject;

use super::models::Resource;
use crate::common::LearningStyle;

#[derive(Debug, Clone, GraphQLObject)]
pub struct ResourceData {
    pub id: String,
    pub title: String,
    pub resource_type: String,
    pub style: LearningStyle,
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Resource> for ResourceData {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            title: resource.title,
            resource_type: resource.resource_type,
            style: resource.style,
            url: resource.url,
            description: resource.description,
            created_at: resource.created_at.to_rfc3339(),
        }
    }
}
