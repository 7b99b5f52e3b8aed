use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{LearningStyle, ResourceId};

/// Learning material recommended by style; curated outside the app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    /// Free-form kind such as "video", "podcast" or "workshop"
    pub resource_type: String,
    pub style: LearningStyle,
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
