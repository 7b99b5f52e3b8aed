use juniper::GraphQLObject;

use super::models::{Event, EventStatus};
use crate::common::{Email, LearningStyle, Mode};

/// API representation of an event
#[derive(Debug, Clone, GraphQLObject)]
pub struct EventData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub capacity: i32,
    pub attendees: i32,
    pub spots_left: i32,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub organizer: String,
    pub status: EventStatus,
    /// Whether the requesting user is registered
    pub viewer_is_attending: bool,
    pub created_at: String,
}

impl EventData {
    pub fn for_viewer(event: Event, viewer: Option<&Email>) -> Self {
        let viewer_is_attending =
            viewer.map_or(false, |email| event.attendee_ids.iter().any(|id| id == email.as_str()));

        let spots_left = event.spots_left();

        Self {
            id: event.id.to_string(),
            title: event.title,
            date: event.date.format("%Y-%m-%d").to_string(),
            time: event.time.format("%H:%M").to_string(),
            capacity: event.capacity,
            attendees: event.attendees,
            spots_left,
            style: event.style,
            mode: event.mode,
            location: event.location,
            organizer: event.organizer,
            status: event.status,
            viewer_is_attending,
            created_at: event.created_at.to_rfc3339(),
        }
    }
}
