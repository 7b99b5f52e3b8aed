use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use juniper::{GraphQLEnum, GraphQLInputObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::common::{Email, EventId, LearningStyle, Mode, ValidationErrors};
use crate::domains::auth::models::Creator;
use crate::domains::membership::{Membered, Membership, MembershipKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Published,
    Draft,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Published => "published",
            EventStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "published" | "publicado" => Ok(EventStatus::Published),
            "draft" | "borrador" => Ok(EventStatus::Draft),
            _ => Err(anyhow::anyhow!("Invalid event status: {}", s)),
        }
    }
}

/// Event published by a university or company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub capacity: i32,
    pub attendees: i32,
    pub attendee_ids: Vec<String>,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub organizer: String,
    pub organizer_email: Email,
    pub status: EventStatus,
    /// Bumped by the store on every membership change
    #[serde(default)]
    pub membership_version: i64,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn spots_left(&self) -> i32 {
        (self.capacity - self.attendees).max(0)
    }
}

impl Membered for Event {
    const KIND: MembershipKind = MembershipKind::Event;

    fn entity_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn membership(&self) -> Membership {
        Membership::new(self.attendees, self.attendee_ids.clone())
    }

    fn membership_version(&self) -> i64 {
        self.membership_version
    }

    fn set_membership(&mut self, membership: Membership, version: i64) {
        self.attendees = membership.count;
        self.attendee_ids = membership.ids;
        self.membership_version = version;
    }

    fn capacity(&self) -> Option<i32> {
        Some(self.capacity)
    }
}

/// Validated event ready to be written; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub capacity: i32,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub organizer: String,
    pub organizer_email: Email,
}

impl NewEvent {
    /// Materialize with zero attendees
    pub fn into_event(self, id: EventId, created_at: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            capacity: self.capacity,
            attendees: 0,
            attendee_ids: Vec::new(),
            style: self.style,
            mode: self.mode,
            location: self.location,
            organizer: self.organizer,
            organizer_email: self.organizer_email,
            status: EventStatus::Published,
            membership_version: 0,
            created_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CreateEventInput {
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub capacity: Option<i32>,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
}

pub(crate) fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

impl CreateEventInput {
    pub fn validate(self, creator: &Creator) -> Result<NewEvent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("title", &self.title, "title is required");

        let date = if self.date.trim().is_empty() {
            errors.push("date", "date is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.push("date", "date must be YYYY-MM-DD");
            }
            parsed
        };

        let time = if self.time.trim().is_empty() {
            errors.push("time", "time is required");
            None
        } else {
            let parsed = parse_time(&self.time);
            if parsed.is_none() {
                errors.push("time", "time must be HH:MM");
            }
            parsed
        };

        match self.capacity {
            None => errors.push("capacity", "capacity is required"),
            Some(c) if c <= 0 => errors.push("capacity", "capacity must be greater than zero"),
            Some(_) => {}
        }

        if self.mode == Mode::Hybrid {
            errors.push("mode", "events are either in person or virtual");
        }

        let location = self
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        if self.mode == Mode::InPerson && location.is_none() {
            errors.push("location", "location is required for in-person events");
        }

        errors.into_result()?;

        match (date, time, self.capacity) {
            (Some(date), Some(time), Some(capacity)) => Ok(NewEvent {
                title: self.title.trim().to_string(),
                date,
                time,
                capacity,
                style: self.style,
                mode: self.mode,
                location,
                organizer: creator.display_name.clone(),
                organizer_email: creator.email.clone(),
            }),
            _ => Err(ValidationErrors::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator() -> Creator {
        Creator {
            email: Email::parse("events@uni.edu").unwrap(),
            display_name: "Universidad Central".to_string(),
        }
    }

    fn input() -> CreateEventInput {
        CreateEventInput {
            title: "Robotics fair".to_string(),
            date: "2026-11-03".to_string(),
            time: "18:30".to_string(),
            capacity: Some(40),
            style: LearningStyle::Kinesthetic,
            mode: Mode::InPerson,
            location: Some(" Main hall ".to_string()),
        }
    }

    #[test]
    fn test_valid_event_takes_organizer_from_creator() {
        let event = input().validate(&creator()).unwrap();

        assert_eq!(event.organizer, "Universidad Central");
        assert_eq!(event.organizer_email.as_str(), "events@uni.edu");
        assert_eq!(event.location.as_deref(), Some("Main hall"));
        assert_eq!(event.time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    }

    #[test]
    fn test_new_event_starts_empty_and_published() {
        let event = input()
            .validate(&creator())
            .unwrap()
            .into_event(EventId::new(), Utc::now());

        assert_eq!(event.attendees, 0);
        assert!(event.attendee_ids.is_empty());
        assert_eq!(event.status, EventStatus::Published);
        assert_eq!(event.spots_left(), 40);
    }

    #[test]
    fn test_required_fields_reported_together() {
        let data = CreateEventInput {
            title: " ".to_string(),
            date: String::new(),
            time: String::new(),
            capacity: None,
            ..input()
        };

        let errors = data.validate(&creator()).unwrap_err();

        for field in ["title", "date", "time", "capacity"] {
            assert!(errors.has(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_bad_formats_and_zero_capacity_rejected() {
        let data = CreateEventInput {
            date: "03/11/2026".to_string(),
            time: "6pm".to_string(),
            capacity: Some(0),
            ..input()
        };

        let errors = data.validate(&creator()).unwrap_err();

        assert!(errors.has("date"));
        assert!(errors.has("time"));
        assert!(errors.has("capacity"));
    }

    #[test]
    fn test_in_person_needs_location() {
        let data = CreateEventInput {
            location: None,
            ..input()
        };
        assert!(data.validate(&creator()).unwrap_err().has("location"));

        let virtual_event = CreateEventInput {
            location: None,
            mode: Mode::Virtual,
            ..input()
        };
        assert!(virtual_event.validate(&creator()).is_ok());
    }

    #[test]
    fn test_hybrid_events_rejected() {
        let data = CreateEventInput {
            mode: Mode::Hybrid,
            ..input()
        };
        assert!(data.validate(&creator()).unwrap_err().has("mode"));
    }

    #[test]
    fn test_status_accepts_legacy_spelling() {
        assert_eq!(
            "publicado".parse::<EventStatus>().unwrap(),
            EventStatus::Published
        );
    }
}
