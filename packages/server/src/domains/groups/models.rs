use chrono::{DateTime, Utc};
use juniper::GraphQLInputObject;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Email, GroupId, LearningStyle, Mode, ValidationErrors};
use crate::domains::auth::models::Creator;
use crate::domains::membership::{Membered, Membership, MembershipKind};

/// Smallest group worth forming: the creator plus one
pub const MIN_GROUP_SIZE: i32 = 2;

/// Student-run study group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub max_members: i32,
    pub members: i32,
    pub member_ids: Vec<String>,
    /// Bumped by the store on every membership change
    #[serde(default)]
    pub membership_version: i64,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub schedule: String,
    pub topics: Vec<String>,
    pub created_by: Email,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_full(&self) -> bool {
        self.members >= self.max_members
    }
}

impl Membered for Group {
    const KIND: MembershipKind = MembershipKind::Group;

    fn entity_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn membership(&self) -> Membership {
        Membership::new(self.members, self.member_ids.clone())
    }

    fn membership_version(&self) -> i64 {
        self.membership_version
    }

    fn set_membership(&mut self, membership: Membership, version: i64) {
        self.members = membership.count;
        self.member_ids = membership.ids;
        self.membership_version = version;
    }

    fn capacity(&self) -> Option<i32> {
        Some(self.max_members)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub max_members: i32,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub schedule: String,
    pub topics: Vec<String>,
    pub created_by: Email,
}

impl NewGroup {
    /// Materialize with the creator as the only member
    pub fn into_group(self, id: GroupId, created_at: DateTime<Utc>) -> Group {
        let seed = Membership::seeded(self.created_by.as_str());
        Group {
            id,
            name: self.name,
            max_members: self.max_members,
            members: seed.count,
            member_ids: seed.ids,
            membership_version: 0,
            style: self.style,
            mode: self.mode,
            location: self.location,
            schedule: self.schedule,
            topics: self.topics,
            created_by: self.created_by,
            created_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CreateGroupInput {
    pub name: String,
    pub max_members: Option<i32>,
    pub style: LearningStyle,
    pub mode: Mode,
    pub location: Option<String>,
    pub schedule: String,
    /// Comma separated, e.g. "algebra, calculus"
    pub topics: String,
}

/// Split a comma separated topic list, dropping blanks
pub fn split_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl CreateGroupInput {
    pub fn validate(self, creator: &Creator) -> Result<NewGroup, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name, "name is required");
        errors.require("schedule", &self.schedule, "schedule is required");

        match self.max_members {
            None => errors.push("max_members", "maximum members is required"),
            Some(n) if n < MIN_GROUP_SIZE => errors.push(
                "max_members",
                format!("a group needs room for at least {} members", MIN_GROUP_SIZE),
            ),
            Some(_) => {}
        }

        let topics = split_topics(&self.topics);
        if topics.is_empty() {
            errors.push("topics", "at least one topic is required");
        }

        errors.into_result()?;

        Ok(NewGroup {
            name: self.name.trim().to_string(),
            max_members: self.max_members.unwrap_or(MIN_GROUP_SIZE),
            style: self.style,
            mode: self.mode,
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            schedule: self.schedule.trim().to_string(),
            topics,
            created_by: creator.email.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator() -> Creator {
        Creator {
            email: Email::parse("ana@uni.edu").unwrap(),
            display_name: "Ana".to_string(),
        }
    }

    fn input() -> CreateGroupInput {
        CreateGroupInput {
            name: "Calculus crew".to_string(),
            max_members: Some(5),
            style: LearningStyle::Auditory,
            mode: Mode::Hybrid,
            location: None,
            schedule: "Tuesdays 18:00".to_string(),
            topics: "limits, , derivatives ,integrals".to_string(),
        }
    }

    #[test]
    fn test_topics_are_split_and_trimmed() {
        assert_eq!(
            split_topics("limits, , derivatives ,integrals"),
            vec!["limits", "derivatives", "integrals"]
        );
    }

    #[test]
    fn test_creator_is_first_member() {
        let group = input()
            .validate(&creator())
            .unwrap()
            .into_group(GroupId::new(), Utc::now());

        assert_eq!(group.members, 1);
        assert_eq!(group.member_ids, vec!["ana@uni.edu".to_string()]);
        assert!(group.membership().is_consistent());
        assert!(!group.is_full());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let data = CreateGroupInput {
            name: String::new(),
            max_members: None,
            schedule: " ".to_string(),
            topics: " , ".to_string(),
            ..input()
        };

        let errors = data.validate(&creator()).unwrap_err();

        for field in ["name", "max_members", "schedule", "topics"] {
            assert!(errors.has(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_group_of_one_rejected() {
        let data = CreateGroupInput {
            max_members: Some(1),
            ..input()
        };
        assert!(data.validate(&creator()).unwrap_err().has("max_members"));
    }
}
