use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use juniper::{GraphQLEnum, GraphQLInputObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::common::{Email, JobId, LearningStyle, ValidationErrors};
use crate::domains::auth::models::Creator;
use crate::domains::membership::{Membered, Membership, MembershipKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Freelance,
    Project,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Internship => "internship",
            JobType::Freelance => "freelance",
            JobType::Project => "project",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full_time" | "tiempo-completo" => Ok(JobType::FullTime),
            "part_time" | "medio-tiempo" => Ok(JobType::PartTime),
            "internship" | "practicas" => Ok(JobType::Internship),
            "freelance" => Ok(JobType::Freelance),
            "project" | "proyecto" => Ok(JobType::Project),
            _ => Err(anyhow::anyhow!("Invalid job type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Paused,
    Draft,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" | "activo" => Ok(JobStatus::Active),
            "paused" | "pausado" => Ok(JobStatus::Paused),
            "draft" | "borrador" => Ok(JobStatus::Draft),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// Job offer published by a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub company_email: Email,
    pub job_type: JobType,
    pub location: String,
    pub description: String,
    pub style: LearningStyle,
    pub status: JobStatus,
    pub applicants: i32,
    pub applicant_ids: Vec<String>,
    /// Bumped by the store on every membership change
    #[serde(default)]
    pub membership_version: i64,
    pub posted_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Membered for Job {
    const KIND: MembershipKind = MembershipKind::Job;

    fn entity_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn membership(&self) -> Membership {
        Membership::new(self.applicants, self.applicant_ids.clone())
    }

    fn membership_version(&self) -> i64 {
        self.membership_version
    }

    fn set_membership(&mut self, membership: Membership, version: i64) {
        self.applicants = membership.count;
        self.applicant_ids = membership.ids;
        self.membership_version = version;
    }

    // Applications are never capped
    fn capacity(&self) -> Option<i32> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub company_email: Email,
    pub job_type: JobType,
    pub location: String,
    pub description: String,
    pub style: LearningStyle,
}

impl NewJob {
    /// Materialize as an active posting with no applicants
    pub fn into_job(self, id: JobId, created_at: DateTime<Utc>) -> Job {
        Job {
            id,
            title: self.title,
            company: self.company,
            company_email: self.company_email,
            job_type: self.job_type,
            location: self.location,
            description: self.description,
            style: self.style,
            status: JobStatus::Active,
            applicants: 0,
            applicant_ids: Vec::new(),
            membership_version: 0,
            posted_date: created_at.date_naive(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CreateJobInput {
    pub title: String,
    pub location: String,
    pub description: String,
    /// Defaults to full time
    pub job_type: Option<JobType>,
    pub style: LearningStyle,
}

impl CreateJobInput {
    pub fn validate(self, creator: &Creator) -> Result<NewJob, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "title is required");
        errors.require("location", &self.location, "location is required");
        errors.require("description", &self.description, "description is required");
        errors.into_result()?;

        Ok(NewJob {
            title: self.title.trim().to_string(),
            company: creator.display_name.clone(),
            company_email: creator.email.clone(),
            job_type: self.job_type.unwrap_or_default(),
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            style: self.style,
        })
    }
}
