use juniper::GraphQLObject;

use super::models::{Job, JobStatus, JobType};
use crate::common::{Email, LearningStyle};

/// API representation of a job offer
#[derive(Debug, Clone, GraphQLObject)]
pub struct JobData {
    pub id: String,
    pub title: String,
    pub company: String,
    pub job_type: JobType,
    pub location: String,
    pub description: String,
    pub style: LearningStyle,
    pub status: JobStatus,
    pub applicants: i32,
    /// Whether the requesting user has applied
    pub viewer_has_applied: bool,
    pub posted_date: String,
    pub created_at: String,
}

impl JobData {
    pub fn for_viewer(job: Job, viewer: Option<&Email>) -> Self {
        let viewer_has_applied =
            viewer.map_or(false, |email| job.applicant_ids.iter().any(|id| id == email.as_str()));

        Self {
            id: job.id.to_string(),
            title: job.title,
            company: job.company,
            job_type: job.job_type,
            location: job.location,
            description: job.description,
            style: job.style,
            status: job.status,
            applicants: job.applicants,
            viewer_has_applied,
            posted_date: job.posted_date.format("%Y-%m-%d").to_string(),
            created_at: job.created_at.to_rfc3339(),
        }
    }
}
