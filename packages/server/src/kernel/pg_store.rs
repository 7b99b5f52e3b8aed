//! Postgres-backed document store.
//!
//! Enum-like fields are stored as TEXT and parsed on the way out, so rows
//! written by older clients (Spanish spellings, legacy `role` column) still load.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::BaseDocumentStore;
use crate::common::{Email, EventId, GroupId, JobId, ResourceId};
use crate::domains::auth::models::{OnboardingProfile, UserProfile, UserRole};
use crate::domains::events::models::{Event, NewEvent};
use crate::domains::groups::models::{Group, NewGroup};
use crate::domains::jobs::models::{Job, NewJob};
use crate::domains::membership::{Membership, MembershipError, MembershipKind, MembershipUpdate};
use crate::domains::resources::models::Resource;

pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).with_context(|| format!("Stored email is invalid: {}", raw))
}

// =============================================================================
// Rows
// =============================================================================

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    date: NaiveDate,
    time: NaiveTime,
    capacity: i32,
    attendees: i32,
    attendee_ids: Vec<String>,
    membership_version: i64,
    style: String,
    mode: String,
    location: Option<String>,
    organizer: String,
    organizer_email: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = anyhow::Error;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Event {
            id: EventId::from_uuid(row.id),
            title: row.title,
            date: row.date,
            time: row.time,
            capacity: row.capacity,
            attendees: row.attendees,
            attendee_ids: row.attendee_ids,
            membership_version: row.membership_version,
            style: row.style.parse()?,
            mode: row.mode.parse()?,
            location: row.location,
            organizer: row.organizer,
            organizer_email: parse_email(&row.organizer_email)?,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    company: String,
    company_email: String,
    job_type: String,
    location: String,
    description: String,
    style: String,
    status: String,
    applicants: i32,
    applicant_ids: Vec<String>,
    membership_version: i64,
    posted_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self> {
        Ok(Job {
            id: JobId::from_uuid(row.id),
            title: row.title,
            company: row.company,
            company_email: parse_email(&row.company_email)?,
            job_type: row.job_type.parse()?,
            location: row.location,
            description: row.description,
            style: row.style.parse()?,
            status: row.status.parse()?,
            applicants: row.applicants,
            applicant_ids: row.applicant_ids,
            membership_version: row.membership_version,
            posted_date: row.posted_date,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    max_members: i32,
    members: i32,
    member_ids: Vec<String>,
    membership_version: i64,
    style: String,
    mode: String,
    location: Option<String>,
    schedule: String,
    topics: Vec<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<GroupRow> for Group {
    type Error = anyhow::Error;

    fn try_from(row: GroupRow) -> Result<Self> {
        Ok(Group {
            id: GroupId::from_uuid(row.id),
            name: row.name,
            max_members: row.max_members,
            members: row.members,
            member_ids: row.member_ids,
            membership_version: row.membership_version,
            style: row.style.parse()?,
            mode: row.mode.parse()?,
            location: row.location,
            schedule: row.schedule,
            topics: row.topics,
            created_by: parse_email(&row.created_by)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ResourceRow {
    id: Uuid,
    title: String,
    resource_type: String,
    style: String,
    url: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = anyhow::Error;

    fn try_from(row: ResourceRow) -> Result<Self> {
        Ok(Resource {
            id: ResourceId::from_uuid(row.id),
            title: row.title,
            resource_type: row.resource_type,
            style: row.style.parse()?,
            url: row.url,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    email: String,
    name: String,
    user_type: Option<String>,
    role: Option<String>,
    institution_name: Option<String>,
    onboarding_completed: bool,
    onboarding: Option<Json<OnboardingProfile>>,
    created_at: DateTime<Utc>,
}

/// Unknown role strings load as "no role"; login then reports it.
fn parse_role(email: &str, raw: Option<String>) -> Option<UserRole> {
    let raw = raw?;
    match raw.parse() {
        Ok(role) => Some(role),
        Err(_) => {
            warn!(email, role = %raw, "Ignoring unrecognized stored role");
            None
        }
    }
}

impl TryFrom<UserRow> for UserProfile {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(UserProfile {
            user_type: parse_role(&row.email, row.user_type),
            legacy_role: parse_role(&row.email, row.role),
            email: parse_email(&row.email)?,
            name: row.name,
            institution_name: row.institution_name,
            onboarding_completed: row.onboarding_completed,
            onboarding: row.onboarding.map(|Json(o)| o),
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

// =============================================================================
// Membership columns
// =============================================================================

/// Where each kind keeps its counter, id-list and capacity
struct MembershipColumns {
    table: &'static str,
    count: &'static str,
    ids: &'static str,
    /// SQL expression; `NULL` when uncapped
    capacity: &'static str,
}

impl MembershipColumns {
    fn for_kind(kind: MembershipKind) -> Self {
        match kind {
            MembershipKind::Event => Self {
                table: "events",
                count: "attendees",
                ids: "attendee_ids",
                capacity: "capacity",
            },
            MembershipKind::Job => Self {
                table: "jobs",
                count: "applicants",
                ids: "applicant_ids",
                capacity: "NULL::INTEGER",
            },
            MembershipKind::Group => Self {
                table: "study_groups",
                count: "members",
                ids: "member_ids",
                capacity: "max_members",
            },
        }
    }
}

#[derive(FromRow)]
struct MembershipRow {
    count: i32,
    ids: Vec<String>,
    capacity: Option<i32>,
    version: i64,
}

// =============================================================================
// BaseDocumentStore
// =============================================================================

#[async_trait]
impl BaseDocumentStore for PostgresDocumentStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>("SELECT * FROM events ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list events")?;
        convert_all(rows)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list jobs")?;
        convert_all(rows)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows =
            sqlx::query_as::<_, GroupRow>("SELECT * FROM study_groups ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list groups")?;
        convert_all(rows)
    }

    async fn list_resources(&self) -> Result<Vec<Resource>> {
        let rows =
            sqlx::query_as::<_, ResourceRow>("SELECT * FROM resources ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list resources")?;
        convert_all(rows)
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        let event = event.into_event(EventId::new(), Utc::now());

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (id, title, date, time, capacity, attendees, attendee_ids,
                                style, mode, location, organizer, organizer_email, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(event.date)
        .bind(event.time)
        .bind(event.capacity)
        .bind(event.attendees)
        .bind(&event.attendee_ids)
        .bind(event.style.as_str())
        .bind(event.mode.as_str())
        .bind(&event.location)
        .bind(&event.organizer)
        .bind(event.organizer_email.as_str())
        .bind(event.status.as_str())
        .bind(event.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert event")?;

        debug!(event_id = %event.id, "Event stored");
        Event::try_from(row)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job> {
        let job = job.into_job(JobId::new(), Utc::now());

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (id, title, company, company_email, job_type, location, description,
                              style, status, applicants, applicant_ids, posted_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(job.company_email.as_str())
        .bind(job.job_type.as_str())
        .bind(&job.location)
        .bind(&job.description)
        .bind(job.style.as_str())
        .bind(job.status.as_str())
        .bind(job.applicants)
        .bind(&job.applicant_ids)
        .bind(job.posted_date)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert job")?;

        debug!(job_id = %job.id, "Job stored");
        Job::try_from(row)
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let group = group.into_group(GroupId::new(), Utc::now());

        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO study_groups (id, name, max_members, members, member_ids, style, mode,
                                      location, schedule, topics, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(group.max_members)
        .bind(group.members)
        .bind(&group.member_ids)
        .bind(group.style.as_str())
        .bind(group.mode.as_str())
        .bind(&group.location)
        .bind(&group.schedule)
        .bind(&group.topics)
        .bind(group.created_by.as_str())
        .bind(group.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert group")?;

        debug!(group_id = %group.id, "Group stored");
        Group::try_from(row)
    }

    async fn put_user(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (email, name, user_type, role, institution_name,
                               onboarding_completed, onboarding, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                user_type = EXCLUDED.user_type,
                role = EXCLUDED.role,
                institution_name = EXCLUDED.institution_name,
                onboarding_completed = EXCLUDED.onboarding_completed,
                onboarding = EXCLUDED.onboarding
            "#,
        )
        .bind(profile.email.as_str())
        .bind(&profile.name)
        .bind(profile.user_type.map(|r| r.as_str()))
        .bind(profile.legacy_role.map(|r| r.as_str()))
        .bind(&profile.institution_name)
        .bind(profile.onboarding_completed)
        .bind(profile.onboarding.as_ref().map(Json))
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to store user profile")?;

        Ok(())
    }

    async fn get_user(&self, email: &Email) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load user profile")?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn save_onboarding(
        &self,
        email: &Email,
        onboarding: &OnboardingProfile,
    ) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET onboarding = $2, name = $3, onboarding_completed = TRUE
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email.as_str())
        .bind(Json(onboarding))
        .bind(&onboarding.name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to save onboarding")?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn update_membership(
        &self,
        kind: MembershipKind,
        entity_id: Uuid,
        user_id: &Email,
        want_join: bool,
    ) -> Result<MembershipUpdate, MembershipError> {
        let cols = MembershipColumns::for_kind(kind);
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open transaction")?;

        // Row lock serializes concurrent toggles on the same record
        let current = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {count} AS count, {ids} AS ids, {capacity} AS capacity, \
                    membership_version AS version \
             FROM {table} WHERE id = $1 FOR UPDATE",
            count = cols.count,
            ids = cols.ids,
            capacity = cols.capacity,
            table = cols.table,
        ))
        .bind(entity_id)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("Failed to read {} membership", kind))?
        .ok_or(MembershipError::NotFound { kind, entity_id })?;

        let (membership, change) = Membership::new(current.count, current.ids)
            .toggle(user_id.as_str(), want_join, current.capacity)
            .map_err(|full| full.into_error(kind, entity_id))?;

        let version = if change.is_noop() {
            current.version
        } else {
            current.version + 1
        };

        if !change.is_noop() {
            sqlx::query(&format!(
                "UPDATE {table} SET {count} = $2, {ids} = $3, membership_version = $4 WHERE id = $1",
                table = cols.table,
                count = cols.count,
                ids = cols.ids,
            ))
            .bind(entity_id)
            .bind(membership.count)
            .bind(&membership.ids)
            .bind(version)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to update {} membership", kind))?;
        }

        tx.commit()
            .await
            .context("Failed to commit membership update")?;

        debug!(%kind, %entity_id, user_id = %user_id, ?change, version, "Membership updated");

        Ok(MembershipUpdate {
            change,
            membership,
            version,
        })
    }
}
