//! GraphQL schema definition.

use super::context::GraphQLContext;
use juniper::{EmptySubscription, FieldError, FieldResult, GraphQLObject, RootNode};
use tracing::{error, info};
use uuid::Uuid;

use crate::common::{Email, EventId, GroupId, JobId, ValidationErrors};

// Domain actions
use crate::domains::auth::actions as auth_actions;

// Domain data types (GraphQL types)
use crate::domains::auth::data::{QuizQuestionData, SessionData, UserData};
use crate::domains::events::EventData;
use crate::domains::groups::GroupData;
use crate::domains::jobs::JobData;
use crate::domains::resources::ResourceData;

// Domain models and inputs
use crate::domains::auth::models::{
    CompleteOnboardingInput, Creator, LoginInput, RegisterInput, LEARNING_QUIZ,
};
use crate::domains::auth::{AccountError, UserRole};
use crate::domains::catalog::CatalogError;
use crate::domains::events::CreateEventInput;
use crate::domains::groups::CreateGroupInput;
use crate::domains::jobs::CreateJobInput;
use crate::domains::membership::{MembershipChange, MembershipError, MembershipKind};

/// Outcome of a join/leave request
#[derive(Debug, Clone, GraphQLObject)]
pub struct ToggleResult {
    pub success: bool,
    /// What happened; absent when the toggle failed
    pub change: Option<MembershipChange>,
    /// Message for the user
    pub message: String,
}

/// Collection sizes for the dashboards
#[derive(Debug, Clone, GraphQLObject)]
pub struct DashboardStats {
    pub events: i32,
    pub jobs: i32,
    pub groups: i32,
    pub resources: i32,
}

// =============================================================================
// Helper functions
// =============================================================================

/// Convert any displayable error to juniper FieldError for thin resolvers
fn to_field_error(e: impl std::fmt::Display) -> FieldError {
    FieldError::new(e.to_string(), juniper::Value::null())
}

/// Validation failures carry one extension entry per rejected field
fn validation_field_error(errors: &ValidationErrors) -> FieldError {
    let mut fields = juniper::Object::with_capacity(errors.iter().count());
    for e in errors.iter() {
        fields.add_field(e.field, juniper::Value::scalar(e.message.clone()));
    }
    FieldError::new(
        format!("Invalid input: {}", errors),
        juniper::Value::Object(fields),
    )
}

fn account_field_error(e: AccountError) -> FieldError {
    match e {
        AccountError::Validation(errors) => validation_field_error(&errors),
        AccountError::Store(_) | AccountError::Provider(_) => {
            error!(error = %e, "Account operation failed");
            to_field_error("Something went wrong, please try again")
        }
        other => to_field_error(other),
    }
}

fn catalog_field_error(e: CatalogError) -> FieldError {
    match e {
        CatalogError::Validation(errors) => validation_field_error(&errors),
        other => to_field_error(other),
    }
}

fn parse_entity_id(raw: &str) -> FieldResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| to_field_error(format!("Invalid id: {}", raw)))
}

fn viewer(ctx: &GraphQLContext) -> Option<&Email> {
    ctx.auth_user.as_ref().map(|user| &user.email)
}

/// Load the caller's profile and check they may publish
async fn publishing_creator(
    ctx: &GraphQLContext,
    allowed: fn(&UserRole) -> bool,
    what: &str,
) -> FieldResult<Creator> {
    let user = ctx.require_auth()?;
    if !allowed(&user.role) {
        return Err(account_field_error(AccountError::PermissionDenied(format!(
            "{} accounts cannot create {}",
            user.role, what
        ))));
    }

    let profile = ctx
        .deps()
        .store
        .get_user(&user.email)
        .await
        .map_err(|e| account_field_error(AccountError::Store(e)))?
        .ok_or_else(|| account_field_error(AccountError::ProfileNotFound))?;

    Ok(profile.creator())
}

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    // =========================================================================
    // Catalog Queries
    // =========================================================================

    /// All events, newest first
    async fn events(ctx: &GraphQLContext) -> Vec<EventData> {
        ctx.catalog
            .events()
            .await
            .into_iter()
            .map(|e| EventData::for_viewer(e, viewer(ctx)))
            .collect()
    }

    async fn event(ctx: &GraphQLContext, id: String) -> FieldResult<Option<EventData>> {
        let id = EventId::from_uuid(parse_entity_id(&id)?);
        Ok(ctx
            .catalog
            .event(id)
            .await
            .map(|e| EventData::for_viewer(e, viewer(ctx))))
    }

    /// All job offers, newest first
    async fn jobs(ctx: &GraphQLContext) -> Vec<JobData> {
        ctx.catalog
            .jobs()
            .await
            .into_iter()
            .map(|j| JobData::for_viewer(j, viewer(ctx)))
            .collect()
    }

    async fn job(ctx: &GraphQLContext, id: String) -> FieldResult<Option<JobData>> {
        let id = JobId::from_uuid(parse_entity_id(&id)?);
        Ok(ctx
            .catalog
            .job(id)
            .await
            .map(|j| JobData::for_viewer(j, viewer(ctx))))
    }

    /// All study groups, newest first
    async fn groups(ctx: &GraphQLContext) -> Vec<GroupData> {
        ctx.catalog
            .groups()
            .await
            .into_iter()
            .map(|g| GroupData::for_viewer(g, viewer(ctx)))
            .collect()
    }

    async fn group(ctx: &GraphQLContext, id: String) -> FieldResult<Option<GroupData>> {
        let id = GroupId::from_uuid(parse_entity_id(&id)?);
        Ok(ctx
            .catalog
            .group(id)
            .await
            .map(|g| GroupData::for_viewer(g, viewer(ctx))))
    }

    async fn resources(ctx: &GraphQLContext) -> Vec<ResourceData> {
        ctx.catalog
            .resources()
            .await
            .into_iter()
            .map(ResourceData::from)
            .collect()
    }

    async fn dashboard_stats(ctx: &GraphQLContext) -> DashboardStats {
        let summary = ctx.catalog.summary().await;
        DashboardStats {
            events: summary.events as i32,
            jobs: summary.jobs as i32,
            groups: summary.groups as i32,
            resources: summary.resources as i32,
        }
    }

    // =========================================================================
    // Account Queries
    // =========================================================================

    /// Get the current user's profile
    async fn me(ctx: &GraphQLContext) -> FieldResult<Option<UserData>> {
        let Some(user) = ctx.auth_user.as_ref() else {
            return Ok(None);
        };

        let profile = ctx
            .deps()
            .store
            .get_user(&user.email)
            .await
            .map_err(|e| account_field_error(AccountError::Store(e)))?;

        Ok(profile.map(UserData::from))
    }

    /// The learning-style questionnaire, in answer order
    fn learning_quiz() -> Vec<QuizQuestionData> {
        LEARNING_QUIZ
            .iter()
            .enumerate()
            .map(|(i, q)| QuizQuestionData::from_question(i, q))
            .collect()
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    // =========================================================================
    // Account Mutations
    // =========================================================================

    async fn register(ctx: &GraphQLContext, input: RegisterInput) -> FieldResult<SessionData> {
        let session = auth_actions::register(input, ctx.deps())
            .await
            .map_err(account_field_error)?;
        Ok(SessionData::from(session))
    }

    async fn login(ctx: &GraphQLContext, input: LoginInput) -> FieldResult<SessionData> {
        let session = auth_actions::login(input, ctx.deps())
            .await
            .map_err(account_field_error)?;
        Ok(SessionData::from(session))
    }

    /// Submit quiz answers and profile details (students)
    async fn complete_onboarding(
        ctx: &GraphQLContext,
        input: CompleteOnboardingInput,
    ) -> FieldResult<UserData> {
        let user = ctx.require_auth()?;
        let profile = auth_actions::complete_onboarding(&user.email, input, ctx.deps())
            .await
            .map_err(account_field_error)?;
        Ok(UserData::from(profile))
    }

    // =========================================================================
    // Publishing Mutations
    // =========================================================================

    /// Publish an event (universities and companies)
    async fn create_event(ctx: &GraphQLContext, input: CreateEventInput) -> FieldResult<EventData> {
        let creator = publishing_creator(ctx, UserRole::can_publish_events, "events").await?;
        let event = ctx
            .catalog
            .add_event(input, &creator)
            .await
            .map_err(catalog_field_error)?;
        Ok(EventData::for_viewer(event, viewer(ctx)))
    }

    /// Publish a job offer (companies)
    async fn create_job(ctx: &GraphQLContext, input: CreateJobInput) -> FieldResult<JobData> {
        let creator = publishing_creator(ctx, UserRole::can_publish_jobs, "jobs").await?;
        let job = ctx
            .catalog
            .add_job(input, &creator)
            .await
            .map_err(catalog_field_error)?;
        Ok(JobData::for_viewer(job, viewer(ctx)))
    }

    /// Start a study group; the caller becomes its first member (students)
    async fn create_group(ctx: &GraphQLContext, input: CreateGroupInput) -> FieldResult<GroupData> {
        let creator = publishing_creator(ctx, UserRole::can_create_groups, "groups").await?;
        let group = ctx
            .catalog
            .add_group(input, &creator)
            .await
            .map_err(catalog_field_error)?;
        Ok(GroupData::for_viewer(group, viewer(ctx)))
    }

    // =========================================================================
    // Membership Mutations
    // =========================================================================

    /// Join (`join: true`) or leave an event, job or group as the current user
    async fn toggle_membership(
        ctx: &GraphQLContext,
        kind: MembershipKind,
        id: String,
        join: bool,
    ) -> FieldResult<ToggleResult> {
        let user = ctx.require_auth()?;
        let entity_id = parse_entity_id(&id)?;
        let notifier = &ctx.deps().notifier;

        let result = match ctx
            .catalog
            .try_toggle_membership(kind, entity_id, &user.email, join)
            .await
        {
            Ok(change) => {
                let message = kind.success_notice(change);
                notifier.success(message);
                ToggleResult {
                    success: true,
                    change: Some(change),
                    message: message.to_string(),
                }
            }
            Err(MembershipError::CapacityReached { .. }) => {
                let message = "There are no places left";
                notifier.error(message);
                ToggleResult {
                    success: false,
                    change: None,
                    message: message.to_string(),
                }
            }
            Err(_) => {
                let message = kind.failure_notice();
                notifier.error(message);
                ToggleResult {
                    success: false,
                    change: None,
                    message: message.to_string(),
                }
            }
        };

        Ok(result)
    }

    /// Reload every collection from the store
    async fn refresh_catalog(ctx: &GraphQLContext) -> FieldResult<bool> {
        let user = ctx.require_auth()?;
        info!(email = %user.email, "Catalog refresh requested");
        ctx.catalog
            .refresh()
            .await
            .map_err(catalog_field_error)?;
        Ok(true)
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
