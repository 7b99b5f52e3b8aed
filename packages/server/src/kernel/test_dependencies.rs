// TestDependencies - mock implementations for testing
//
// Provides an in-memory document store, a mock auth provider and a recording
// notifier that can be injected into ServerDeps and the Catalog for tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{
    AuthIdentity, AuthProviderError, BaseAuthProvider, BaseDocumentStore, BaseNotifier,
    NoticeLevel, ServerDeps,
};
use crate::common::{Email, EventId, GroupId, JobId, LearningStyle, Mode, ResourceId};
use crate::domains::auth::models::{OnboardingProfile, UserProfile, MIN_PASSWORD_LEN};
use crate::domains::auth::JwtService;
use crate::domains::events::models::{Event, EventStatus, NewEvent};
use crate::domains::groups::models::{Group, NewGroup};
use crate::domains::jobs::models::{Job, JobStatus, JobType, NewJob};
use crate::domains::membership::{
    Membered, MembershipError, MembershipKind, MembershipUpdate,
};
use crate::domains::resources::models::Resource;

// =============================================================================
// In-memory Document Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    users: HashMap<Email, UserProfile>,
    events: Vec<Event>,
    jobs: Vec<Job>,
    groups: Vec<Group>,
    resources: Vec<Resource>,
}

/// Arguments captured from an update_membership call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipCall {
    pub kind: MembershipKind,
    pub entity_id: Uuid,
    pub user_id: String,
    pub want_join: bool,
}

/// Document store kept in process memory.
///
/// Membership updates follow the same rules as the Postgres store. Failures
/// can be switched on to simulate an unreachable backend, and replies can be
/// held back after the write has landed to simulate a slow network.
pub struct InMemoryDocumentStore {
    state: Mutex<StoreState>,
    offline: AtomicBool,
    reject_membership: AtomicBool,
    membership_calls: Mutex<Vec<MembershipCall>>,
    membership_delays: Mutex<HashMap<String, std::time::Duration>>,
    list_delay: Mutex<Option<std::time::Duration>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            offline: AtomicBool::new(false),
            reject_membership: AtomicBool::new(false),
            membership_calls: Mutex::new(Vec::new()),
            membership_delays: Mutex::new(HashMap::new()),
            list_delay: Mutex::new(None),
        }
    }

    pub fn with_event(self, event: Event) -> Self {
        self.state.lock().unwrap().events.push(event);
        self
    }

    pub fn with_job(self, job: Job) -> Self {
        self.state.lock().unwrap().jobs.push(job);
        self
    }

    pub fn with_group(self, group: Group) -> Self {
        self.state.lock().unwrap().groups.push(group);
        self
    }

    pub fn with_resource(self, resource: Resource) -> Self {
        self.state.lock().unwrap().resources.push(resource);
        self
    }

    pub fn with_user(self, profile: UserProfile) -> Self {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(profile.email.clone(), profile);
        self
    }

    /// Fail every call
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail only membership updates (reads and creates keep working)
    pub fn set_reject_membership(&self, reject: bool) {
        self.reject_membership.store(reject, Ordering::SeqCst);
    }

    /// Hold back the reply to `user_id`'s next membership update. The update
    /// is committed before the pause.
    pub fn delay_membership_for(&self, user_id: &str, delay: std::time::Duration) {
        self.membership_delays
            .lock()
            .unwrap()
            .insert(user_id.to_string(), delay);
    }

    /// Hold back list replies. The snapshot is taken before the pause.
    pub fn set_list_delay(&self, delay: std::time::Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    /// Get all membership updates that were attempted
    pub fn membership_calls(&self) -> Vec<MembershipCall> {
        self.membership_calls.lock().unwrap().clone()
    }

    pub fn event(&self, id: EventId) -> Option<Event> {
        let state = self.state.lock().unwrap();
        state.events.iter().find(|e| e.id == id).cloned()
    }

    pub fn job(&self, id: JobId) -> Option<Job> {
        let state = self.state.lock().unwrap();
        state.jobs.iter().find(|j| j.id == id).cloned()
    }

    pub fn group(&self, id: GroupId) -> Option<Group> {
        let state = self.state.lock().unwrap();
        state.groups.iter().find(|g| g.id == id).cloned()
    }

    pub fn user(&self, email: &Email) -> Option<UserProfile> {
        self.state.lock().unwrap().users.get(email).cloned()
    }

    /// Overwrite a stored group behind the catalog's back, as another
    /// client would. Counts as one membership change.
    pub fn replace_group(&self, mut group: Group) {
        let mut state = self.state.lock().unwrap();
        if let Some(slot) = state.groups.iter_mut().find(|g| g.id == group.id) {
            group.membership_version = slot.membership_version + 1;
            *slot = group;
        }
    }

    async fn pause_list(&self) {
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("document store unavailable");
        }
        Ok(())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

fn apply_toggle<T: Membered>(
    items: &mut [T],
    entity_id: Uuid,
    user_id: &str,
    want_join: bool,
) -> Result<MembershipUpdate, MembershipError> {
    let item = items
        .iter_mut()
        .find(|item| item.entity_id() == entity_id)
        .ok_or(MembershipError::NotFound {
            kind: T::KIND,
            entity_id,
        })?;

    let (membership, change) = item
        .membership()
        .toggle(user_id, want_join, item.capacity())
        .map_err(|full| full.into_error(T::KIND, entity_id))?;
    let version = if change.is_noop() {
        item.membership_version()
    } else {
        item.membership_version() + 1
    };
    item.set_membership(membership.clone(), version);

    Ok(MembershipUpdate {
        change,
        membership,
        version,
    })
}

#[async_trait]
impl BaseDocumentStore for InMemoryDocumentStore {
    async fn ping(&self) -> Result<()> {
        self.check_online()
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        self.check_online()?;
        let events = newest_first(&self.state.lock().unwrap().events, |e| e.created_at);
        self.pause_list().await;
        Ok(events)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>> {
        self.check_online()?;
        let jobs = newest_first(&self.state.lock().unwrap().jobs, |j| j.created_at);
        self.pause_list().await;
        Ok(jobs)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.check_online()?;
        let groups = newest_first(&self.state.lock().unwrap().groups, |g| g.created_at);
        self.pause_list().await;
        Ok(groups)
    }

    async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.check_online()?;
        let resources = newest_first(&self.state.lock().unwrap().resources, |r| r.created_at);
        self.pause_list().await;
        Ok(resources)
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        self.check_online()?;
        let event = event.into_event(EventId::new(), Utc::now());
        self.state.lock().unwrap().events.push(event.clone());
        Ok(event)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job> {
        self.check_online()?;
        let job = job.into_job(JobId::new(), Utc::now());
        self.state.lock().unwrap().jobs.push(job.clone());
        Ok(job)
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        self.check_online()?;
        let group = group.into_group(GroupId::new(), Utc::now());
        self.state.lock().unwrap().groups.push(group.clone());
        Ok(group)
    }

    async fn put_user(&self, profile: &UserProfile) -> Result<()> {
        self.check_online()?;
        self.state
            .lock()
            .unwrap()
            .users
            .insert(profile.email.clone(), profile.clone());
        Ok(())
    }

    async fn get_user(&self, email: &Email) -> Result<Option<UserProfile>> {
        self.check_online()?;
        Ok(self.state.lock().unwrap().users.get(email).cloned())
    }

    async fn save_onboarding(
        &self,
        email: &Email,
        onboarding: &OnboardingProfile,
    ) -> Result<Option<UserProfile>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        Ok(state.users.get_mut(email).map(|profile| {
            profile.name = onboarding.name.clone();
            profile.onboarding = Some(onboarding.clone());
            profile.onboarding_completed = true;
            profile.clone()
        }))
    }

    async fn update_membership(
        &self,
        kind: MembershipKind,
        entity_id: Uuid,
        user_id: &Email,
        want_join: bool,
    ) -> Result<MembershipUpdate, MembershipError> {
        self.membership_calls.lock().unwrap().push(MembershipCall {
            kind,
            entity_id,
            user_id: user_id.to_string(),
            want_join,
        });

        self.check_online()?;
        if self.reject_membership.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("permission denied").into());
        }

        let update = {
            let mut state = self.state.lock().unwrap();
            match kind {
                MembershipKind::Event => apply_toggle(&mut state.events, entity_id, user_id.as_str(), want_join),
                MembershipKind::Job => apply_toggle(&mut state.jobs, entity_id, user_id.as_str(), want_join),
                MembershipKind::Group => apply_toggle(&mut state.groups, entity_id, user_id.as_str(), want_join),
            }
        };

        let delay = self.membership_delays.lock().unwrap().remove(user_id.as_str());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        update
    }
}

// =============================================================================
// Mock Auth Provider
// =============================================================================

pub struct MockAuthProvider {
    accounts: Mutex<HashMap<Email, String>>,
    offline: AtomicBool,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Pre-register an account
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let email = Email::parse(email).unwrap();
        self.accounts
            .lock()
            .unwrap()
            .insert(email, password.to_string());
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn has_account(&self, email: &str) -> bool {
        Email::parse(email)
            .map(|email| self.accounts.lock().unwrap().contains_key(&email))
            .unwrap_or(false)
    }

    fn check_online(&self) -> Result<(), AuthProviderError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("auth provider unavailable").into());
        }
        Ok(())
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn identity(email: &Email) -> AuthIdentity {
    AuthIdentity {
        email: email.clone(),
        provider_uid: format!("uid-{}", email),
    }
}

#[async_trait]
impl BaseAuthProvider for MockAuthProvider {
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthIdentity, AuthProviderError> {
        self.check_online()?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthProviderError::WeakPassword(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthProviderError::EmailExists);
        }
        accounts.insert(email.clone(), password.to_string());
        Ok(identity(email))
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthIdentity, AuthProviderError> {
        self.check_online()?;
        match self.accounts.lock().unwrap().get(email) {
            Some(stored) if stored == password => Ok(identity(email)),
            _ => Err(AuthProviderError::InvalidCredentials),
        }
    }
}

// =============================================================================
// Recording Notifier
// =============================================================================

pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.with_level(NoticeLevel::Success)
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_level(NoticeLevel::Error)
    }

    fn with_level(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseNotifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn fixture_email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Event whose attendee count matches `attendee_ids`
pub fn event_fixture(title: &str, capacity: i32, attendee_ids: &[&str]) -> Event {
    Event {
        id: EventId::new(),
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
        time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        capacity,
        attendees: attendee_ids.len() as i32,
        attendee_ids: ids(attendee_ids),
        membership_version: 0,
        style: LearningStyle::Visual,
        mode: Mode::Virtual,
        location: None,
        organizer: "Universidad Central".to_string(),
        organizer_email: fixture_email("events@uni.edu"),
        status: EventStatus::Published,
        created_at: Utc::now(),
    }
}

pub fn job_fixture(title: &str, applicant_ids: &[&str]) -> Job {
    let now = Utc::now();
    Job {
        id: JobId::new(),
        title: title.to_string(),
        company: "Acme".to_string(),
        company_email: fixture_email("hr@acme.com"),
        job_type: JobType::Internship,
        location: "Remote".to_string(),
        description: "Help the data team".to_string(),
        style: LearningStyle::Auditory,
        status: JobStatus::Active,
        applicants: applicant_ids.len() as i32,
        applicant_ids: ids(applicant_ids),
        membership_version: 0,
        posted_date: now.date_naive(),
        created_at: now,
    }
}

pub fn group_fixture(name: &str, max_members: i32, member_ids: &[&str]) -> Group {
    Group {
        id: GroupId::new(),
        name: name.to_string(),
        max_members,
        members: member_ids.len() as i32,
        member_ids: ids(member_ids),
        membership_version: 0,
        style: LearningStyle::Kinesthetic,
        mode: Mode::Hybrid,
        location: None,
        schedule: "Fridays 17:00".to_string(),
        topics: ids(&["algebra"]),
        created_by: fixture_email(member_ids.first().copied().unwrap_or("owner@uni.edu")),
        created_at: Utc::now(),
    }
}

pub fn resource_fixture(title: &str, age_days: i64) -> Resource {
    Resource {
        id: ResourceId::new(),
        title: title.to_string(),
        resource_type: "video".to_string(),
        style: LearningStyle::Visual,
        url: Some("https://learn.example.org/v/1".to_string()),
        description: None,
        created_at: Utc::now() - Duration::days(age_days),
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test_secret_key";

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<InMemoryDocumentStore>,
    pub auth: Arc<MockAuthProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub jwt_service: Arc<JwtService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            auth: Arc::new(MockAuthProvider::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            jwt_service: Arc::new(JwtService::new(TEST_JWT_SECRET, "mindsync".to_string())),
        }
    }

    /// Set a pre-seeded in-memory store
    pub fn mock_store(mut self, store: InMemoryDocumentStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Set a mock auth provider with existing accounts
    pub fn mock_auth(mut self, auth: MockAuthProvider) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.auth.clone(),
            self.notifier.clone(),
            self.jwt_service.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
