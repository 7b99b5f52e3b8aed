use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::errors::CatalogError;
use crate::common::{Email, EventId, GroupId, JobId};
use crate::domains::auth::models::Creator;
use crate::domains::events::models::{CreateEventInput, Event};
use crate::domains::groups::models::{CreateGroupInput, Group};
use crate::domains::jobs::models::{CreateJobInput, Job};
use crate::domains::membership::{
    Membered, MembershipChange, MembershipError, MembershipKind, MembershipUpdate,
};
use crate::domains::resources::models::Resource;
use crate::kernel::{BaseDocumentStore, BaseNotifier};

#[derive(Debug, Default)]
struct CatalogState {
    events: Vec<Event>,
    jobs: Vec<Job>,
    groups: Vec<Group>,
    resources: Vec<Resource>,
    loaded: bool,
    /// Bumped by every local write; lets a load notice it raced one
    generation: u64,
}

/// Collection sizes shown on the dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub events: usize,
    pub jobs: usize,
    pub groups: usize,
    pub resources: usize,
}

/// In-memory catalog of events, jobs, groups and resources.
///
/// Collections are ordered newest first. The state lock is only taken after
/// a store call has returned.
pub struct Catalog {
    store: Arc<dyn BaseDocumentStore>,
    notifier: Arc<dyn BaseNotifier>,
    state: RwLock<CatalogState>,
}

impl Catalog {
    pub fn new(store: Arc<dyn BaseDocumentStore>, notifier: Arc<dyn BaseNotifier>) -> Self {
        Self {
            store,
            notifier,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Fetch all four collections concurrently and replace the local copies.
    ///
    /// On failure the previous collections are kept. If a toggle or a publish
    /// landed locally while the fetch was in flight, the fetched lists are
    /// merged instead: entities added meanwhile are kept, and so is any local
    /// membership snapshot newer than the fetched one.
    pub async fn load(&self) -> Result<(), CatalogError> {
        let generation = self.state.read().await.generation;

        let fetched = tokio::try_join!(
            self.store.list_events(),
            self.store.list_jobs(),
            self.store.list_groups(),
            self.store.list_resources(),
        );

        let (events, jobs, groups, resources) = match fetched {
            Ok(collections) => collections,
            Err(e) => {
                error!(error = %e, "Failed to load catalog");
                self.notifier.error("Could not load data");
                return Err(CatalogError::Load(e));
            }
        };

        info!(
            events = events.len(),
            jobs = jobs.len(),
            groups = groups.len(),
            resources = resources.len(),
            "Catalog loaded"
        );

        let mut state = self.state.write().await;
        if state.generation == generation {
            state.events = events;
            state.jobs = jobs;
            state.groups = groups;
        } else {
            debug!("Catalog changed during load; merging fetched collections");
            let local = std::mem::take(&mut state.events);
            state.events = merge_fetched(local, events);
            let local = std::mem::take(&mut state.jobs);
            state.jobs = merge_fetched(local, jobs);
            let local = std::mem::take(&mut state.groups);
            state.groups = merge_fetched(local, groups);
        }
        state.resources = resources;
        state.loaded = true;
        state.generation += 1;

        Ok(())
    }

    pub async fn refresh(&self) -> Result<(), CatalogError> {
        self.load().await
    }

    pub async fn add_event(
        &self,
        input: CreateEventInput,
        creator: &Creator,
    ) -> Result<Event, CatalogError> {
        let new_event = input.validate(creator)?;

        let event = self.store.create_event(new_event).await.map_err(|e| {
            error!(error = %e, organizer = %creator.email, "Failed to create event");
            self.notifier.error("Could not publish the event");
            CatalogError::Store(e)
        })?;

        info!(event_id = %event.id, title = %event.title, "Event published");
        {
            let mut state = self.state.write().await;
            state.events.insert(0, event.clone());
            state.generation += 1;
        }
        self.notifier.success("Event published");

        Ok(event)
    }

    pub async fn add_job(
        &self,
        input: CreateJobInput,
        creator: &Creator,
    ) -> Result<Job, CatalogError> {
        let new_job = input.validate(creator)?;

        let job = self.store.create_job(new_job).await.map_err(|e| {
            error!(error = %e, company = %creator.email, "Failed to create job");
            self.notifier.error("Could not publish the job");
            CatalogError::Store(e)
        })?;

        info!(job_id = %job.id, title = %job.title, "Job published");
        {
            let mut state = self.state.write().await;
            state.jobs.insert(0, job.clone());
            state.generation += 1;
        }
        self.notifier.success("Job published");

        Ok(job)
    }

    pub async fn add_group(
        &self,
        input: CreateGroupInput,
        creator: &Creator,
    ) -> Result<Group, CatalogError> {
        let new_group = input.validate(creator)?;

        let group = self.store.create_group(new_group).await.map_err(|e| {
            error!(error = %e, created_by = %creator.email, "Failed to create group");
            self.notifier.error("Could not create the group");
            CatalogError::Store(e)
        })?;

        info!(group_id = %group.id, name = %group.name, "Group created");
        {
            let mut state = self.state.write().await;
            state.groups.insert(0, group.clone());
            state.generation += 1;
        }
        self.notifier.success("Group created");

        Ok(group)
    }

    /// Join or leave remotely, then mirror the confirmed change locally.
    ///
    /// Local state is untouched when the store call fails.
    pub async fn try_toggle_membership(
        &self,
        kind: MembershipKind,
        entity_id: Uuid,
        user_id: &Email,
        want_join: bool,
    ) -> Result<MembershipChange, MembershipError> {
        let update = self
            .store
            .update_membership(kind, entity_id, user_id, want_join)
            .await
            .map_err(|e| {
                error!(%kind, %entity_id, user_id = %user_id, want_join, error = %e, "Membership toggle failed");
                e
            })?;

        let mut state = self.state.write().await;
        match kind {
            MembershipKind::Event => mirror(&mut state.events, entity_id, user_id, want_join, &update),
            MembershipKind::Job => mirror(&mut state.jobs, entity_id, user_id, want_join, &update),
            MembershipKind::Group => mirror(&mut state.groups, entity_id, user_id, want_join, &update),
        }
        state.generation += 1;

        debug!(%kind, %entity_id, user_id = %user_id, change = ?update.change, "Membership toggled");
        Ok(update.change)
    }

    /// Same as [`Catalog::try_toggle_membership`], reporting only success.
    pub async fn toggle_membership(
        &self,
        kind: MembershipKind,
        entity_id: Uuid,
        user_id: &Email,
        want_join: bool,
    ) -> bool {
        self.try_toggle_membership(kind, entity_id, user_id, want_join)
            .await
            .is_ok()
    }

    pub async fn events(&self) -> Vec<Event> {
        self.state.read().await.events.clone()
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.state.read().await.jobs.clone()
    }

    pub async fn groups(&self) -> Vec<Group> {
        self.state.read().await.groups.clone()
    }

    pub async fn resources(&self) -> Vec<Resource> {
        self.state.read().await.resources.clone()
    }

    pub async fn event(&self, id: EventId) -> Option<Event> {
        self.state.read().await.events.iter().find(|e| e.id == id).cloned()
    }

    pub async fn job(&self, id: JobId) -> Option<Job> {
        self.state.read().await.jobs.iter().find(|j| j.id == id).cloned()
    }

    pub async fn group(&self, id: GroupId) -> Option<Group> {
        self.state.read().await.groups.iter().find(|g| g.id == id).cloned()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn summary(&self) -> CatalogSummary {
        let state = self.state.read().await;
        CatalogSummary {
            events: state.events.len(),
            jobs: state.jobs.len(),
            groups: state.groups.len(),
            resources: state.resources.len(),
        }
    }
}

/// Apply a confirmed toggle to the local copy of one entity.
///
/// Replies can arrive out of order, so the store's snapshot is adopted only
/// when its version is newer than the local one. An older or equal snapshot
/// is already covered by what the catalog holds.
fn mirror<T: Membered>(
    items: &mut [T],
    entity_id: Uuid,
    user_id: &Email,
    want_join: bool,
    update: &MembershipUpdate,
) {
    let Some(item) = items.iter_mut().find(|item| item.entity_id() == entity_id) else {
        debug!(kind = %T::KIND, %entity_id, "Toggled entity not in local catalog");
        return;
    };

    let local_version = item.membership_version();
    if update.version <= local_version {
        debug!(
            kind = %T::KIND,
            %entity_id,
            local_version,
            store_version = update.version,
            "Ignoring stale membership snapshot"
        );
        return;
    }

    if update.version == local_version + 1 && !update.change.is_noop() {
        // Nothing else changed in between, so replaying the delta must agree.
        // Capacity was enforced by the store.
        let replayed = item
            .membership()
            .toggle(user_id.as_str(), want_join, None)
            .ok()
            .map(|(membership, _)| membership);
        if replayed.as_ref() != Some(&update.membership) {
            warn!(
                kind = %T::KIND,
                %entity_id,
                store_count = update.membership.count,
                "Local catalog out of step with store; adopting store snapshot"
            );
        }
    } else {
        debug!(
            kind = %T::KIND,
            %entity_id,
            local_version,
            store_version = update.version,
            "Catalog behind store; adopting newer snapshot"
        );
    }

    item.set_membership(update.membership.clone(), update.version);
}

/// Fold freshly fetched entities into a local list that changed mid-fetch.
///
/// Local-only entities were published after the fetch started and stay in
/// front. For the rest the newer membership snapshot wins.
fn merge_fetched<T: Membered>(local: Vec<T>, fetched: Vec<T>) -> Vec<T> {
    let (mut merged, known): (Vec<T>, Vec<T>) = local.into_iter().partition(|item| {
        !fetched
            .iter()
            .any(|other| other.entity_id() == item.entity_id())
    });

    for mut item in fetched {
        let newer = known.iter().find(|local| {
            local.entity_id() == item.entity_id()
                && local.membership_version() > item.membership_version()
        });
        if let Some(newer) = newer {
            item.set_membership(newer.membership(), newer.membership_version());
        }
        merged.push(item);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{
        event_fixture, group_fixture, job_fixture, resource_fixture,
    };
    use crate::kernel::{InMemoryDocumentStore, RecordingNotifier};
    use crate::common::{LearningStyle, Mode};
    use std::time::Duration;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    async fn catalog_with(store: InMemoryDocumentStore) -> (Catalog, Arc<InMemoryDocumentStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::new());
        let catalog = Catalog::new(store.clone(), notifier.clone());
        catalog.load().await.unwrap();
        (catalog, store, notifier)
    }

    #[tokio::test]
    async fn test_group_join_mirrors_store() {
        let group = group_fixture("Calculus", 5, &["a@x.com", "b@x.com"]);
        let id = group.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_group(group)).await;

        let ok = catalog
            .toggle_membership(MembershipKind::Group, id.into_uuid(), &email("c@x.com"), true)
            .await;

        assert!(ok);
        let local = catalog.group(id).await.unwrap();
        assert_eq!(local.members, 3);
        assert_eq!(local.member_ids, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert_eq!(store.group(id).unwrap(), local);
    }

    #[tokio::test]
    async fn test_event_leave_mirrors_store() {
        let event = event_fixture("Fair", 10, &["a@x.com"]);
        let id = event.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_event(event)).await;

        let change = catalog
            .try_toggle_membership(MembershipKind::Event, id.into_uuid(), &email("a@x.com"), false)
            .await
            .unwrap();

        assert_eq!(change, MembershipChange::Left);
        let local = catalog.event(id).await.unwrap();
        assert_eq!(local.attendees, 0);
        assert!(local.attendee_ids.is_empty());
        assert_eq!(store.event(id).unwrap().attendees, 0);
    }

    #[tokio::test]
    async fn test_failed_store_call_leaves_local_state() {
        let job = job_fixture("Analyst", &[]);
        let id = job.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_job(job)).await;
        let before = catalog.job(id).await.unwrap();
        store.set_reject_membership(true);

        let ok = catalog
            .toggle_membership(MembershipKind::Job, id.into_uuid(), &email("u@x.com"), true)
            .await;

        assert!(!ok);
        assert_eq!(catalog.job(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_full_group_rejects_join() {
        let group = group_fixture("Full", 2, &["a@x.com", "b@x.com"]);
        let id = group.id;
        let (catalog, _, _) = catalog_with(InMemoryDocumentStore::new().with_group(group)).await;

        let err = catalog
            .try_toggle_membership(MembershipKind::Group, id.into_uuid(), &email("c@x.com"), true)
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::CapacityReached { capacity: 2, .. }));
        assert_eq!(catalog.group(id).await.unwrap().members, 2);
    }

    #[tokio::test]
    async fn test_drifted_local_copy_adopts_store_snapshot() {
        let group = group_fixture("Physics", 5, &["a@x.com"]);
        let id = group.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_group(group.clone())).await;

        // Someone else joined since the catalog was loaded
        let mut remote = group;
        remote.members = 2;
        remote.member_ids.push("b@x.com".to_string());
        store.replace_group(remote);

        catalog
            .try_toggle_membership(MembershipKind::Group, id.into_uuid(), &email("c@x.com"), true)
            .await
            .unwrap();

        let local = catalog.group(id).await.unwrap();
        assert_eq!(local.members, 3);
        assert_eq!(local.member_ids, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert_eq!(local, store.group(id).unwrap());
    }

    #[tokio::test]
    async fn test_late_reply_does_not_undo_newer_join() {
        let group = group_fixture("Chemistry", 5, &["owner@x.com"]);
        let id = group.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_group(group)).await;
        // a's join commits first but its reply only arrives after b's
        store.delay_membership_for("a@x.com", Duration::from_millis(200));

        let email_a = email("a@x.com");
        let (first, second) = tokio::join!(
            catalog.try_toggle_membership(MembershipKind::Group, id.into_uuid(), &email_a, true),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                catalog
                    .try_toggle_membership(MembershipKind::Group, id.into_uuid(), &email("b@x.com"), true)
                    .await
            },
        );

        assert_eq!(first.unwrap(), MembershipChange::Joined);
        assert_eq!(second.unwrap(), MembershipChange::Joined);
        let local = catalog.group(id).await.unwrap();
        assert_eq!(local.member_ids, vec!["owner@x.com", "a@x.com", "b@x.com"]);
        assert_eq!(local.members, 3);
        assert_eq!(local, store.group(id).unwrap());
    }

    #[tokio::test]
    async fn test_late_join_reply_does_not_undo_leave() {
        let event = event_fixture("Hackathon", 10, &[]);
        let id = event.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_event(event)).await;
        store.delay_membership_for("a@x.com", Duration::from_millis(200));
        let a = email("a@x.com");

        // The leave is sent after the join committed and answers first
        let (joined, left) = tokio::join!(
            catalog.try_toggle_membership(MembershipKind::Event, id.into_uuid(), &a, true),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                catalog
                    .try_toggle_membership(MembershipKind::Event, id.into_uuid(), &a, false)
                    .await
            },
        );

        assert_eq!(joined.unwrap(), MembershipChange::Joined);
        assert_eq!(left.unwrap(), MembershipChange::Left);
        let local = catalog.event(id).await.unwrap();
        assert!(local.attendee_ids.is_empty());
        assert_eq!(local.attendees, 0);
        assert_eq!(local, store.event(id).unwrap());
    }

    #[tokio::test]
    async fn test_refresh_keeps_toggle_made_during_fetch() {
        let group = group_fixture("Biology", 5, &["owner@x.com"]);
        let id = group.id;
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new().with_group(group)).await;
        // Refresh reads the store before the join, but returns after it
        store.set_list_delay(Duration::from_millis(200));

        let (refreshed, joined) = tokio::join!(catalog.refresh(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            catalog
                .try_toggle_membership(MembershipKind::Group, id.into_uuid(), &email("u@x.com"), true)
                .await
        });

        refreshed.unwrap();
        assert_eq!(joined.unwrap(), MembershipChange::Joined);
        let local = catalog.group(id).await.unwrap();
        assert_eq!(local.member_ids, vec!["owner@x.com", "u@x.com"]);
        assert_eq!(local, store.group(id).unwrap());
    }

    #[tokio::test]
    async fn test_refresh_keeps_group_published_during_fetch() {
        let (catalog, store, _) = catalog_with(InMemoryDocumentStore::new()).await;
        store.set_list_delay(Duration::from_millis(200));
        let creator = Creator {
            email: email("owner@x.com"),
            display_name: "Owner".to_string(),
        };
        let input = CreateGroupInput {
            name: "Statistics".to_string(),
            max_members: Some(4),
            style: LearningStyle::Visual,
            mode: Mode::Virtual,
            location: None,
            schedule: "Mondays 10:00".to_string(),
            topics: "probability".to_string(),
        };

        let (refreshed, created) = tokio::join!(catalog.refresh(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            catalog.add_group(input, &creator).await
        });

        refreshed.unwrap();
        let created = created.unwrap();
        assert_eq!(catalog.groups().await, vec![created]);
    }

    #[tokio::test]
    async fn test_load_orders_newest_first_and_keeps_data_on_failure() {
        let store = InMemoryDocumentStore::new()
            .with_resource(resource_fixture("Old", 3))
            .with_resource(resource_fixture("New", 0));
        let (catalog, store, notifier) = catalog_with(store).await;

        let titles: Vec<String> = catalog.resources().await.into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["New", "Old"]);

        store.set_offline(true);
        assert!(catalog.refresh().await.is_err());

        assert_eq!(catalog.summary().await.resources, 2);
        assert!(catalog.is_loaded().await);
        assert_eq!(notifier.errors(), vec!["Could not load data".to_string()]);
    }
}
