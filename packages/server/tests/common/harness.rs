//! Test harnesses for integration testing.
//!
//! `TestHarness` runs everything in memory with seeded fixtures.
//! `PostgresHarness` uses a shared testcontainers Postgres; the container and
//! migrations are initialized once on first use, then reused.

use anyhow::{Context, Result};
use mindsync_core::common::{Email, EventId, GroupId, JobId};
use mindsync_core::domains::auth::{UserProfile, UserRole};
use mindsync_core::domains::catalog::Catalog;
use mindsync_core::kernel::test_dependencies::{
    event_fixture, group_fixture, job_fixture, resource_fixture,
};
use mindsync_core::kernel::{
    InMemoryDocumentStore, MockAuthProvider, PostgresDocumentStore, TestDependencies,
};
use mindsync_core::server::middleware::AuthUser;
use mindsync_core::server::AppState;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::GraphQLClient;

pub const PASSWORD: &str = "secret1";
pub const STUDENT: &str = "ana@uni.edu";
pub const UNIVERSITY: &str = "admisiones@central.edu";
pub const COMPANY: &str = "talent@acme.com";
/// Profile that only has the legacy role field
pub const LEGACY_STUDENT: &str = "luis@uni.edu";
/// Profile with no recognizable role at all
pub const ROLELESS: &str = "ghost@uni.edu";
pub const GROUP_OWNER: &str = "owner@uni.edu";

fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

fn profile(raw: &str, name: &str, role: UserRole, institution: Option<&str>) -> UserProfile {
    UserProfile::registered(
        email(raw),
        name.to_string(),
        role,
        institution.map(str::to_string),
    )
}

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// In-memory harness
// =============================================================================

/// Ids of the seeded catalog entries
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    /// Capacity 2, nobody registered
    pub event_id: EventId,
    /// No applicants
    pub job_id: JobId,
    /// Capacity 3, owned by GROUP_OWNER
    pub group_id: GroupId,
}

/// In-memory test harness.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let client = ctx.graphql_as(STUDENT, UserRole::Student);
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub deps: TestDependencies,
    pub catalog: Arc<Catalog>,
    pub seed: Seed,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        init_tracing();

        let event = event_fixture("Open house", 2, &[]);
        let job = job_fixture("Data intern", &[]);
        let group = group_fixture("Calculus crew", 3, &[GROUP_OWNER]);
        let seed = Seed {
            event_id: event.id,
            job_id: job.id,
            group_id: group.id,
        };

        let mut legacy = profile(LEGACY_STUDENT, "Luis", UserRole::Student, None);
        legacy.user_type = None;
        legacy.legacy_role = Some(UserRole::Student);
        legacy.onboarding_completed = true;

        let mut roleless = profile(ROLELESS, "Ghost", UserRole::Student, None);
        roleless.user_type = None;

        let store = InMemoryDocumentStore::new()
            .with_event(event)
            .with_job(job)
            .with_group(group)
            .with_resource(resource_fixture("Mind maps", 0))
            .with_user(profile(STUDENT, "Ana", UserRole::Student, None))
            .with_user(profile(
                UNIVERSITY,
                "Marta",
                UserRole::University,
                Some("Universidad Central"),
            ))
            .with_user(profile(COMPANY, "Tomas", UserRole::Company, Some("Acme")))
            .with_user(legacy)
            .with_user(roleless);

        let auth = MockAuthProvider::new()
            .with_account(STUDENT, PASSWORD)
            .with_account(UNIVERSITY, PASSWORD)
            .with_account(COMPANY, PASSWORD)
            .with_account(LEGACY_STUDENT, PASSWORD)
            .with_account(ROLELESS, PASSWORD);

        let deps = TestDependencies::new().mock_store(store).mock_auth(auth);
        let catalog = Arc::new(Catalog::new(deps.store.clone(), deps.notifier.clone()));
        catalog.load().await.context("Failed to load seeded catalog")?;
        deps.notifier.clear();

        Ok(Self {
            deps,
            catalog,
            seed,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.deps.server_deps(), self.catalog.clone())
    }

    /// GraphQL client without an authenticated user
    pub fn graphql(&self) -> GraphQLClient {
        GraphQLClient::new(self.app_state(), None)
    }

    /// GraphQL client acting as the given user
    pub fn graphql_as(&self, user: &str, role: UserRole) -> GraphQLClient {
        let auth_user = AuthUser {
            email: email(user),
            role,
        };
        GraphQLClient::new(self.app_state(), Some(auth_user))
    }
}

// =============================================================================
// Postgres harness
// =============================================================================

/// Shared test infrastructure that persists across all tests.
struct SharedPostgres {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

impl SharedPostgres {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_POSTGRES
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared Postgres")
            })
            .await
    }
}

/// Harness around the Postgres store.
///
/// The database is shared by every test, so tests must only assert on rows
/// they created themselves.
pub struct PostgresHarness {
    pub db_pool: PgPool,
    pub store: Arc<PostgresDocumentStore>,
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        let shared = SharedPostgres::get().await;
        let db_pool = PgPool::connect(&shared.db_url)
            .await
            .expect("Failed to connect to shared Postgres");

        Self {
            store: Arc::new(PostgresDocumentStore::new(db_pool.clone())),
            db_pool,
        }
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

/// Email unique to one test run, so shared-database tests do not collide
pub fn unique_email(prefix: &str) -> Email {
    email(&format!(
        "{}-{}@test.edu",
        prefix,
        uuid::Uuid::now_v7().simple()
    ))
}
