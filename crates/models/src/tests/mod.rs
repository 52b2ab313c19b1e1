
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// DB tests need a reachable Postgres; they are skipped without `DATABASE_URL` or with `SKIP_DB_TESTS`.
pub(crate) fn db_tests_disabled() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}

/// Setup test database with migrations
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    MIGRATED
        .get_or_init(|| async {
            let db = crate::db::connect().await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
        })
        .await;
    crate::db::connect().await
}
