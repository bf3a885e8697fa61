/// Schema migrations
///
/// Migration files live in `migrations/` at the workspace root and are embedded
/// at compile time with `sqlx::migrate!`. They create `users`, `startups` and
/// the `startup_founders` join table.
///
/// # Example
///
/// ```no_run
/// use cofound_shared::db::pool::{create_pool, DatabaseConfig};
/// use cofound_shared::db::migrations::{ensure_database_exists, run_migrations};
///
/// # async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
/// ensure_database_exists(url).await?;
/// let pool = create_pool(DatabaseConfig::from_url(url)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, migrate::Migrator, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// What the `_sqlx_migrations` table says about the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Successfully applied migrations
    pub applied_migrations: usize,

    /// Highest applied version
    pub latest_version: Option<i64>,

    /// Number of migrations embedded in this binary
    pub known_migrations: usize,
}

impl MigrationStatus {
    /// True once every embedded migration has been applied
    pub fn is_up_to_date(&self) -> bool {
        self.applied_migrations >= self.known_migrations
    }
}

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Number of up-migrations compiled into the binary
pub fn known_migration_count() -> usize {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .count()
}

/// Reads applied-migration bookkeeping from the database
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            known_migrations: known_migration_count(),
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version)
         FROM _sqlx_migrations
         WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
        known_migrations: known_migration_count(),
    })
}

/// Creates the database named in `database_url` when it is missing
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    info!("Checking if database exists");

    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
