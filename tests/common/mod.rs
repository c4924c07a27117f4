use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::env;

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://fieldforce_user@localhost:5432/fieldforce_test".to_string()
    });

    let db = Database::connect(&database_url).await?;

    // Idempotent; makes the suite self-sufficient on a fresh test database
    migration::Migrator::up(&db, None).await?;

    Ok(db)
}
