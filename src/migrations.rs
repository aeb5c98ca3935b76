use deadpool_postgres::Pool;
use log::info;
use tokio_postgres::Transaction;

pub struct MigrationManager;

impl MigrationManager {
    pub async fn run_migrations(
        pool: &Pool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Running database migrations...");
        let mut client = pool.get().await?;

        // check if migrations table exists and create if not
        let needs_init = client
            .query_opt(
                "SELECT 1 FROM pg_tables WHERE schemaname = 'public' AND tablename = 'schema_migrations'",
                &[],
            )
            .await?
            .is_none();

        if needs_init {
            // first time setup - create everything in a single transaction
            let transaction = client.transaction().await?;
            Self::initial_setup(&transaction).await?;
            transaction.commit().await?;
            info!("Initial database setup completed");
        }

        // check if we need to run any new migrations (always check, even after initial setup)
        let current_version = Self::get_current_version(&client).await?;
        if current_version < Self::latest_version() {
            let transaction = client.transaction().await?;
            Self::run_pending_migrations(&transaction, current_version).await?;
            transaction.commit().await?;
            info!("Database migrations completed");
        } else {
            info!("Database schema is up to date");
        }

        Ok(())
    }

    async fn initial_setup(
        transaction: &Transaction<'_>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let migration_sql = r#"
            -- Migration tracking table
            CREATE TABLE schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            );

            -- Users table
            CREATE TABLE users (
                id SERIAL PRIMARY KEY,
                telegram_user_id BIGINT NOT NULL UNIQUE,
                username VARCHAR(255),
                first_name VARCHAR(255),
                balance DOUBLE PRECISION NOT NULL DEFAULT 0,
                total_spent DOUBLE PRECISION NOT NULL DEFAULT 0,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            );

            CREATE INDEX idx_users_telegram_id ON users(telegram_user_id);
            CREATE INDEX idx_users_created ON users(created_at);

            -- Record initial migration
            INSERT INTO schema_migrations (version) VALUES (1);
        "#;

        transaction.batch_execute(migration_sql).await?;
        Ok(())
    }

    async fn get_current_version(
        client: &deadpool_postgres::Object,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let row = client
            .query_one("SELECT MAX(version) FROM schema_migrations", &[])
            .await?;
        Ok(row.get::<_, Option<i32>>(0).unwrap_or(0))
    }

    fn latest_version() -> i32 {
        1 // increment this when adding new migrations
    }

    async fn run_pending_migrations(
        transaction: &Transaction<'_>,
        current_version: i32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for version in (current_version + 1)..=Self::latest_version() {
            transaction
                .execute(
                    "INSERT INTO schema_migrations (version) VALUES ($1)",
                    &[&version],
                )
                .await?;
        }
        Ok(())
    }
}
