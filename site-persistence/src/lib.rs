pub mod connection;
pub mod entities;
pub mod repositories;

use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, DbErr};

use repositories::LocalStorageRepository;

pub struct DatabaseManager {
    connection: DatabaseConnection,
}

impl DatabaseManager {
    /// Opens `database_url` and applies pending migrations.
    pub async fn open(database_url: &str) -> Result<Self, DbErr> {
        let connection = connection::connect_and_migrate(database_url).await?;
        Ok(Self { connection })
    }

    /// Fresh migrated in-memory database; nothing outlives the process.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let connection = connection::connect_to_memory_database().await?;
        Migrator::up(&connection, None).await?;
        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn local_storage(&self) -> LocalStorageRepository {
        LocalStorageRepository::new(self.connection.clone())
    }
}
