use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::entities::{local_storage, prelude::*};

/// Durable string key/value store, the desktop stand-in for browser
/// `localStorage`.
#[derive(Clone)]
pub struct LocalStorageRepository {
    db: DatabaseConnection,
}

impl LocalStorageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entry = LocalStorage::find_by_id(key.to_string())
            .one(&self.db)
            .await?;
        Ok(entry.map(|model| model.value))
    }

    /// Inserts or overwrites `key`.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let entry = local_storage::ActiveModel {
            key: sea_orm::ActiveValue::Set(key.to_string()),
            value: sea_orm::ActiveValue::Set(value.to_string()),
            updated_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        LocalStorage::insert(entry)
            .on_conflict(
                OnConflict::column(local_storage::Column::Key)
                    .update_columns([local_storage::Column::Value, local_storage::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!("Stored local storage key '{}'", key);
        Ok(())
    }

    /// Removing a missing key is not an error.
    pub async fn remove_item(&self, key: &str) -> Result<()> {
        let result = LocalStorage::delete_by_id(key.to_string())
            .exec(&self.db)
            .await?;
        tracing::debug!(
            "Removed local storage key '{}' ({} rows)",
            key,
            result.rows_affected
        );
        Ok(())
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        let entries = LocalStorage::find()
            .order_by_asc(local_storage::Column::Key)
            .all(&self.db)
            .await?;
        Ok(entries.into_iter().map(|model| model.key).collect())
    }
}
