// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use propdesk_config::model::StorageConfig;
use propdesk_core::types::{
    Company, Conversation, Customer, DialogueStateRecord, Lead, Message, NewCustomer, NewLead,
    NewMessage,
};
use propdesk_core::{AdapterType, HealthStatus, PluginAdapter, PropdeskError, StorageAdapter};

use crate::database::{self, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database, e.g. an in-memory one.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: ":memory:".to_string(),
                wal_mode: false,
            },
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, PropdeskError> {
        self.db.get().ok_or_else(|| PropdeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PropdeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PropdeskError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), PropdeskError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PropdeskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), PropdeskError> {
        database::checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn create_company(&self, name: &str) -> Result<Company, PropdeskError> {
        queries::companies::create_company(self.db()?, name).await
    }

    async fn list_companies(&self) -> Result<Vec<Company>, PropdeskError> {
        queries::companies::list_companies(self.db()?).await
    }

    async fn first_active_company(&self) -> Result<Option<Company>, PropdeskError> {
        queries::companies::first_active_company(self.db()?).await
    }

    async fn get_customer_by_external(
        &self,
        platform: &str,
        external_id: &str,
    ) -> Result<Option<Customer>, PropdeskError> {
        queries::customers::get_customer_by_external(self.db()?, platform, external_id).await
    }

    async fn upsert_customer(&self, customer: NewCustomer) -> Result<Customer, PropdeskError> {
        queries::customers::upsert_customer(self.db()?, customer).await
    }

    async fn update_customer_profile(
        &self,
        customer_id: &str,
        preferences: &Value,
        lead_score: u8,
    ) -> Result<(), PropdeskError> {
        queries::customers::update_customer_profile(self.db()?, customer_id, preferences, lead_score)
            .await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, PropdeskError> {
        queries::customers::list_customers(self.db()?).await
    }

    async fn upsert_conversation(
        &self,
        customer_id: &str,
        platform: &str,
        platform_conversation_id: &str,
    ) -> Result<Conversation, PropdeskError> {
        queries::conversations::upsert_conversation(
            self.db()?,
            customer_id,
            platform,
            platform_conversation_id,
        )
        .await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, PropdeskError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn update_conversation_activity(
        &self,
        id: &str,
        metadata: &Value,
        last_message_at: &str,
    ) -> Result<(), PropdeskError> {
        queries::conversations::update_conversation_activity(
            self.db()?,
            id,
            metadata,
            last_message_at,
        )
        .await
    }

    async fn list_conversations_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Conversation>, PropdeskError> {
        queries::conversations::list_conversations_for_customer(self.db()?, customer_id).await
    }

    async fn insert_message(&self, msg: NewMessage) -> Result<Message, PropdeskError> {
        queries::messages::insert_message(self.db()?, msg).await
    }

    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, PropdeskError> {
        queries::messages::get_messages(self.db()?, conversation_id, limit).await
    }

    async fn insert_lead(&self, lead: NewLead) -> Result<Lead, PropdeskError> {
        queries::leads::insert_lead(self.db()?, lead).await
    }

    async fn insert_lead_if_no_active(
        &self,
        lead: NewLead,
    ) -> Result<Option<Lead>, PropdeskError> {
        queries::leads::insert_lead_if_no_active(self.db()?, lead).await
    }

    async fn get_active_lead(&self, customer_id: &str) -> Result<Option<Lead>, PropdeskError> {
        queries::leads::get_active_lead(self.db()?, customer_id).await
    }

    async fn list_leads_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Lead>, PropdeskError> {
        queries::leads::list_leads_for_customer(self.db()?, customer_id).await
    }

    async fn get_dialogue_state(
        &self,
        conversation_id: &str,
    ) -> Result<Option<DialogueStateRecord>, PropdeskError> {
        queries::dialogue_states::get_dialogue_state(self.db()?, conversation_id).await
    }

    async fn save_dialogue_state(
        &self,
        state: &DialogueStateRecord,
    ) -> Result<(), PropdeskError> {
        queries::dialogue_states::save_dialogue_state(self.db()?, state).await
    }
}
