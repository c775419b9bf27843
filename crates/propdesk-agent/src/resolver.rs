// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer and conversation resolution.
//!
//! Both lookups are upserts executed on the single storage writer, so two
//! concurrent first messages from the same person still produce one row.

use std::sync::Arc;

use propdesk_config::model::{CompanyResolutionMode, CrmConfig};
use propdesk_core::types::NewCustomer;
use propdesk_core::{Conversation, Customer, PropdeskError, Sender, StorageAdapter};
use tracing::{debug, info};

/// Policy for attaching a newly seen customer to a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyResolution {
    /// Always this company id.
    Fixed(String),
    /// The oldest active company, if any.
    FirstActive,
    /// Leave the customer unassigned.
    None,
}

impl CompanyResolution {
    /// Builds the policy from `[crm]`. Validation guarantees a company id
    /// when the mode is `fixed`; without one the policy degrades to `None`.
    pub fn from_config(crm: &CrmConfig) -> Self {
        match (crm.company_resolution, crm.default_company_id.as_deref()) {
            (CompanyResolutionMode::Fixed, Some(id)) => Self::Fixed(id.to_string()),
            (CompanyResolutionMode::Fixed, None) | (CompanyResolutionMode::None, _) => Self::None,
            (CompanyResolutionMode::FirstActive, _) => Self::FirstActive,
        }
    }

    /// Resolves the company id for a new customer.
    pub async fn resolve(
        &self,
        storage: &dyn StorageAdapter,
    ) -> Result<Option<String>, PropdeskError> {
        match self {
            Self::Fixed(id) => Ok(Some(id.clone())),
            Self::FirstActive => Ok(storage.first_active_company().await?.map(|c| c.id)),
            Self::None => Ok(None),
        }
    }
}

/// Finds or creates customers and conversations.
pub struct Resolver {
    storage: Arc<dyn StorageAdapter>,
    companies: CompanyResolution,
}

impl Resolver {
    pub fn new(storage: Arc<dyn StorageAdapter>, companies: CompanyResolution) -> Self {
        Self { storage, companies }
    }

    /// Returns the customer for `(platform, sender.external_id)`, creating it
    /// on first contact.
    ///
    /// Existing customers skip the company lookup; the upsert itself keeps the
    /// stored row when two first messages race.
    pub async fn find_or_create_customer(
        &self,
        platform: &str,
        sender: &Sender,
    ) -> Result<Customer, PropdeskError> {
        if let Some(existing) = self
            .storage
            .get_customer_by_external(platform, &sender.external_id)
            .await?
        {
            debug!(customer_id = %existing.id, "known customer");
            return Ok(existing);
        }

        let company_id = self.companies.resolve(self.storage.as_ref()).await?;
        let customer = self
            .storage
            .upsert_customer(NewCustomer {
                platform: platform.to_string(),
                external_id: sender.external_id.clone(),
                display_name: sender.display_name.clone(),
                contact_handle: sender.username.clone(),
                company_id,
            })
            .await?;
        info!(
            customer_id = %customer.id,
            platform,
            company_id = customer.company_id.as_deref().unwrap_or("-"),
            "new customer"
        );
        Ok(customer)
    }

    /// Returns the conversation for `(customer, platform, thread)`, creating
    /// it if needed.
    pub async fn find_or_create_conversation(
        &self,
        customer_id: &str,
        platform: &str,
        thread_id: &str,
    ) -> Result<Conversation, PropdeskError> {
        let conversation = self
            .storage
            .upsert_conversation(customer_id, platform, thread_id)
            .await?;
        debug!(conversation_id = %conversation.id, customer_id, "conversation resolved");
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdesk_core::types::PLATFORM_TELEGRAM;
    use propdesk_storage::{Database, SqliteStorage};

    async fn storage() -> Arc<dyn StorageAdapter> {
        let db = Database::open_in_memory().await.unwrap();
        Arc::new(SqliteStorage::from_database(db))
    }

    fn sender(id: &str) -> Sender {
        Sender {
            external_id: id.to_string(),
            display_name: "Asha Rao".to_string(),
            username: Some("asha".to_string()),
        }
    }

    #[test]
    fn policy_from_config() {
        let mut crm = CrmConfig::default();
        assert_eq!(CompanyResolution::from_config(&crm), CompanyResolution::FirstActive);

        crm.company_resolution = CompanyResolutionMode::Fixed;
        crm.default_company_id = Some("c-1".into());
        assert_eq!(
            CompanyResolution::from_config(&crm),
            CompanyResolution::Fixed("c-1".into())
        );

        crm.company_resolution = CompanyResolutionMode::None;
        assert_eq!(CompanyResolution::from_config(&crm), CompanyResolution::None);
    }

    #[tokio::test]
    async fn new_customer_gets_defaults_and_first_active_company() {
        let storage = storage().await;
        let older = storage.create_company("Acme Realty").await.unwrap();
        storage.create_company("Beta Homes").await.unwrap();

        let resolver = Resolver::new(storage.clone(), CompanyResolution::FirstActive);
        let customer = resolver
            .find_or_create_customer(PLATFORM_TELEGRAM, &sender("42"))
            .await
            .unwrap();

        assert_eq!(customer.company_id.as_deref(), Some(older.id.as_str()));
        assert_eq!(customer.lead_score, 50);
        assert_eq!(customer.tags, vec!["telegram-lead".to_string()]);
        assert_eq!(customer.status, "active");
        assert_eq!(customer.source, "telegram");
        assert_eq!(customer.contact_handle.as_deref(), Some("asha"));
    }

    #[tokio::test]
    async fn repeated_resolution_returns_same_rows() {
        let storage = storage().await;
        let resolver = Resolver::new(storage.clone(), CompanyResolution::None);

        let first = resolver
            .find_or_create_customer(PLATFORM_TELEGRAM, &sender("42"))
            .await
            .unwrap();
        let second = resolver
            .find_or_create_customer(PLATFORM_TELEGRAM, &sender("42"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.company_id.is_none());

        let c1 = resolver
            .find_or_create_conversation(&first.id, PLATFORM_TELEGRAM, "42")
            .await
            .unwrap();
        let c2 = resolver
            .find_or_create_conversation(&first.id, PLATFORM_TELEGRAM, "42")
            .await
            .unwrap();
        assert_eq!(c1.id, c2.id);
        assert_eq!(c1.status, "active");
        assert_eq!(storage.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fixed_policy_uses_configured_company() {
        let storage = storage().await;
        let resolver = Resolver::new(storage, CompanyResolution::Fixed("tenant-9".into()));
        let customer = resolver
            .find_or_create_customer(PLATFORM_TELEGRAM, &sender("7"))
            .await
            .unwrap();
        assert_eq!(customer.company_id.as_deref(), Some("tenant-9"));
    }
}
