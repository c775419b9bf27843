// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `propdesk company` command implementation.
//!
//! Companies are tenants; new customers are attached to one according to
//! `crm.company_resolution`.

use propdesk_config::model::StorageConfig;
use propdesk_core::{Company, PropdeskError, StorageAdapter};
use propdesk_storage::SqliteStorage;

async fn open(config: &StorageConfig) -> Result<SqliteStorage, PropdeskError> {
    let storage = SqliteStorage::new(config.clone());
    storage.initialize().await?;
    Ok(storage)
}

/// Creates an active company and prints its id.
pub async fn run_add(config: &StorageConfig, name: &str) -> Result<Company, PropdeskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PropdeskError::Config("company name must not be empty".into()));
    }
    let storage = open(config).await?;
    let company = storage.create_company(name).await?;
    storage.close().await?;
    println!("{}  {}", company.id, company.name);
    Ok(company)
}

/// Prints every company, oldest first.
pub async fn run_list(config: &StorageConfig) -> Result<Vec<Company>, PropdeskError> {
    let storage = open(config).await?;
    let companies = storage.list_companies().await?;
    storage.close().await?;
    if companies.is_empty() {
        println!("no companies");
    }
    for company in &companies {
        println!(
            "{}  {:<8}  {}  {}",
            company.id, company.status, company.created_at, company.name
        );
    }
    Ok(companies)
}
