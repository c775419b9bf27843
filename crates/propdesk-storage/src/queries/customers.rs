// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer queries.
//!
//! Customers are unique on `(platform, external_id)`. [`upsert_customer`]
//! inserts with `ON CONFLICT DO NOTHING` and reads the row back inside the
//! same writer call, so two webhook requests for a new sender still end up
//! with one customer.

use propdesk_core::PropdeskError;
use propdesk_core::types::{Customer, NewCustomer};
use rusqlite::{Connection, Row, params};
use serde_json::Value;

use super::{json_col, to_json};
use crate::database::Database;

/// Lead score every new customer starts with.
pub const DEFAULT_LEAD_SCORE: u8 = 50;

const COLUMNS: &str = "id, company_id, platform, external_id, display_name, contact_handle, \
                       source, lead_score, tags, preferences, status, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        company_id: row.get(1)?,
        platform: row.get(2)?,
        external_id: row.get(3)?,
        display_name: row.get(4)?,
        contact_handle: row.get(5)?,
        source: row.get(6)?,
        lead_score: row.get(7)?,
        tags: json_col(row, 8)?,
        preferences: json_col(row, 9)?,
        status: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn select_by_external(
    conn: &Connection,
    platform: &str,
    external_id: &str,
) -> rusqlite::Result<Option<Customer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM customers WHERE platform = ?1 AND external_id = ?2"
    ))?;
    match stmt.query_row(params![platform, external_id], from_row) {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Look up a customer by platform identity.
pub async fn get_customer_by_external(
    db: &Database,
    platform: &str,
    external_id: &str,
) -> Result<Option<Customer>, PropdeskError> {
    let platform = platform.to_string();
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| select_by_external(conn, &platform, &external_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert the customer if the platform identity is new and return the stored row.
///
/// New rows get the default lead score, a `<platform>-lead` tag, empty
/// preferences and `source = platform`. An existing row is returned untouched.
pub async fn upsert_customer(
    db: &Database,
    customer: NewCustomer,
) -> Result<Customer, PropdeskError> {
    let id = super::new_id();
    let now = super::now();
    let tags = to_json(&vec![format!("{}-lead", customer.platform)]);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO customers (id, company_id, platform, external_id, display_name,
                     contact_handle, source, lead_score, tags, preferences, status,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?3, ?7, ?8, '{}', 'active', ?9, ?9)
                 ON CONFLICT(platform, external_id) DO NOTHING",
                params![
                    id,
                    customer.company_id,
                    customer.platform,
                    customer.external_id,
                    customer.display_name,
                    customer.contact_handle,
                    DEFAULT_LEAD_SCORE,
                    tags,
                    now,
                ],
            )?;
            select_by_external(conn, &customer.platform, &customer.external_id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store the latest extracted preferences and lead score.
pub async fn update_customer_profile(
    db: &Database,
    customer_id: &str,
    preferences: &Value,
    lead_score: u8,
) -> Result<(), PropdeskError> {
    let key = customer_id.to_string();
    let preferences = to_json(preferences);
    let now = super::now();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE customers SET preferences = ?1, lead_score = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![preferences, lead_score, now, key],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(PropdeskError::NotFound {
            entity: "customer",
            id: customer_id.to_string(),
        });
    }
    Ok(())
}

/// List customers, most recently updated first.
pub async fn list_customers(db: &Database) -> Result<Vec<Customer>, PropdeskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM customers ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
