// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation queries.

use propdesk_core::PropdeskError;
use propdesk_core::types::Conversation;
use rusqlite::{Connection, Row, params};
use serde_json::Value;

use super::{json_col, to_json};
use crate::database::Database;

const COLUMNS: &str = "id, customer_id, platform, platform_conversation_id, status, \
                       last_message_at, metadata, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        platform: row.get(2)?,
        platform_conversation_id: row.get(3)?,
        status: row.get(4)?,
        last_message_at: row.get(5)?,
        metadata: json_col(row, 6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn select_one(
    conn: &Connection,
    filter: &str,
    args: &[&str],
) -> rusqlite::Result<Option<Conversation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM conversations WHERE {filter}"
    ))?;
    match stmt.query_row(rusqlite::params_from_iter(args.iter()), from_row) {
        Ok(conversation) => Ok(Some(conversation)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Insert the thread if it is new and return the stored row.
pub async fn upsert_conversation(
    db: &Database,
    customer_id: &str,
    platform: &str,
    platform_conversation_id: &str,
) -> Result<Conversation, PropdeskError> {
    let id = super::new_id();
    let now = super::now();
    let customer_id = customer_id.to_string();
    let platform = platform.to_string();
    let thread = platform_conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, customer_id, platform, platform_conversation_id,
                     status, last_message_at, metadata, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 'active', ?5, '{}', ?5, ?5)
                 ON CONFLICT(customer_id, platform, platform_conversation_id) DO NOTHING",
                params![id, customer_id, platform, thread, now],
            )?;
            select_one(
                conn,
                "customer_id = ?1 AND platform = ?2 AND platform_conversation_id = ?3",
                &[customer_id.as_str(), platform.as_str(), thread.as_str()],
            )?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, PropdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_one(conn, "id = ?1", &[id.as_str()]))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace the metadata document and bump `last_message_at`.
pub async fn update_conversation_activity(
    db: &Database,
    id: &str,
    metadata: &Value,
    last_message_at: &str,
) -> Result<(), PropdeskError> {
    let key = id.to_string();
    let metadata = to_json(metadata);
    let last_message_at = last_message_at.to_string();
    let now = super::now();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET metadata = ?1, last_message_at = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![metadata, last_message_at, now, key],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(PropdeskError::NotFound {
            entity: "conversation",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// All threads of one customer, most recent activity first.
pub async fn list_conversations_for_customer(
    db: &Database,
    customer_id: &str,
) -> Result<Vec<Conversation>, PropdeskError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations WHERE customer_id = ?1
                 ORDER BY last_message_at DESC"
            ))?;
            let rows = stmt.query_map(params![customer_id], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
