// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead queries.
//!
//! Two insert paths exist: [`insert_lead`] always inserts (dialogue-flagged
//! leads) and [`insert_lead_if_no_active`] checks and inserts inside one
//! writer call (keyword leads). Nothing in the schema forbids a second active
//! lead; only the second path guards against it.

use propdesk_core::PropdeskError;
use propdesk_core::types::{Lead, NewLead};
use rusqlite::{Connection, Row, params};

use super::{enum_col, json_col, to_json};
use crate::database::Database;

const COLUMNS: &str = "id, customer_id, company_id, stage, score, requirements, notes, status, \
                       source, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        company_id: row.get(2)?,
        stage: enum_col(row, 3)?,
        score: row.get(4)?,
        requirements: json_col(row, 5)?,
        notes: row.get(6)?,
        status: row.get(7)?,
        source: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn build(lead: NewLead) -> Lead {
    let now = super::now();
    Lead {
        id: super::new_id(),
        customer_id: lead.customer_id,
        company_id: lead.company_id,
        stage: lead.stage,
        score: lead.score,
        requirements: lead.requirements,
        notes: lead.notes,
        status: "active".to_string(),
        source: lead.source,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn insert_row(conn: &Connection, lead: &Lead) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO leads (id, customer_id, company_id, stage, score, requirements, notes,
             status, source, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            lead.id,
            lead.customer_id,
            lead.company_id,
            lead.stage.to_string(),
            lead.score,
            to_json(&lead.requirements),
            lead.notes,
            lead.status,
            lead.source,
            lead.created_at,
            lead.updated_at,
        ],
    )?;
    Ok(())
}

fn select_active(conn: &Connection, customer_id: &str) -> rusqlite::Result<Option<Lead>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM leads WHERE customer_id = ?1 AND status = 'active'
         ORDER BY created_at DESC, rowid DESC LIMIT 1"
    ))?;
    match stmt.query_row(params![customer_id], from_row) {
        Ok(lead) => Ok(Some(lead)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Insert an active lead unconditionally.
pub async fn insert_lead(db: &Database, lead: NewLead) -> Result<Lead, PropdeskError> {
    let lead = build(lead);
    let row = lead.clone();
    db.connection()
        .call(move |conn| insert_row(conn, &row))
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(lead)
}

/// Insert an active lead unless the customer already has one.
///
/// Returns `None` when an active lead existed and nothing was written.
pub async fn insert_lead_if_no_active(
    db: &Database,
    lead: NewLead,
) -> Result<Option<Lead>, PropdeskError> {
    let lead = build(lead);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            if select_active(&tx, &lead.customer_id)?.is_some() {
                return Ok(None);
            }
            insert_row(&tx, &lead)?;
            tx.commit()?;
            Ok(Some(lead))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The customer's newest active lead.
pub async fn get_active_lead(
    db: &Database,
    customer_id: &str,
) -> Result<Option<Lead>, PropdeskError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| select_active(conn, &customer_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// All leads of one customer, oldest first.
pub async fn list_leads_for_customer(
    db: &Database,
    customer_id: &str,
) -> Result<Vec<Lead>, PropdeskError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM leads WHERE customer_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![customer_id], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
