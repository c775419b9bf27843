// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Company queries.

use propdesk_core::PropdeskError;
use propdesk_core::types::Company;
use rusqlite::{Row, params};

use crate::database::Database;

const COLUMNS: &str = "id, name, status, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Create an active company.
pub async fn create_company(db: &Database, name: &str) -> Result<Company, PropdeskError> {
    let company = Company {
        id: super::new_id(),
        name: name.to_string(),
        status: "active".to_string(),
        created_at: super::now(),
    };
    let row = company.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO companies (id, name, status, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.name, row.status, row.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(company)
}

/// List all companies, oldest first.
pub async fn list_companies(db: &Database) -> Result<Vec<Company>, PropdeskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM companies ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The oldest active company, if any.
pub async fn first_active_company(db: &Database) -> Result<Option<Company>, PropdeskError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM companies WHERE status = 'active'
                 ORDER BY created_at ASC, rowid ASC LIMIT 1"
            ))?;
            match stmt.query_row([], from_row) {
                Ok(company) => Ok(Some(company)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Sets a company's status (`active` or `inactive`).
pub async fn set_company_status(
    db: &Database,
    id: &str,
    status: &str,
) -> Result<(), PropdeskError> {
    let key = id.to_string();
    let status = status.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE companies SET status = ?1 WHERE id = ?2",
                params![status, key],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(PropdeskError::NotFound {
            entity: "company",
            id: id.to_string(),
        });
    }
    Ok(())
}
