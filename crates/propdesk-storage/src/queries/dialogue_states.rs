// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted dialogue state, one row per conversation.

use propdesk_core::PropdeskError;
use propdesk_core::types::DialogueStateRecord;
use rusqlite::params;

use super::{json_col, to_json};
use crate::database::Database;

/// Load the state row for a conversation.
pub async fn get_dialogue_state(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<DialogueStateRecord>, PropdeskError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT conversation_id, stage, preferences, customer_turns, updated_at
                 FROM dialogue_states WHERE conversation_id = ?1",
            )?;
            let result = stmt.query_row(params![conversation_id], |row| {
                Ok(DialogueStateRecord {
                    conversation_id: row.get(0)?,
                    stage: row.get(1)?,
                    preferences: json_col(row, 2)?,
                    customer_turns: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            });
            match result {
                Ok(state) => Ok(Some(state)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace the state row.
pub async fn save_dialogue_state(
    db: &Database,
    state: &DialogueStateRecord,
) -> Result<(), PropdeskError> {
    let state = state.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dialogue_states
                     (conversation_id, stage, preferences, customer_turns, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(conversation_id) DO UPDATE SET
                     stage = excluded.stage,
                     preferences = excluded.preferences,
                     customer_turns = excluded.customer_turns,
                     updated_at = excluded.updated_at",
                params![
                    state.conversation_id,
                    state.stage,
                    to_json(&state.preferences),
                    state.customer_turns,
                    state.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{memory_db, seed_conversation};

    #[tokio::test]
    async fn save_then_overwrite_state() {
        let db = memory_db().await;
        let (_, conv) = seed_conversation(&db, "3").await;
        assert!(get_dialogue_state(&db, &conv.id).await.unwrap().is_none());

        let mut state = DialogueStateRecord {
            conversation_id: conv.id.clone(),
            stage: "name_collection".to_string(),
            preferences: serde_json::json!({}),
            customer_turns: 1,
            updated_at: crate::queries::now(),
        };
        save_dialogue_state(&db, &state).await.unwrap();

        state.stage = "budget_collection".to_string();
        state.preferences = serde_json::json!({"property_type": "apartment"});
        state.customer_turns = 2;
        save_dialogue_state(&db, &state).await.unwrap();

        let stored = get_dialogue_state(&db, &conv.id).await.unwrap().unwrap();
        assert_eq!(stored, state);
    }
}
