// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message queries. Messages are append-only.

use propdesk_core::PropdeskError;
use propdesk_core::types::{Message, NewMessage};
use rusqlite::{Row, params};

use super::{enum_col, json_col, to_json};
use crate::database::Database;

fn from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender: enum_col(row, 2)?,
        content: row.get(3)?,
        message_type: enum_col(row, 4)?,
        media_urls: json_col(row, 5)?,
        status: enum_col(row, 6)?,
        platform_message_id: row.get(7)?,
        metadata: json_col(row, 8)?,
        created_at: row.get(9)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: NewMessage) -> Result<Message, PropdeskError> {
    let message = Message {
        id: super::new_id(),
        conversation_id: msg.conversation_id,
        sender: msg.sender,
        content: msg.content,
        message_type: msg.message_type,
        media_urls: msg.media_urls,
        status: msg.status,
        platform_message_id: msg.platform_message_id,
        metadata: msg.metadata,
        created_at: super::now(),
    };
    let row = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender, content, message_type,
                     media_urls, status, platform_message_id, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.id,
                    row.conversation_id,
                    row.sender.to_string(),
                    row.content,
                    row.message_type.to_string(),
                    to_json(&row.media_urls),
                    row.status.to_string(),
                    row.platform_message_id,
                    to_json(&row.metadata),
                    row.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(message)
}

/// Get messages for a conversation in chronological order.
///
/// With a limit, returns the most recent `limit` messages, still oldest first.
pub async fn get_messages(
    db: &Database,
    conversation_id: &str,
    limit: Option<usize>,
) -> Result<Vec<Message>, PropdeskError> {
    let conversation_id = conversation_id.to_string();
    // -1 means no limit in SQLite.
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender, content, message_type, media_urls, status,
                        platform_message_id, metadata, created_at
                 FROM (
                     SELECT *, rowid AS seq FROM messages WHERE conversation_id = ?1
                     ORDER BY created_at DESC, seq DESC LIMIT ?2
                 )
                 ORDER BY created_at ASC, seq ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id, limit], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{memory_db, seed_conversation};
    use propdesk_core::types::{DeliveryStatus, MessageType, SenderRole};

    fn make_msg(conversation_id: &str, sender: SenderRole, content: &str) -> NewMessage {
        NewMessage {
            conversation_id: conversation_id.to_string(),
            sender,
            content: content.to_string(),
            message_type: MessageType::Text,
            media_urls: vec![],
            status: match sender {
                SenderRole::Customer => DeliveryStatus::Received,
                SenderRole::System => DeliveryStatus::Sent,
            },
            platform_message_id: None,
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn insert_and_get_messages_in_order() {
        let db = memory_db().await;
        let (_, conv) = seed_conversation(&db, "42").await;

        insert_message(&db, make_msg(&conv.id, SenderRole::Customer, "hi"))
            .await
            .unwrap();
        insert_message(&db, make_msg(&conv.id, SenderRole::System, "Hello! May I know your name?"))
            .await
            .unwrap();
        insert_message(&db, make_msg(&conv.id, SenderRole::Customer, "Priya"))
            .await
            .unwrap();

        let messages = get_messages(&db, &conv.id, None).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].sender, SenderRole::System);
        assert_eq!(messages[2].content, "Priya");
    }

    #[tokio::test]
    async fn limit_keeps_most_recent_in_chronological_order() {
        let db = memory_db().await;
        let (_, conv) = seed_conversation(&db, "42").await;
        for i in 0..5 {
            insert_message(&db, make_msg(&conv.id, SenderRole::Customer, &format!("msg {i}")))
                .await
                .unwrap();
        }

        let messages = get_messages(&db, &conv.id, Some(2)).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "msg 3");
        assert_eq!(messages[1].content, "msg 4");
    }

    #[tokio::test]
    async fn media_and_metadata_round_trip() {
        let db = memory_db().await;
        let (_, conv) = seed_conversation(&db, "42").await;
        let mut msg = make_msg(&conv.id, SenderRole::Customer, "[Photo]");
        msg.message_type = MessageType::Image;
        msg.media_urls = vec!["https://api.telegram.org/file/botT/photos/1.jpg".into()];
        msg.platform_message_id = Some("77".into());
        msg.metadata = serde_json::json!({"is_edited": true});

        let stored = insert_message(&db, msg).await.unwrap();
        let fetched = get_messages(&db, &conv.id, None).await.unwrap();
        assert_eq!(fetched, vec![stored]);
    }

    #[tokio::test]
    async fn insert_into_unknown_conversation_fails() {
        let db = memory_db().await;
        let result = insert_message(&db, make_msg("ghost", SenderRole::Customer, "hi")).await;
        assert!(result.is_err());
    }
}
