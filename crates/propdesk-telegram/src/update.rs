// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook update parsing.
//!
//! Deserializes the body into teloxide's [`Update`] and converts it into a
//! platform-neutral [`InboundUpdate`]. Only `message`, `edited_message` and
//! `callback_query` are dispatched; every other update kind becomes
//! [`InboundUpdate::Unsupported`].

use propdesk_core::PropdeskError;
use propdesk_core::types::{
    Attachment, CallbackInteraction, InboundMessage, InboundUpdate, MessageType,
    PLATFORM_TELEGRAM, Sender,
};
use serde_json::json;
use teloxide::types::{CallbackQuery, Chat, FileMeta, Message, Update, UpdateKind, User};
use tracing::warn;

use crate::media;

/// Parses a webhook body into an [`InboundUpdate`].
pub fn parse_update(body: &[u8]) -> Result<InboundUpdate, PropdeskError> {
    let update: Update = serde_json::from_slice(body).map_err(|e| PropdeskError::Payload {
        message: format!("invalid Telegram update: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(convert_update(update))
}

/// Dispatches on the update kind.
pub fn convert_update(update: Update) -> InboundUpdate {
    let update_id = i64::from(update.id.0);
    match update.kind {
        UpdateKind::Message(msg) => InboundUpdate::Message(convert_message(update_id, &msg)),
        UpdateKind::EditedMessage(msg) => {
            InboundUpdate::EditedMessage(convert_message(update_id, &msg))
        }
        UpdateKind::CallbackQuery(query) => InboundUpdate::Callback(convert_callback(query)),
        // teloxide keeps kinds it could not parse as raw JSON.
        UpdateKind::Error(_) => {
            warn!(update_id, "update kind could not be parsed, ignoring");
            InboundUpdate::Unsupported { update_id }
        }
        _ => InboundUpdate::Unsupported { update_id },
    }
}

fn convert_message(update_id: i64, msg: &Message) -> InboundMessage {
    let (content, message_type, attachments) = message_body(msg);
    let sender = match &msg.from {
        Some(user) => to_sender(user),
        None => Sender {
            external_id: msg.chat.id.0.to_string(),
            display_name: msg
                .chat
                .title()
                .or_else(|| msg.chat.first_name())
                .unwrap_or("Telegram User")
                .to_string(),
            username: None,
        },
    };

    let mut platform_metadata = json!({
        "update_id": update_id,
        "chat_id": msg.chat.id.0,
        "chat_type": chat_type(&msg.chat),
        "date": msg.date.timestamp(),
    });
    if let Some(doc) = msg.document() {
        platform_metadata["file_name"] = json!(doc.file_name);
        platform_metadata["mime_type"] = json!(doc.mime_type.as_ref().map(|m| m.to_string()));
    }

    InboundMessage {
        platform: PLATFORM_TELEGRAM.to_string(),
        platform_message_id: msg.id.0.to_string(),
        chat_id: msg.chat.id.0.to_string(),
        sender,
        content,
        message_type,
        attachments,
        platform_metadata,
    }
}

/// Content, type and attachments. Content is the text, else the caption,
/// else a bracketed placeholder describing the attachment.
fn message_body(msg: &Message) -> (String, MessageType, Vec<Attachment>) {
    if let Some(text) = msg.text().filter(|t| !t.is_empty()) {
        return (text.to_string(), MessageType::Text, Vec::new());
    }

    let (placeholder, message_type, attachments) = if let Some(photos) = msg.photo() {
        let attachments = media::largest_photo(photos)
            .map(|p| vec![attachment(&p.file, MessageType::Image)])
            .unwrap_or_default();
        ("[Photo]".to_string(), MessageType::Image, attachments)
    } else if let Some(doc) = msg.document() {
        let name = doc.file_name.as_deref().unwrap_or("file");
        (
            format!("[Document: {name}]"),
            MessageType::Document,
            vec![attachment(&doc.file, MessageType::Document)],
        )
    } else if let Some(audio) = msg.audio() {
        (
            "[Audio]".to_string(),
            MessageType::Audio,
            vec![attachment(&audio.file, MessageType::Audio)],
        )
    } else if let Some(voice) = msg.voice() {
        (
            "[Voice message]".to_string(),
            MessageType::Audio,
            vec![attachment(&voice.file, MessageType::Audio)],
        )
    } else if let Some(video) = msg.video() {
        (
            "[Video]".to_string(),
            MessageType::Video,
            vec![attachment(&video.file, MessageType::Video)],
        )
    } else if let Some(loc) = msg.location() {
        (
            format!("[Location: {}, {}]", loc.latitude, loc.longitude),
            MessageType::Location,
            Vec::new(),
        )
    } else if let Some(contact) = msg.contact() {
        let name = match &contact.last_name {
            Some(last) => format!("{} {last}", contact.first_name),
            None => contact.first_name.clone(),
        };
        (
            format!("[Contact: {name} {}]", contact.phone_number),
            MessageType::Contact,
            Vec::new(),
        )
    } else {
        ("[Unsupported message]".to_string(), MessageType::Text, Vec::new())
    };

    let content = msg
        .caption()
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or(placeholder);
    (content, message_type, attachments)
}

fn convert_callback(query: CallbackQuery) -> CallbackInteraction {
    // Fall back to the presser's private chat when the keyboard message is gone.
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id.0.to_string())
        .unwrap_or_else(|| query.from.id.0.to_string());
    CallbackInteraction {
        platform: PLATFORM_TELEGRAM.to_string(),
        callback_id: query.id.0,
        chat_id,
        sender: to_sender(&query.from),
        data: query.data.unwrap_or_default(),
    }
}

fn to_sender(user: &User) -> Sender {
    Sender {
        external_id: user.id.0.to_string(),
        display_name: user.full_name(),
        username: user.username.clone(),
    }
}

fn chat_type(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}

fn attachment(file: &FileMeta, message_type: MessageType) -> Attachment {
    Attachment {
        file_id: file.id.0.clone(),
        message_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_update(message: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({ "update_id": 900, "message": message })).unwrap()
    }

    fn base_message(extra: serde_json::Value) -> serde_json::Value {
        let mut msg = json!({
            "message_id": 17,
            "date": 1_700_000_000i64,
            "chat": { "id": 555, "type": "private", "first_name": "Asha" },
            "from": { "id": 555, "is_bot": false, "first_name": "Asha", "last_name": "Rao", "username": "asha_r" },
        });
        if let (Some(obj), Some(extra)) = (msg.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        msg
    }

    fn parse_message(extra: serde_json::Value) -> InboundMessage {
        match parse_update(&message_update(base_message(extra))).unwrap() {
            InboundUpdate::Message(m) => m,
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn text_message() {
        let msg = parse_message(json!({ "text": "Looking for a flat" }));
        assert_eq!(msg.content, "Looking for a flat");
        assert_eq!(msg.message_type, MessageType::Text);
        assert_eq!(msg.chat_id, "555");
        assert_eq!(msg.platform_message_id, "17");
        assert_eq!(msg.sender.display_name, "Asha Rao");
        assert_eq!(msg.sender.username.as_deref(), Some("asha_r"));
        assert_eq!(msg.platform_metadata["update_id"], 900);
        assert_eq!(msg.platform_metadata["chat_type"], "private");
        assert_eq!(msg.platform_metadata["date"], 1_700_000_000i64);
        assert!(msg.has_text());
    }

    #[test]
    fn photo_uses_caption_and_largest_size() {
        let msg = parse_message(json!({
            "caption": "this one",
            "photo": [
                { "file_id": "small", "file_unique_id": "a", "width": 90, "height": 90, "file_size": 100 },
                { "file_id": "big", "file_unique_id": "b", "width": 800, "height": 800, "file_size": 9000 }
            ]
        }));
        assert_eq!(msg.content, "this one");
        assert_eq!(msg.message_type, MessageType::Image);
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.attachments[0].file_id, "big");
    }

    #[test]
    fn placeholders_without_text_or_caption() {
        let photo = parse_message(json!({
            "photo": [{ "file_id": "p", "file_unique_id": "pu", "width": 1, "height": 1 }]
        }));
        assert_eq!(photo.content, "[Photo]");
        assert!(!photo.has_text());

        let doc = parse_message(json!({
            "document": { "file_id": "d", "file_unique_id": "du", "file_name": "brochure.pdf" }
        }));
        assert_eq!(doc.content, "[Document: brochure.pdf]");
        assert_eq!(doc.platform_metadata["file_name"], "brochure.pdf");
        assert_eq!(doc.attachments[0].file_id, "d");

        let voice = parse_message(json!({
            "voice": { "file_id": "v", "file_unique_id": "vu", "duration": 3 }
        }));
        assert_eq!(voice.content, "[Voice message]");
        assert_eq!(voice.message_type, MessageType::Audio);

        let audio = parse_message(json!({
            "audio": { "file_id": "a", "file_unique_id": "au", "duration": 3 }
        }));
        assert_eq!(audio.content, "[Audio]");

        let video = parse_message(json!({
            "video": { "file_id": "m", "file_unique_id": "mu", "width": 1, "height": 1, "duration": 3 }
        }));
        assert_eq!(video.content, "[Video]");

        let loc = parse_message(json!({ "location": { "latitude": 12.97, "longitude": 77.59 } }));
        assert_eq!(loc.content, "[Location: 12.97, 77.59]");
        assert!(loc.attachments.is_empty());

        let contact = parse_message(json!({
            "contact": { "phone_number": "+919876543210", "first_name": "Dev" }
        }));
        assert_eq!(contact.content, "[Contact: Dev +919876543210]");
        assert_eq!(contact.message_type, MessageType::Contact);
    }

    #[test]
    fn edited_message_and_callback() {
        let body = serde_json::to_vec(&json!({
            "update_id": 1,
            "edited_message": base_message(json!({ "text": "edited", "edit_date": 1_700_000_100i64 })),
        }))
        .unwrap();
        assert!(matches!(parse_update(&body).unwrap(), InboundUpdate::EditedMessage(m) if m.content == "edited"));

        let body = serde_json::to_vec(&json!({
            "update_id": 2,
            "callback_query": {
                "id": "cbq-1",
                "from": { "id": 555, "is_bot": false, "first_name": "Asha" },
                "message": base_message(json!({ "text": "pick one" })),
                "chat_instance": "x",
                "data": "budget_50_100"
            }
        }))
        .unwrap();
        match parse_update(&body).unwrap() {
            InboundUpdate::Callback(cb) => {
                assert_eq!(cb.callback_id, "cbq-1");
                assert_eq!(cb.chat_id, "555");
                assert_eq!(cb.sender.display_name, "Asha");
                assert_eq!(cb.data, "budget_50_100");
            }
            other => panic!("expected callback, got {other:?}"),
        }
    }

    #[test]
    fn other_update_kinds_are_unsupported() {
        let body = serde_json::to_vec(&json!({
            "update_id": 77,
            "channel_post": {
                "message_id": 1,
                "date": 1_700_000_000i64,
                "chat": { "id": -100, "type": "channel", "title": "Listings" },
                "text": "new launch"
            }
        }))
        .unwrap();
        assert_eq!(
            parse_update(&body).unwrap(),
            InboundUpdate::Unsupported { update_id: 77 }
        );

        let body = br#"{"update_id": 78, "message": {"message_id": "oops"}}"#;
        assert_eq!(
            parse_update(body).unwrap(),
            InboundUpdate::Unsupported { update_id: 78 }
        );
    }

    #[test]
    fn malformed_json_is_a_payload_error() {
        assert!(matches!(
            parse_update(b"{not json"),
            Err(PropdeskError::Payload { .. })
        ));
        assert!(matches!(
            parse_update(br#"{"message": {}}"#),
            Err(PropdeskError::Payload { .. })
        ));
    }
}
