// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Propdesk.
//!
//! Holds the error type, the shared domain types and the adapter traits that
//! the storage, channel and pipeline crates implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::PropdeskError;
pub use types::{
    AdapterType, CallbackInteraction, Company, Conversation, Customer, DeliveryStatus,
    DialogueStateRecord, HealthStatus, InboundMessage, InboundUpdate, Lead, LeadStage, Message,
    MessageId, MessageType, OutboundMessage, QuickReplies, QuickReply, Sender, SenderRole,
};

pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter, UpdateHandler};
