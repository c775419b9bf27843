// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam between the webhook ingress and the processing pipeline.

use async_trait::async_trait;

use crate::error::PropdeskError;
use crate::types::InboundUpdate;

/// Processes one parsed update to completion.
///
/// An `Err` means the request itself should fail. Turn-level problems
/// (storage, dialogue, delivery) are logged by the implementation and
/// reported as `Ok`.
#[async_trait]
pub trait UpdateHandler: Send + Sync + 'static {
    async fn handle(&self, update: InboundUpdate) -> Result<(), PropdeskError>;
}
