// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Propdesk integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without Telegram or a database file to clean up.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock Telegram channel that captures replies
//! - [`TestHarness`] - Pipeline, storage and webhook router wired together

pub mod harness;
pub mod mock_channel;

pub use harness::{TestHarness, TestHarnessBuilder, callback_update_json, text_update_json};
pub use mock_channel::MockChannel;
