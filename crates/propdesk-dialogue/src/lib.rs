// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic qualification dialogue for the Propdesk CRM.
//!
//! This crate provides:
//! - [`Preferences`]: regex/keyword extraction of budget, property type and location
//! - [`IntentClassifier`]: keyword intent classification
//! - [`DialogueEngine`]: the stage transition table for text and button input
//! - [`keyboard_for`]: fixed quick-reply layouts per stage
//! - [`LeadScorer`]: pluggable lead scoring, [`WeightedLeadScorer`] by default
//! - [`fallback_reply`]: keyword-only replies when the engine is off or fails
//!
//! The engine is pure: callers load and persist [`DialogueState`] themselves.

pub mod buttons;
pub mod context;
pub mod engine;
pub mod fallback;
pub mod intent;
pub mod keyboards;
pub mod preferences;
pub mod scoring;
pub mod stage;

pub use buttons::{BudgetBracket, ButtonPayload};
pub use context::{BehavioralInsights, DialogueContext, LeadJourney};
pub use engine::{DialogueEngine, DialogueInput, DialogueOutcome, DialogueState};
pub use fallback::fallback_reply;
pub use intent::{Intent, IntentClassifier, IntentMatch, has_property_interest};
pub use keyboards::keyboard_for;
pub use preferences::{Preferences, extract_preferences_from_history, format_inr};
pub use scoring::{LeadScorer, LeadSignals, WeightedLeadScorer};
pub use stage::{FunnelStage, Stage};
