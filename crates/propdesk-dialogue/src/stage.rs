// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue stages and their funnel and lead-stage projections.

use propdesk_core::LeadStage;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::preferences::Preferences;

/// Position of a conversation in the qualification script.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Greeting,
    NameCollection,
    Qualification,
    BudgetCollection,
    LocationCollection,
    PropertyMatching,
    Scheduling,
    FollowUp,
    Closed,
}

/// Coarse sales funnel bucket used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Awareness,
    Interest,
    Consideration,
    Intent,
    Evaluation,
    Closed,
}

impl Stage {
    /// Funnel bucket for this stage.
    pub fn funnel_stage(self) -> FunnelStage {
        match self {
            Stage::Greeting | Stage::NameCollection => FunnelStage::Awareness,
            Stage::Qualification | Stage::BudgetCollection | Stage::LocationCollection => {
                FunnelStage::Interest
            }
            Stage::PropertyMatching => FunnelStage::Consideration,
            Stage::Scheduling => FunnelStage::Intent,
            Stage::FollowUp => FunnelStage::Evaluation,
            Stage::Closed => FunnelStage::Closed,
        }
    }

    /// Stage a lead starts in when the dialogue creates it at this point.
    pub fn lead_stage(self) -> LeadStage {
        match self {
            Stage::PropertyMatching => LeadStage::Qualified,
            Stage::Scheduling | Stage::FollowUp => LeadStage::SiteVisit,
            Stage::Closed => LeadStage::Closed,
            _ => LeadStage::New,
        }
    }

    /// The collection stage for the first missing qualification fact, or
    /// property matching once budget and location are both known.
    pub fn next_collection(prefs: &Preferences) -> Stage {
        if prefs.has_budget() && prefs.has_location() {
            Stage::PropertyMatching
        } else if prefs.property_type.is_none() && prefs.bhk_preference.is_none() {
            Stage::Qualification
        } else if !prefs.has_budget() {
            Stage::BudgetCollection
        } else {
            Stage::LocationCollection
        }
    }
}
