// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn dialogue context: behavioral insights and lead journey.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::preferences::{Preferences, contains_phrase};
use crate::stage::Stage;

const PRICE_WORDS: &[&str] = &[
    "cheap", "affordable", "discount", "negotiate", "best price", "low cost", "expensive",
    "too much", "costly", "offer",
];

/// Keyword to concern category, in reporting order.
const CONCERNS: &[(&str, &str)] = &[
    ("price", "price"),
    ("expensive", "price"),
    ("loan", "financing"),
    ("emi", "financing"),
    ("commute", "location"),
    ("traffic", "location"),
    ("metro", "location"),
    ("school", "amenities"),
    ("parking", "amenities"),
    ("security", "safety"),
    ("safe", "safety"),
    ("legal", "legal"),
    ("rera", "legal"),
    ("possession", "possession"),
    ("ready to move", "possession"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Concise,
    Conversational,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DecisionSpeed {
    Fast,
    Moderate,
    Deliberate,
    /// Budget and location not both known yet.
    Exploring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceSensitivity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralInsights {
    pub communication_style: CommunicationStyle,
    pub decision_speed: DecisionSpeed,
    pub price_sensitivity: PriceSensitivity,
}

impl BehavioralInsights {
    /// Derive insights from the customer's recent messages and preferences.
    pub fn analyze<S: AsRef<str>>(recent_messages: &[S], prefs: &Preferences) -> Self {
        Self {
            communication_style: communication_style(recent_messages),
            decision_speed: decision_speed(prefs.qualified_at_turn),
            price_sensitivity: price_sensitivity(recent_messages),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadJourney {
    pub stage: Stage,
    /// Lead score scaled to 0.0-1.0.
    pub conversion_likelihood: f32,
    pub key_concerns: Vec<String>,
}

impl LeadJourney {
    pub fn new<S: AsRef<str>>(stage: Stage, lead_score: u8, recent_messages: &[S]) -> Self {
        Self {
            stage,
            conversion_likelihood: f32::from(lead_score.min(100)) / 100.0,
            key_concerns: key_concerns(recent_messages),
        }
    }
}

/// Everything the engine knows about the customer on this turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueContext {
    pub is_returning_customer: bool,
    pub preferences: Preferences,
    pub behavioral_insights: BehavioralInsights,
    pub lead_journey: LeadJourney,
}

fn communication_style<S: AsRef<str>>(messages: &[S]) -> CommunicationStyle {
    if messages.is_empty() {
        return CommunicationStyle::Concise;
    }
    let words: usize = messages
        .iter()
        .map(|m| m.as_ref().split_whitespace().count())
        .sum();
    let average = words as f32 / messages.len() as f32;
    if average < 5.0 {
        CommunicationStyle::Concise
    } else if average < 15.0 {
        CommunicationStyle::Conversational
    } else {
        CommunicationStyle::Detailed
    }
}

fn decision_speed(qualified_at_turn: Option<u32>) -> DecisionSpeed {
    match qualified_at_turn {
        Some(turn) if turn <= 3 => DecisionSpeed::Fast,
        Some(turn) if turn <= 6 => DecisionSpeed::Moderate,
        Some(_) => DecisionSpeed::Deliberate,
        None => DecisionSpeed::Exploring,
    }
}

fn price_sensitivity<S: AsRef<str>>(messages: &[S]) -> PriceSensitivity {
    let hits: usize = messages
        .iter()
        .map(|m| {
            let lower = m.as_ref().to_lowercase();
            PRICE_WORDS
                .iter()
                .filter(|w| contains_phrase(&lower, w))
                .count()
        })
        .sum();
    match hits {
        0 => PriceSensitivity::Low,
        1 => PriceSensitivity::Medium,
        _ => PriceSensitivity::High,
    }
}

fn key_concerns<S: AsRef<str>>(messages: &[S]) -> Vec<String> {
    let lowered: Vec<String> = messages.iter().map(|m| m.as_ref().to_lowercase()).collect();
    let mut found: Vec<String> = Vec::new();
    for (keyword, concern) in CONCERNS {
        if found.iter().any(|c| c == concern) {
            continue;
        }
        if lowered.iter().any(|m| contains_phrase(m, keyword)) {
            found.push((*concern).to_string());
        }
    }
    found
}
