// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword intent classification.
//!
//! Classifies a customer message into one [`Intent`] with fixed keyword
//! lists. No model call, no network. Intents are checked in priority order:
//! opt-out, scheduling, greeting, property inquiry, budget update.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::preferences::{budget_mentions, contains_phrase};

/// What the customer is trying to do with this message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    OptOut,
    Schedule,
    Greeting,
    PropertyInquiry,
    BudgetUpdate,
    Other,
}

/// Result of classifying one message.
#[derive(Debug, Clone)]
pub struct IntentMatch {
    pub intent: Intent,
    /// Confidence in the classification (0.0-1.0).
    pub confidence: f32,
    /// Human-readable reason for the classification.
    pub reason: &'static str,
}

/// Whole-message greetings (case-insensitive, punctuation stripped).
const GREETING_EXACT: &[&str] = &[
    "hi", "hii", "hello", "hey", "hola", "namaste", "good morning", "good afternoon",
    "good evening", "hi there", "hello there",
];

/// Greeting openers (message starts with).
const GREETING_PREFIXES: &[&str] = &["hi ", "hello ", "hey ", "namaste ", "good morning", "good evening"];

/// Opt-out phrases matched anywhere in the message.
const OPT_OUT: &[&str] = &["not interested", "no thanks", "don't contact", "do not contact"];

/// Opt-out commands that count only as the whole message. `stop` inside a
/// sentence ("near the bus stop") is not an opt-out.
const OPT_OUT_EXACT: &[&str] = &["stop", "unsubscribe", "stop messaging", "stop messages"];

const SCHEDULE: &[&str] = &[
    "visit", "schedule", "appointment", "site visit", "see the property", "book a",
];

const PROPERTY_INQUIRY: &[&str] = &[
    "show me", "properties", "property", "options", "available", "listings", "anything new",
    "what do you have", "any new",
];

const BUDGET_WORDS: &[&str] = &["budget", "afford", "price range", "increase", "stretch"];

/// Fixed property-interest keywords for the keyword lead path.
pub const LEAD_KEYWORDS: &[&str] = &[
    "buy", "purchase", "looking for", "interested", "property", "apartment", "flat", "villa",
    "house", "plot", "invest", "bhk", "rent",
];

/// True when the message mentions any property-interest keyword.
pub fn has_property_interest(message: &str) -> bool {
    let lower = message.to_lowercase();
    LEAD_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Keyword intent classifier.
pub struct IntentClassifier {
    /// Matches below this confidence are reported as [`Intent::Other`].
    confidence_threshold: f32,
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }

    pub fn with_threshold(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Classify a single message.
    pub fn classify(&self, message: &str) -> IntentMatch {
        let lower = normalize(message);
        if lower.is_empty() {
            return IntentMatch {
                intent: Intent::Other,
                confidence: 1.0,
                reason: "empty message",
            };
        }

        let (intent, confidence, reason) = Self::match_keywords(&lower, message);
        if confidence < self.confidence_threshold {
            return IntentMatch {
                intent: Intent::Other,
                confidence,
                reason: "below confidence threshold",
            };
        }
        IntentMatch {
            intent,
            confidence,
            reason,
        }
    }

    fn match_keywords(lower: &str, raw: &str) -> (Intent, f32, &'static str) {
        if OPT_OUT_EXACT.contains(&lower) || OPT_OUT.iter().any(|k| contains_phrase(lower, k)) {
            return (Intent::OptOut, 0.9, "opt-out keyword");
        }
        if SCHEDULE.iter().any(|k| contains_phrase(lower, k)) {
            return (Intent::Schedule, 0.85, "scheduling keyword");
        }
        if GREETING_EXACT.contains(&lower) {
            return (Intent::Greeting, 0.95, "greeting");
        }
        if GREETING_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return (Intent::Greeting, 0.7, "greeting opener");
        }
        if PROPERTY_INQUIRY.iter().any(|k| lower.contains(k)) {
            return (Intent::PropertyInquiry, 0.8, "property inquiry keyword");
        }
        if !budget_mentions(raw).is_empty() {
            return (Intent::BudgetUpdate, 0.85, "budget amount");
        }
        if BUDGET_WORDS.iter().any(|k| contains_phrase(lower, k)) {
            return (Intent::BudgetUpdate, 0.6, "budget keyword");
        }
        (Intent::Other, 0.5, "no keyword matched")
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, trim and strip trailing punctuation.
fn normalize(message: &str) -> String {
    message
        .trim()
        .trim_end_matches(['!', '.', '?', ','])
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(msg: &str) -> Intent {
        IntentClassifier::new().classify(msg).intent
    }

    #[test]
    fn greetings() {
        assert_eq!(classify("Hi"), Intent::Greeting);
        assert_eq!(classify("hello!"), Intent::Greeting);
        assert_eq!(classify("Good morning"), Intent::Greeting);
        assert_eq!(classify("hey there, how are you"), Intent::Greeting);
    }

    #[test]
    fn opt_out_wins_over_everything() {
        assert_eq!(classify("not interested in any visit"), Intent::OptOut);
        assert_eq!(classify("STOP"), Intent::OptOut);
        assert_eq!(classify("a stopover in pune"), Intent::Other);
        assert_eq!(classify("Unsubscribe."), Intent::OptOut);
    }

    #[test]
    fn stop_inside_a_sentence_is_not_opt_out() {
        assert_ne!(
            classify("Need a 2bhk flat near the bus stop in Whitefield, budget 50 lakh"),
            Intent::OptOut
        );
        assert_ne!(classify("please don't stop sending options"), Intent::OptOut);
    }

    #[test]
    fn scheduling() {
        assert_eq!(classify("Can I schedule a site visit?"), Intent::Schedule);
        assert_eq!(classify("I'd like to visit on Sunday"), Intent::Schedule);
    }

    #[test]
    fn inquiry_and_budget() {
        assert_eq!(classify("show me some options"), Intent::PropertyInquiry);
        assert_eq!(classify("I can go up to 1.2 crore now"), Intent::BudgetUpdate);
        assert_eq!(classify("can we increase the budget"), Intent::BudgetUpdate);
    }

    #[test]
    fn empty_and_unknown() {
        let result = IntentClassifier::new().classify("   ");
        assert_eq!(result.intent, Intent::Other);
        assert_eq!(result.reason, "empty message");
        assert_eq!(classify("Priya"), Intent::Other);
    }

    #[test]
    fn threshold_demotes_weak_matches() {
        let strict = IntentClassifier::with_threshold(0.75);
        let result = strict.classify("hey there, quick one");
        assert_eq!(result.intent, Intent::Other);
        assert_eq!(result.reason, "below confidence threshold");
    }

    #[test]
    fn property_interest_keywords() {
        assert!(has_property_interest("Looking for a flat"));
        assert!(has_property_interest("2 BHK please"));
        assert!(!has_property_interest("what's the weather"));
    }
}
