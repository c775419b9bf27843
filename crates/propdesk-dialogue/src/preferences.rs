// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Buyer preference extraction.
//!
//! Every customer message is scanned for budget, property type, BHK, city,
//! area, timeline, financing and contact details. Messages fold into one
//! [`Preferences`] value with [`Preferences::absorb`]: budget bounds keep the
//! overall minimum and maximum, every other field keeps the latest mention.
//! Both rules are associative, so absorbing one message per turn into a
//! persisted value gives exactly what replaying the whole history gives.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One lakh, in rupees.
pub const LAKH: f64 = 100_000.0;
/// One crore, in rupees.
pub const CRORE: f64 = 10_000_000.0;

/// Amount followed by a unit: `50 lakh`, `1.2cr`, `75L`. No word boundary
/// after the unit, so `80 lakhs`, `5 lacs` and `2 large` all count.
static BUDGET_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(lakh|crore|l|cr)").unwrap());

/// Range sharing one unit: `50 - 80 lakh`, `1 to 1.5 crore`.
static BUDGET_UNIT_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:-|to)\s*(\d+(?:\.\d+)?)\s*(lakh|crore|l|cr)").unwrap()
});

/// Plain rupee range: `5000000 - 8000000`, `₹4500000 to ₹6000000`.
static BUDGET_PLAIN_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:₹|rs\.?|inr)?\s*(\d{6,})\s*(?:-|to)\s*(?:₹|rs\.?|inr)?\s*(\d{6,})")
        .unwrap()
});

static BHK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*bhk").unwrap());

static TIMELINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(immediately|urgent(?:ly)?|asap|this month|next month|next year|(?:within|in)\s+\d+\s+(?:weeks?|months?|years?))\b",
    )
    .unwrap()
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\+91[\s-]?)?\b[6-9]\d{9}\b").unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.]+").unwrap());

/// Keyword to canonical property type. Longer phrases first.
const PROPERTY_TYPES: &[(&str, &str)] = &[
    ("independent house", "house"),
    ("penthouse", "penthouse"),
    ("apartment", "apartment"),
    ("flat", "apartment"),
    ("villa", "villa"),
    ("house", "house"),
    ("plot", "plot"),
    ("land", "plot"),
    ("studio", "studio"),
    ("commercial", "commercial"),
    ("office", "commercial"),
    ("shop", "commercial"),
];

/// Keyword to canonical city.
const CITIES: &[(&str, &str)] = &[
    ("bangalore", "bangalore"),
    ("bengaluru", "bangalore"),
    ("mumbai", "mumbai"),
    ("bombay", "mumbai"),
    ("new delhi", "delhi"),
    ("delhi", "delhi"),
    ("pune", "pune"),
    ("hyderabad", "hyderabad"),
    ("chennai", "chennai"),
    ("gurgaon", "gurgaon"),
    ("gurugram", "gurgaon"),
    ("noida", "noida"),
    ("kolkata", "kolkata"),
];

/// Known areas and the city each implies.
pub const AREAS: &[(&str, &str)] = &[
    ("whitefield", "bangalore"),
    ("koramangala", "bangalore"),
    ("indiranagar", "bangalore"),
    ("electronic city", "bangalore"),
    ("hsr layout", "bangalore"),
    ("jp nagar", "bangalore"),
    ("marathahalli", "bangalore"),
    ("hebbal", "bangalore"),
    ("sarjapur", "bangalore"),
    ("bandra", "mumbai"),
    ("andheri", "mumbai"),
    ("powai", "mumbai"),
    ("thane", "mumbai"),
    ("hinjewadi", "pune"),
    ("baner", "pune"),
    ("kharadi", "pune"),
    ("gachibowli", "hyderabad"),
    ("kondapur", "hyderabad"),
    ("hitech city", "hyderabad"),
    ("dwarka", "delhi"),
];

const LOAN_WORDS: &[&str] = &["home loan", "loan", "emi", "mortgage", "pre-approved", "preapproved"];
const SELF_FUNDED_WORDS: &[&str] = &["cash", "self funded", "self-funded", "own funds"];

/// Everything known about what a customer wants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rupees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<f64>,
    /// Rupees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    /// Formatted as `3BHK`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bhk_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    /// `loan` or `self_funded`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Customer turn on which budget and location were first both known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_at_turn: Option<u32>,
}

impl Preferences {
    /// Extract whatever a single message states. Never sets `name`.
    pub fn extract(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut prefs = Preferences::default();

        let budgets = budget_mentions(text);
        prefs.budget_min = budgets.iter().copied().reduce(f64::min);
        prefs.budget_max = budgets.iter().copied().reduce(f64::max);

        prefs.property_type = first_keyword(&lower, PROPERTY_TYPES);

        if let Some(caps) = BHK.captures(text)
            && let Ok(n) = caps[1].parse::<u32>()
        {
            prefs.bhk_preference = Some(format!("{n}BHK"));
        }

        if let Some((area, city)) = AREAS.iter().find(|(area, _)| contains_phrase(&lower, area)) {
            prefs.area_preference = Some((*area).to_string());
            prefs.city = Some((*city).to_string());
        }
        if let Some(city) = first_keyword(&lower, CITIES) {
            prefs.city = Some(city);
        }

        if let Some(m) = TIMELINE.find(text) {
            prefs.timeline = Some(m.as_str().to_lowercase());
        }

        if LOAN_WORDS.iter().any(|w| contains_phrase(&lower, w)) {
            prefs.financing = Some("loan".to_string());
        } else if SELF_FUNDED_WORDS.iter().any(|w| contains_phrase(&lower, w)) {
            prefs.financing = Some("self_funded".to_string());
        }

        prefs.contact = EMAIL
            .find(text)
            .or_else(|| PHONE.find(text))
            .map(|m| m.as_str().to_string());

        prefs
    }

    /// Fold `other` into `self`: budget keeps the overall bounds, everything
    /// else keeps the newest value.
    pub fn merge(&mut self, other: &Preferences) {
        self.budget_min = min_opt(self.budget_min, other.budget_min);
        self.budget_max = max_opt(self.budget_max, other.budget_max);
        overwrite(&mut self.name, &other.name);
        overwrite(&mut self.property_type, &other.property_type);
        overwrite(&mut self.bhk_preference, &other.bhk_preference);
        overwrite(&mut self.city, &other.city);
        overwrite(&mut self.area_preference, &other.area_preference);
        overwrite(&mut self.timeline, &other.timeline);
        overwrite(&mut self.financing, &other.financing);
        overwrite(&mut self.contact, &other.contact);
        if self.qualified_at_turn.is_none() {
            self.qualified_at_turn = other.qualified_at_turn;
        }
    }

    /// Absorb customer message number `turn` (1-based) and return what it added.
    pub fn absorb(&mut self, text: &str, turn: u32) -> Preferences {
        let found = Preferences::extract(text);
        self.merge(&found);
        self.mark_qualified(turn);
        found
    }

    /// Records `turn` as the qualification turn if budget and location just
    /// became known.
    pub fn mark_qualified(&mut self, turn: u32) {
        if self.qualified_at_turn.is_none() && self.has_budget() && self.has_location() {
            self.qualified_at_turn = Some(turn);
        }
    }

    pub fn has_budget(&self) -> bool {
        self.budget_min.is_some() || self.budget_max.is_some()
    }

    pub fn has_location(&self) -> bool {
        self.city.is_some() || self.area_preference.is_some()
    }

    /// True when nothing at all was found.
    pub fn is_empty(&self) -> bool {
        *self == Preferences::default()
    }

    /// True when the value carries any qualification fact (budget, type,
    /// BHK or location).
    pub fn has_qualification_facts(&self) -> bool {
        self.has_budget()
            || self.has_location()
            || self.property_type.is_some()
            || self.bhk_preference.is_some()
    }

    /// Enough to open a lead: a budget plus either a property type or a location.
    pub fn is_lead_worthy(&self) -> bool {
        self.has_budget() && (self.property_type.is_some() || self.has_location())
    }

    /// Human-readable budget, e.g. `₹50L - ₹1Cr`.
    pub fn budget_label(&self) -> Option<String> {
        match (self.budget_min, self.budget_max) {
            (Some(min), Some(max)) if (max - min).abs() < f64::EPSILON => Some(format_inr(min)),
            (Some(min), Some(max)) => Some(format!("{} - {}", format_inr(min), format_inr(max))),
            (None, Some(max)) => Some(format!("under {}", format_inr(max))),
            (Some(min), None) => Some(format!("above {}", format_inr(min))),
            (None, None) => None,
        }
    }

    /// Human-readable location, e.g. `Whitefield, Bangalore`.
    pub fn location_label(&self) -> Option<String> {
        match (&self.area_preference, &self.city) {
            (Some(area), Some(city)) => Some(format!("{}, {}", title_case(area), title_case(city))),
            (Some(area), None) => Some(title_case(area)),
            (None, Some(city)) => Some(title_case(city)),
            (None, None) => None,
        }
    }

    /// One-line summary of known facts, or `None` when nothing is known.
    pub fn summary(&self) -> Option<String> {
        let mut what: Vec<&str> = Vec::new();
        if let Some(bhk) = &self.bhk_preference {
            what.push(bhk);
        }
        if let Some(kind) = &self.property_type {
            what.push(kind);
        }

        let mut out = String::new();
        if !what.is_empty() {
            out.push_str(&what.join(" "));
        }
        if let Some(location) = self.location_label() {
            if out.is_empty() {
                out.push_str("a property");
            }
            out.push_str(" in ");
            out.push_str(&location);
        }
        if let Some(budget) = self.budget_label() {
            if out.is_empty() {
                out.push_str("a property");
            }
            out.push_str(" with a budget of ");
            out.push_str(&budget);
        }
        (!out.is_empty()).then_some(out)
    }
}

/// Replays a customer's messages from scratch. Deterministic: the same history
/// always yields the same value.
pub fn extract_preferences_from_history<S: AsRef<str>>(history: &[S]) -> Preferences {
    let mut prefs = Preferences::default();
    for (i, text) in history.iter().enumerate() {
        prefs.absorb(text.as_ref(), turn_number(i));
    }
    prefs
}

fn turn_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Every budget amount mentioned in `text`, in rupees.
pub fn budget_mentions(text: &str) -> Vec<f64> {
    let mut values = Vec::new();
    for caps in BUDGET_UNIT.captures_iter(text) {
        if let Ok(amount) = caps[1].parse::<f64>() {
            values.push(amount * unit_multiplier(&caps[2]));
        }
    }
    for caps in BUDGET_UNIT_RANGE.captures_iter(text) {
        if let Ok(low) = caps[1].parse::<f64>() {
            values.push(low * unit_multiplier(&caps[3]));
        }
    }
    for caps in BUDGET_PLAIN_RANGE.captures_iter(text) {
        for idx in [1, 2] {
            if let Ok(v) = caps[idx].parse::<f64>() {
                values.push(v);
            }
        }
    }
    values
}

/// `cr`-prefixed units are crores, everything else lakhs.
fn unit_multiplier(unit: &str) -> f64 {
    if unit.to_lowercase().starts_with("cr") {
        CRORE
    } else {
        LAKH
    }
}

/// Formats rupees as `₹50L` or `₹1.5Cr`.
pub fn format_inr(amount: f64) -> String {
    if amount >= CRORE {
        format!("₹{}Cr", trim_number(amount / CRORE))
    } else {
        format!("₹{}L", trim_number(amount / LAKH))
    }
}

fn trim_number(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word (or whole-phrase) match, allowing a plural `s`.
pub(crate) fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(phrase) {
        let begin = start + pos;
        let mut end = begin + phrase.len();
        if bytes.get(end) == Some(&b's') {
            end += 1;
        }
        let before_ok = begin == 0 || !bytes[begin - 1].is_ascii_alphanumeric();
        let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
        start = begin + phrase.len();
    }
    false
}

fn first_keyword(lower: &str, table: &[(&str, &str)]) -> Option<String> {
    table
        .iter()
        .find(|(keyword, _)| contains_phrase(lower, keyword))
        .map(|(_, canonical)| (*canonical).to_string())
}

fn overwrite(slot: &mut Option<String>, newer: &Option<String>) {
    if newer.is_some() {
        slot.clone_from(newer);
    }
}

fn min_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn max_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}
