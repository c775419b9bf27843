// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead scoring.

use propdesk_config::model::ScoringConfig;
use propdesk_core::Customer;

use crate::preferences::Preferences;

/// Qualification facts a scorer can weigh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadSignals {
    pub name: bool,
    pub budget: bool,
    pub location: bool,
    pub property_type: bool,
    pub timeline: bool,
    pub financing: bool,
    pub contact: bool,
}

impl LeadSignals {
    /// Signals known for `customer` given the merged preferences.
    pub fn collect(customer: &Customer, prefs: &Preferences) -> Self {
        Self {
            name: prefs.name.is_some() || !customer.display_name.trim().is_empty(),
            budget: prefs.has_budget(),
            location: prefs.has_location(),
            property_type: prefs.property_type.is_some() || prefs.bhk_preference.is_some(),
            timeline: prefs.timeline.is_some(),
            financing: prefs.financing.is_some(),
            contact: prefs.contact.is_some() || customer.contact_handle.is_some(),
        }
    }
}

/// Computes a 0-100 lead score.
pub trait LeadScorer: Send + Sync {
    fn score(&self, customer: &Customer, signals: &LeadSignals) -> u8;
}

/// Sums a configurable weight per known signal, capped at 100.
#[derive(Debug, Clone)]
pub struct WeightedLeadScorer {
    weights: ScoringConfig,
}

impl WeightedLeadScorer {
    pub fn new(weights: ScoringConfig) -> Self {
        Self { weights }
    }
}

impl Default for WeightedLeadScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl LeadScorer for WeightedLeadScorer {
    fn score(&self, _customer: &Customer, signals: &LeadSignals) -> u8 {
        let w = &self.weights;
        let parts = [
            (signals.name, w.name),
            (signals.budget, w.budget),
            (signals.location, w.location),
            (signals.property_type, w.property_type),
            (signals.timeline, w.timeline),
            (signals.financing, w.financing),
            (signals.contact, w.contact),
        ];
        let total: u32 = parts
            .iter()
            .filter(|(known, _)| *known)
            .map(|(_, weight)| u32::from(*weight))
            .sum();
        total.min(100) as u8
    }
}
