// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed quick-reply button payloads.

use crate::preferences::{CRORE, LAKH, title_case};

/// Budget brackets offered on the budget keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetBracket {
    Under50L,
    From50LTo1Cr,
    From1CrTo2Cr,
    Above2Cr,
}

impl BudgetBracket {
    pub const ALL: [BudgetBracket; 4] = [
        BudgetBracket::Under50L,
        BudgetBracket::From50LTo1Cr,
        BudgetBracket::From1CrTo2Cr,
        BudgetBracket::Above2Cr,
    ];

    pub fn payload(self) -> &'static str {
        match self {
            BudgetBracket::Under50L => "budget_0_50",
            BudgetBracket::From50LTo1Cr => "budget_50_100",
            BudgetBracket::From1CrTo2Cr => "budget_100_200",
            BudgetBracket::Above2Cr => "budget_200_plus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BudgetBracket::Under50L => "Under ₹50L",
            BudgetBracket::From50LTo1Cr => "₹50L - ₹1Cr",
            BudgetBracket::From1CrTo2Cr => "₹1Cr - ₹2Cr",
            BudgetBracket::Above2Cr => "Above ₹2Cr",
        }
    }

    /// Bracket bounds in rupees.
    pub fn bounds(self) -> (Option<f64>, Option<f64>) {
        match self {
            BudgetBracket::Under50L => (None, Some(50.0 * LAKH)),
            BudgetBracket::From50LTo1Cr => (Some(50.0 * LAKH), Some(CRORE)),
            BudgetBracket::From1CrTo2Cr => (Some(CRORE), Some(2.0 * CRORE)),
            BudgetBracket::Above2Cr => (Some(2.0 * CRORE), None),
        }
    }

    fn from_payload(payload: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.payload() == payload)
    }
}

/// A parsed `callback_data` string.
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonPayload {
    /// `property_type_<kind>`
    PropertyType(String),
    /// `budget_<bracket>`
    Budget(BudgetBracket),
    /// `location_<area>`; `location_other` carries `"other"`.
    Location(String),
    ShowProperties,
    ScheduleVisit,
    RequestCallback,
    /// `callback_<slot>`
    CallbackSlot(String),
    Unknown(String),
}

impl ButtonPayload {
    /// Parse raw callback data. Never fails; unrecognized data is `Unknown`.
    pub fn parse(data: &str) -> Self {
        let data = data.trim();
        match data {
            "show_properties" => return ButtonPayload::ShowProperties,
            "schedule_visit" => return ButtonPayload::ScheduleVisit,
            "request_callback" => return ButtonPayload::RequestCallback,
            _ => {}
        }
        if let Some(kind) = data.strip_prefix("property_type_").filter(|k| !k.is_empty()) {
            return ButtonPayload::PropertyType(kind.to_string());
        }
        if let Some(bracket) = BudgetBracket::from_payload(data) {
            return ButtonPayload::Budget(bracket);
        }
        if let Some(area) = data.strip_prefix("location_").filter(|a| !a.is_empty()) {
            return ButtonPayload::Location(area.replace('_', " "));
        }
        if let Some(slot) = data.strip_prefix("callback_").filter(|s| !s.is_empty()) {
            return ButtonPayload::CallbackSlot(slot.to_string());
        }
        ButtonPayload::Unknown(data.to_string())
    }

    /// Human-readable label stored as the message content for a button press.
    pub fn label(&self) -> String {
        match self {
            ButtonPayload::PropertyType(kind) => title_case(kind),
            ButtonPayload::Budget(bracket) => bracket.label().to_string(),
            ButtonPayload::Location(area) if area == "other" => "Other location".to_string(),
            ButtonPayload::Location(area) => title_case(area),
            ButtonPayload::ShowProperties => "Show properties".to_string(),
            ButtonPayload::ScheduleVisit => "Schedule a visit".to_string(),
            ButtonPayload::RequestCallback => "Request a callback".to_string(),
            ButtonPayload::CallbackSlot(slot) => format!("Callback: {}", title_case(slot)),
            ButtonPayload::Unknown(data) => data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_family() {
        assert_eq!(
            ButtonPayload::parse("property_type_villa"),
            ButtonPayload::PropertyType("villa".into())
        );
        assert_eq!(
            ButtonPayload::parse("budget_50_100"),
            ButtonPayload::Budget(BudgetBracket::From50LTo1Cr)
        );
        assert_eq!(
            ButtonPayload::parse("location_electronic_city"),
            ButtonPayload::Location("electronic city".into())
        );
        assert_eq!(ButtonPayload::parse("show_properties"), ButtonPayload::ShowProperties);
        assert_eq!(ButtonPayload::parse("schedule_visit"), ButtonPayload::ScheduleVisit);
        assert_eq!(ButtonPayload::parse("request_callback"), ButtonPayload::RequestCallback);
        assert_eq!(
            ButtonPayload::parse("callback_morning"),
            ButtonPayload::CallbackSlot("morning".into())
        );
    }

    #[test]
    fn unknown_payloads_are_kept_verbatim() {
        assert_eq!(
            ButtonPayload::parse("budget_999"),
            ButtonPayload::Unknown("budget_999".into())
        );
        assert_eq!(
            ButtonPayload::parse("property_type_"),
            ButtonPayload::Unknown("property_type_".into())
        );
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(ButtonPayload::parse("budget_50_100").label(), "₹50L - ₹1Cr");
        assert_eq!(ButtonPayload::parse("location_hsr_layout").label(), "Hsr Layout");
        assert_eq!(ButtonPayload::parse("property_type_apartment").label(), "Apartment");
        assert_eq!(ButtonPayload::parse("callback_evening").label(), "Callback: Evening");
    }

    #[test]
    fn bracket_bounds() {
        assert_eq!(
            BudgetBracket::From50LTo1Cr.bounds(),
            (Some(5_000_000.0), Some(10_000_000.0))
        );
        assert_eq!(BudgetBracket::Above2Cr.bounds(), (Some(20_000_000.0), None));
    }
}
