// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed quick-reply layouts, looked up by stage.

use propdesk_core::{QuickReplies, QuickReply};

use crate::buttons::BudgetBracket;
use crate::stage::Stage;

/// Keyboard shown after a turn ends in `stage`, if any.
pub fn keyboard_for(stage: Stage) -> Option<QuickReplies> {
    match stage {
        Stage::Qualification => Some(property_type_keyboard()),
        Stage::BudgetCollection => Some(budget_keyboard()),
        Stage::LocationCollection => Some(location_keyboard()),
        Stage::PropertyMatching => Some(post_match_keyboard()),
        Stage::Scheduling => Some(time_slot_keyboard()),
        _ => None,
    }
}

pub fn property_type_keyboard() -> QuickReplies {
    QuickReplies {
        rows: vec![
            vec![
                QuickReply::new("🏢 Apartment", "property_type_apartment"),
                QuickReply::new("🏡 Villa", "property_type_villa"),
            ],
            vec![
                QuickReply::new("🏠 Independent House", "property_type_house"),
                QuickReply::new("📐 Plot", "property_type_plot"),
            ],
            vec![QuickReply::new("🏬 Commercial", "property_type_commercial")],
        ],
    }
}

pub fn budget_keyboard() -> QuickReplies {
    QuickReplies {
        rows: BudgetBracket::ALL
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|b| QuickReply::new(b.label(), b.payload()))
                    .collect()
            })
            .collect(),
    }
}

pub fn location_keyboard() -> QuickReplies {
    QuickReplies {
        rows: vec![
            vec![
                QuickReply::new("Whitefield", "location_whitefield"),
                QuickReply::new("Koramangala", "location_koramangala"),
            ],
            vec![
                QuickReply::new("Indiranagar", "location_indiranagar"),
                QuickReply::new("Electronic City", "location_electronic_city"),
            ],
            vec![
                QuickReply::new("HSR Layout", "location_hsr_layout"),
                QuickReply::new("Other", "location_other"),
            ],
        ],
    }
}

pub fn post_match_keyboard() -> QuickReplies {
    QuickReplies {
        rows: vec![
            vec![QuickReply::new("🔍 Show properties", "show_properties")],
            vec![
                QuickReply::new("📅 Schedule visit", "schedule_visit"),
                QuickReply::new("📞 Request callback", "request_callback"),
            ],
        ],
    }
}

pub fn time_slot_keyboard() -> QuickReplies {
    QuickReplies {
        rows: vec![vec![
            QuickReply::new("Morning (9-12)", "callback_morning"),
            QuickReply::new("Afternoon (12-4)", "callback_afternoon"),
            QuickReply::new("Evening (4-8)", "callback_evening"),
        ]],
    }
}
