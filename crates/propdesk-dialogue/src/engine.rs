// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue engine: one transition table for text and button input.
//!
//! Each turn merges the input into the persisted [`DialogueState`], picks the
//! next stage from `(current stage, input)`, and returns a [`DialogueOutcome`]
//! describing the reply, keyboard and side effects. The engine performs no I/O.

use std::str::FromStr;

use propdesk_config::model::CrmConfig;
use propdesk_core::types::DialogueStateRecord;
use propdesk_core::{Customer, PropdeskError, QuickReplies};
use serde::Serialize;
use tracing::debug;

use crate::buttons::ButtonPayload;
use crate::context::{BehavioralInsights, DialogueContext, LeadJourney};
use crate::intent::{Intent, IntentClassifier};
use crate::keyboards::keyboard_for;
use crate::preferences::{AREAS, Preferences, title_case};
use crate::scoring::{LeadScorer, LeadSignals, WeightedLeadScorer};
use crate::stage::Stage;

const CONF_GREETING: f32 = 0.9;
const CONF_NAME: f32 = 0.8;
const CONF_INFO: f32 = 0.85;
const CONF_MATCHING: f32 = 0.9;
const CONF_SCHEDULE: f32 = 0.85;
const CONF_OPT_OUT: f32 = 0.9;
const CONF_FALLBACK: f32 = 0.5;
const CONF_RETURNING: f32 = 0.8;
const CONF_RETURNING_FALLBACK: f32 = 0.6;
const CONF_BUTTON: f32 = 0.95;

/// Words that look like a short alphabetic reply but are not names.
const NOT_NAMES: &[&str] = &[
    "yes", "no", "ok", "okay", "sure", "thanks", "thank you", "fine", "cool", "great",
];

/// One customer input.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueInput {
    Text(String),
    Button(ButtonPayload),
}

impl DialogueInput {
    /// Text as it will be stored in the message history.
    pub fn history_text(&self) -> String {
        match self {
            DialogueInput::Text(text) => text.clone(),
            DialogueInput::Button(payload) => payload.label(),
        }
    }

    /// Rebuild an input from a stored customer message. Button presses keep
    /// their raw `callback_data`, which wins over the label in `content`.
    pub fn from_stored(content: &str, callback_data: Option<&str>) -> Self {
        match callback_data {
            Some(data) => DialogueInput::Button(ButtonPayload::parse(data)),
            None => DialogueInput::Text(content.to_string()),
        }
    }

    /// Merge this input into `prefs` as customer turn `turn` and return the
    /// fragment it stated.
    fn absorb_into(&self, prefs: &mut Preferences, turn: u32) -> Preferences {
        match self {
            DialogueInput::Text(text) => prefs.absorb(text, turn),
            DialogueInput::Button(payload) => {
                let fragment = button_preferences(payload);
                prefs.merge(&fragment);
                prefs.mark_qualified(turn);
                fragment
            }
        }
    }
}

/// Dialogue state carried between turns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueState {
    pub stage: Stage,
    pub preferences: Preferences,
    /// Customer turns already processed.
    pub customer_turns: u32,
}

impl Default for DialogueState {
    fn default() -> Self {
        Self {
            stage: Stage::Greeting,
            preferences: Preferences::default(),
            customer_turns: 0,
        }
    }
}

impl DialogueState {
    /// Decode a persisted row.
    pub fn from_record(record: &DialogueStateRecord) -> Result<Self, PropdeskError> {
        let stage = Stage::from_str(&record.stage).map_err(|e| {
            PropdeskError::Dialogue(format!("unreadable stage {:?}: {e}", record.stage))
        })?;
        let preferences = serde_json::from_value(record.preferences.clone())
            .map_err(|e| PropdeskError::Dialogue(format!("unreadable preferences: {e}")))?;
        Ok(Self {
            stage,
            preferences,
            customer_turns: record.customer_turns,
        })
    }

    /// Encode for persistence.
    pub fn to_record(
        &self,
        conversation_id: &str,
        updated_at: &str,
    ) -> Result<DialogueStateRecord, PropdeskError> {
        Ok(DialogueStateRecord {
            conversation_id: conversation_id.to_string(),
            stage: self.stage.to_string(),
            preferences: serde_json::to_value(&self.preferences)
                .map_err(|e| PropdeskError::Dialogue(format!("encode preferences: {e}")))?,
            customer_turns: self.customer_turns,
            updated_at: updated_at.to_string(),
        })
    }

}

/// Everything the engine decided for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueOutcome {
    pub reply: String,
    pub stage: Stage,
    pub actions: Vec<String>,
    pub should_create_lead: bool,
    pub should_schedule_follow_up: bool,
    /// What this turn added, as JSON.
    pub extracted_info: serde_json::Value,
    pub confidence: f32,
    pub keyboard: Option<QuickReplies>,
    pub context: DialogueContext,
    pub lead_score: u8,
}

/// Result of the transition table before side-effect flags are derived.
struct Step {
    reply: String,
    stage: Stage,
    actions: Vec<&'static str>,
    follow_up: bool,
    confidence: f32,
}

impl Step {
    fn new(reply: impl Into<String>, stage: Stage, actions: &[&'static str], confidence: f32) -> Self {
        Self {
            reply: reply.into(),
            stage,
            actions: actions.to_vec(),
            follow_up: false,
            confidence,
        }
    }

    fn with_follow_up(mut self) -> Self {
        self.follow_up = true;
        self
    }
}

/// Per-turn facts the transition table reads.
struct Turn<'a> {
    stage: Stage,
    returning: bool,
    /// Name to address the customer by, if known.
    name: Option<&'a str>,
}

/// Deterministic real-estate qualification dialogue.
pub struct DialogueEngine {
    classifier: IntentClassifier,
    returning_threshold: u32,
    scorer: Box<dyn LeadScorer>,
}

impl DialogueEngine {
    pub fn new(crm: &CrmConfig) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            returning_threshold: crm.returning_customer_threshold,
            scorer: Box::new(WeightedLeadScorer::new(crm.scoring.clone())),
        }
    }

    /// Replace the lead scorer.
    pub fn with_scorer(mut self, scorer: Box<dyn LeadScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Rebuild state from prior customer inputs when no row exists, by
    /// running every input through [`process`](Self::process) again.
    pub fn replay(
        &self,
        history: &[DialogueInput],
        customer: &Customer,
    ) -> Result<DialogueState, PropdeskError> {
        history.iter().try_fold(DialogueState::default(), |state, input| {
            self.process(state, input, customer, &[]).map(|(_, next)| next)
        })
    }

    /// True when a customer with `customer_turns` prior turns gets the
    /// returning-customer flow.
    pub fn is_returning(&self, customer_turns: u32) -> bool {
        customer_turns > self.returning_threshold
    }

    /// Process one customer input.
    ///
    /// `recent_messages` are the customer's latest messages including this
    /// one; they feed the behavioral insights only.
    pub fn process(
        &self,
        state: DialogueState,
        input: &DialogueInput,
        customer: &Customer,
        recent_messages: &[String],
    ) -> Result<(DialogueOutcome, DialogueState), PropdeskError> {
        let DialogueState {
            stage: previous,
            mut preferences,
            customer_turns,
        } = state;
        let turn_number = customer_turns.saturating_add(1);
        let returning = self.is_returning(customer_turns);

        let mut found = input.absorb_into(&mut preferences, turn_number);

        let display_name = customer.display_name.trim();
        let name = preferences
            .name
            .clone()
            .or_else(|| (!display_name.is_empty()).then(|| display_name.to_string()));
        let turn = Turn {
            stage: previous,
            returning,
            name: name.as_deref(),
        };

        let step = self.transition(&turn, input, &mut found, &mut preferences);

        let should_create_lead = step.stage == Stage::PropertyMatching
            && previous != Stage::PropertyMatching
            && preferences.is_lead_worthy();
        let mut actions: Vec<String> = step.actions.iter().map(|a| a.to_string()).collect();
        if should_create_lead {
            actions.push("create_lead".to_string());
        }
        if step.follow_up {
            actions.push("schedule_follow_up".to_string());
        }

        let signals = LeadSignals::collect(customer, &preferences);
        let lead_score = self.scorer.score(customer, &signals);

        let context = DialogueContext {
            is_returning_customer: returning,
            preferences: preferences.clone(),
            behavioral_insights: BehavioralInsights::analyze(recent_messages, &preferences),
            lead_journey: LeadJourney::new(step.stage, lead_score, recent_messages),
        };

        let extracted_info = serde_json::to_value(&found)
            .map_err(|e| PropdeskError::Dialogue(format!("encode extracted info: {e}")))?;

        debug!(
            from = %previous,
            to = %step.stage,
            returning,
            lead = should_create_lead,
            score = lead_score,
            "dialogue transition"
        );

        let outcome = DialogueOutcome {
            reply: step.reply,
            stage: step.stage,
            actions,
            should_create_lead,
            should_schedule_follow_up: step.follow_up,
            extracted_info,
            confidence: step.confidence,
            keyboard: keyboard_for(step.stage),
            context,
            lead_score,
        };
        let next = DialogueState {
            stage: step.stage,
            preferences,
            customer_turns: turn_number,
        };
        Ok((outcome, next))
    }

    /// The transition table, keyed by current stage and input kind.
    fn transition(
        &self,
        turn: &Turn<'_>,
        input: &DialogueInput,
        found: &mut Preferences,
        prefs: &mut Preferences,
    ) -> Step {
        match input {
            DialogueInput::Button(payload) => button_step(payload, prefs),
            DialogueInput::Text(text) => {
                let intent = self.classifier.classify(text).intent;
                match intent {
                    Intent::OptOut => Step::new(
                        "No problem, I won't send you any more property updates. \
                         Message us anytime if you change your mind.",
                        Stage::Closed,
                        &["opt_out"],
                        CONF_OPT_OUT,
                    ),
                    // A visit request that also completes the requirements
                    // goes through matching so the lead is opened.
                    Intent::Schedule
                        if found.has_qualification_facts()
                            && turn.stage != Stage::PropertyMatching
                            && Stage::next_collection(prefs) == Stage::PropertyMatching =>
                    {
                        let summary = prefs.summary().unwrap_or_default();
                        Step::new(
                            format!(
                                "Great! You're looking for {summary}. Let me find the best \
                                 matches, and I'll arrange a site visit for the one you like."
                            ),
                            Stage::PropertyMatching,
                            &["search_properties", "schedule_visit"],
                            CONF_MATCHING,
                        )
                        .with_follow_up()
                    }
                    Intent::Schedule => Step::new(
                        "I'd be happy to arrange a site visit. Which time suits you best?",
                        Stage::Scheduling,
                        &["schedule_visit"],
                        CONF_SCHEDULE,
                    )
                    .with_follow_up(),
                    _ if turn.returning => returning_step(turn, intent, found, prefs),
                    _ => new_customer_step(turn, intent, text, found, prefs),
                }
            }
        }
    }
}

fn new_customer_step(
    turn: &Turn<'_>,
    intent: Intent,
    text: &str,
    found: &mut Preferences,
    prefs: &mut Preferences,
) -> Step {
    let has_facts = found.has_qualification_facts();

    if intent == Intent::Greeting && !has_facts {
        return Step::new(
            "Hello! 👋 I'm here to help you find the right property. May I know your name?",
            Stage::NameCollection,
            &["greet", "collect_name"],
            CONF_GREETING,
        );
    }

    if turn.stage == Stage::NameCollection
        && !has_facts
        && let Some(name) = looks_like_name(text)
    {
        prefs.name = Some(name.clone());
        found.name = Some(name.clone());
        return Step::new(
            format!("Nice to meet you, {name}! What type of property are you looking for?"),
            Stage::Qualification,
            &["collect_name", "collect_property_type"],
            CONF_NAME,
        );
    }

    if has_facts {
        let next = Stage::next_collection(prefs);
        let summary = prefs.summary().unwrap_or_default();
        return match next {
            Stage::PropertyMatching => Step::new(
                format!("Great! You're looking for {summary}. Let me find the best matches for you."),
                next,
                &["search_properties"],
                CONF_MATCHING,
            ),
            Stage::BudgetCollection => Step::new(
                format!("Got it: {summary}. What's your budget range?"),
                next,
                &["collect_budget"],
                CONF_INFO,
            ),
            Stage::LocationCollection => Step::new(
                format!("Noted: {summary}. Which area or locality do you prefer?"),
                next,
                &["collect_location"],
                CONF_INFO,
            ),
            _ => Step::new(
                format!("Noted: {summary}. What type of property are you looking for?"),
                Stage::Qualification,
                &["collect_property_type"],
                CONF_INFO,
            ),
        };
    }

    Step::new(
        "I'd love to help you find a property! Could you tell me the property type, \
         your budget and the area you prefer?",
        Stage::Qualification,
        &["collect_requirements"],
        CONF_FALLBACK,
    )
}

fn returning_step(
    turn: &Turn<'_>,
    intent: Intent,
    found: &Preferences,
    prefs: &Preferences,
) -> Step {
    let name = turn.name.map(|n| format!(", {n}")).unwrap_or_default();
    let summary = prefs.summary();
    let resume = if prefs.has_qualification_facts() {
        Stage::next_collection(prefs)
    } else {
        Stage::Qualification
    };

    match intent {
        Intent::Greeting => {
            let reply = match &summary {
                Some(s) => format!(
                    "Welcome back{name}! Last time you were looking for {s}. \
                     Shall I show you the latest options?"
                ),
                None => format!("Welcome back{name}! What kind of property can I help you find today?"),
            };
            Step::new(reply, resume, &["greet_returning"], CONF_RETURNING)
        }
        Intent::BudgetUpdate if found.has_budget() => {
            let budget = prefs.budget_label().unwrap_or_default();
            let reply = match &summary {
                Some(s) => format!("Updated your budget to {budget}. I'll look for {s}."),
                None => format!("Updated your budget to {budget}."),
            };
            Step::new(reply, resume, &["update_budget"], CONF_RETURNING)
        }
        Intent::PropertyInquiry => {
            let reply = match &summary {
                Some(s) => format!(
                    "Here's what I have on file: {s}. I'll pull up matching properties for you."
                ),
                None => "Happy to help! What type of property are you interested in?".to_string(),
            };
            Step::new(reply, resume, &["search_properties"], CONF_RETURNING)
        }
        _ => {
            let reply = match &summary {
                Some(s) => format!(
                    "Good to hear from you again{name}, I remember you! \
                     We were discussing {s}. How can I help you today?"
                ),
                None => format!("Good to hear from you again{name}, I remember you! How can I help you today?"),
            };
            Step::new(reply, turn.stage, &["acknowledge_returning"], CONF_RETURNING_FALLBACK)
        }
    }
}

fn button_step(payload: &ButtonPayload, prefs: &Preferences) -> Step {
    let summary = prefs.summary().unwrap_or_else(|| "your requirements".to_string());
    match payload {
        ButtonPayload::PropertyType(_) => Step::new(
            format!("{} it is! What's your budget range?", payload.label()),
            Stage::BudgetCollection,
            &["collect_property_type", "collect_budget"],
            CONF_BUTTON,
        ),
        ButtonPayload::Budget(bracket) => Step::new(
            format!(
                "Budget noted: {}. Which area or locality do you prefer?",
                bracket.label()
            ),
            Stage::LocationCollection,
            &["collect_budget", "collect_location"],
            CONF_BUTTON,
        ),
        ButtonPayload::Location(area) if area == "other" => Step::new(
            "Sure, please type the area or locality you're interested in.",
            Stage::LocationCollection,
            &["collect_location"],
            CONF_BUTTON,
        ),
        ButtonPayload::Location(_) => Step::new(
            format!(
                "{} is a great choice! Let me find the best matches for {summary}.",
                payload.label()
            ),
            Stage::PropertyMatching,
            &["collect_location", "search_properties"],
            CONF_BUTTON,
        ),
        ButtonPayload::ShowProperties => Step::new(
            format!("Here are properties matching {summary}. Our team will share detailed listings shortly."),
            Stage::PropertyMatching,
            &["show_properties"],
            CONF_BUTTON,
        ),
        ButtonPayload::ScheduleVisit => Step::new(
            "When would you like to visit? Pick a time slot.",
            Stage::Scheduling,
            &["schedule_visit"],
            CONF_BUTTON,
        )
        .with_follow_up(),
        ButtonPayload::RequestCallback => Step::new(
            "When should our advisor call you? Pick a time slot.",
            Stage::Scheduling,
            &["request_callback"],
            CONF_BUTTON,
        ),
        ButtonPayload::CallbackSlot(slot) => Step::new(
            format!(
                "Done! Our property advisor will call you in the {}.",
                slot.replace('_', " ")
            ),
            Stage::FollowUp,
            &["schedule_callback"],
            CONF_BUTTON,
        )
        .with_follow_up(),
        ButtonPayload::Unknown(_) => Step::new(
            "Sorry, I didn't catch that. What type of property are you looking for?",
            Stage::Qualification,
            &["unknown_button"],
            CONF_FALLBACK,
        ),
    }
}

/// Preference fragment a button press states.
fn button_preferences(payload: &ButtonPayload) -> Preferences {
    let mut fragment = Preferences::default();
    match payload {
        ButtonPayload::PropertyType(kind) => fragment.property_type = Some(kind.clone()),
        ButtonPayload::Budget(bracket) => {
            let (min, max) = bracket.bounds();
            fragment.budget_min = min;
            fragment.budget_max = max;
        }
        ButtonPayload::Location(area) if area != "other" => {
            let city = AREAS
                .iter()
                .find(|(a, _)| a == area)
                .map(|(_, c)| (*c).to_string());
            fragment.area_preference = Some(area.clone());
            fragment.city = city;
        }
        _ => {}
    }
    fragment
}

/// A short alphabetic reply (at most three words) read as the customer's name.
fn looks_like_name(text: &str) -> Option<String> {
    let trimmed = text.trim().trim_end_matches(['.', '!']);
    let words = trimmed.split_whitespace().count();
    if !(1..=3).contains(&words) {
        return None;
    }
    if !trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return None;
    }
    if NOT_NAMES.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }
    Some(title_case(&trimmed.to_lowercase()))
}
