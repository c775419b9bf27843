// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-only auto-reply used when the dialogue engine is disabled or fails.
//!
//! No stage tracking and no preference state: the reply depends on the
//! current message alone.

const GREETINGS: &[&str] = &["hi", "hello", "hey", "namaste", "good morning", "good evening"];
const PRICE: &[&str] = &["price", "cost", "budget", "lakh", "crore", "rate"];
const VISIT: &[&str] = &["visit", "schedule", "appointment", "see"];
const PROPERTY: &[&str] = &["apartment", "flat", "villa", "house", "plot", "bhk", "property"];
const THANKS: &[&str] = &["thank", "thanks", "great", "ok"];

/// Reply for `text` chosen by the first matching keyword group.
pub fn fallback_reply(text: &str) -> String {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |list: &[&str]| list.iter().any(|k| words.contains(k) || (k.contains(' ') && lower.contains(k)));

    let reply = if has(GREETINGS) {
        "Hello! Thanks for reaching out. Tell me what kind of property you're looking for and \
         one of our advisors will help you."
    } else if has(PRICE) {
        "Our properties span a wide range of budgets. Share your budget and preferred area and \
         we'll send you matching options."
    } else if has(VISIT) {
        "We'd be glad to arrange a site visit. Our team will contact you shortly to fix a time."
    } else if has(PROPERTY) {
        "Thanks for your interest! Our advisor will share the best matching properties with you \
         shortly."
    } else if has(THANKS) {
        "You're welcome! Let us know if there's anything else we can help with."
    } else {
        "Thanks for your message! One of our property advisors will get back to you soon."
    };
    reply.to_string()
}
