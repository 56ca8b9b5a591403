//! Normalized intents from the voice platform and the dispatcher that maps
//! them onto store operations.
//!
//! The external dialog manager owns all multi-turn state; every request here
//! is a single-shot transition that ends in exactly one response.

mod dinners;
mod ratings;
mod session;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, warn};

use crate::db::User;
use crate::AppState;

/// A typed slot value extracted from user speech.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Integer(i64),
    Text(String),
}

/// Confirmation state for the current intent, owned by the dialog manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfirmationStatus {
    #[default]
    None,
    Confirmed,
    Denied,
}

/// One normalized user utterance.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentRequest {
    pub intent_name: String,
    #[serde(default)]
    pub slots: HashMap<String, SlotValue>,
    #[serde(default)]
    pub confirmation_status: ConfirmationStatus,
    pub external_user_token: String,
}

impl IntentRequest {
    /// String slot, if present and non-empty.
    pub fn slot_text(&self, name: &str) -> Option<&str> {
        match self.slots.get(name) {
            Some(SlotValue::Text(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer slot. Spoken numbers may arrive as digits-in-a-string, so a
    /// parsable text slot also counts.
    pub fn slot_integer(&self, name: &str) -> Option<i64> {
        match self.slots.get(name) {
            Some(SlotValue::Integer(n)) => Some(*n),
            Some(SlotValue::Text(s)) => s.trim().parse().ok(),
            None => None,
        }
    }

    /// Calendar-date slot (ISO YYYY-MM-DD).
    pub fn slot_date(&self, name: &str) -> Option<NaiveDate> {
        self.slot_text(name)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseKind {
    /// Closing statement; ends the interaction turn.
    Statement,
    /// Follow-up question; keeps the session open.
    Question,
    /// Hand the prompt for a missing slot back to the dialog manager.
    Delegate,
}

/// The single response returned for an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    pub kind: ResponseKind,
    pub text: String,
    pub should_end_session: bool,
}

impl IntentResponse {
    pub fn statement(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Statement,
            text: text.into(),
            should_end_session: true,
        }
    }

    pub fn question(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Question,
            text: text.into(),
            should_end_session: false,
        }
    }

    pub fn delegate(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Delegate,
            text: text.into(),
            should_end_session: false,
        }
    }
}

/// Today's date in the server's local calendar, as stored in the database.
pub(crate) fn today() -> String {
    Local::now().date_naive().to_string()
}

/// Handle one normalized intent. Store failures never surface to the user:
/// they are logged and rendered as a generic apology that ends the session.
pub async fn dispatch(state: &AppState, req: &IntentRequest) -> IntentResponse {
    match route(state, req).await {
        Ok(response) => response,
        Err(e) => {
            error!(intent = %req.intent_name, "Intent handling failed: {}", e);
            IntentResponse::statement("Sorry, something went wrong on my end. Please try again later.")
        }
    }
}

async fn route(state: &AppState, req: &IntentRequest) -> Result<IntentResponse, sqlx::Error> {
    // Launch greets differently for first contact, so it resolves the user
    // itself. Every other intent gets a resolved user up front.
    if req.intent_name == "LaunchRequest" {
        return session::launch(state, req).await;
    }

    let user = User::resolve(&state.db, &req.external_user_token).await?;

    match req.intent_name.as_str() {
        "TodayDinnerIntent" => dinners::todays_dinner(state, &user).await,
        "SetDinnerSingle" => dinners::set_dinner_single(state, &user, req).await,
        "RateDinner" => ratings::rate_dinner(state, &user, req).await,
        "GetRatingIntent" => ratings::rating_summary(state, &user, req).await,
        "AverageRatingIntent" => ratings::average_rating(state, &user, req).await,
        "TopMealsIntent" => ratings::top_meals(state, &user, req).await,
        "AMAZON.HelpIntent" => Ok(session::help()),
        "AMAZON.CancelIntent" | "AMAZON.StopIntent" => Ok(session::goodbye()),
        "SessionEndedRequest" => Ok(session::session_ended()),
        other => {
            warn!(intent = other, "Unrecognized intent");
            Ok(session::fallback())
        }
    }
}
