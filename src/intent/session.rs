//! Session open/close intents: launch greeting, help, and goodbyes.

use crate::db::User;
use crate::AppState;

use super::{IntentRequest, IntentResponse};

/// Greet the user, creating the account on first contact.
pub async fn launch(
    state: &AppState,
    req: &IntentRequest,
) -> Result<IntentResponse, sqlx::Error> {
    let returning = User::exists(&state.db, &req.external_user_token).await;
    User::resolve(&state.db, &req.external_user_token).await?;

    let speech_text = if returning {
        "Welcome back to Kitchenly! Would you like to hear what's on the menu for tonight?"
    } else {
        "Welcome to Kitchenly! Would you like to hear what's on the menu for tonight?"
    };

    Ok(IntentResponse::question(speech_text))
}

pub fn help() -> IntentResponse {
    IntentResponse::statement(
        "Kitchenly is a skill that allows you to track your dinner plans. \
         You can set dinner by saying 'Today, I will be having the chicken souvlaki'. \
         You can hear what you are having for dinner by asking, 'what am I having for dinner?' \
         You can rate your dinner by saying, 'rate tonight's dinner as a 4'.",
    )
}

pub fn goodbye() -> IntentResponse {
    IntentResponse::statement("Goodbye")
}

pub fn session_ended() -> IntentResponse {
    IntentResponse::statement("")
}

pub fn fallback() -> IntentResponse {
    IntentResponse::question(
        "Sorry, I didn't catch that. You can set tonight's dinner, rate it, \
         or ask for your top meals.",
    )
}
