//! Dinner lookup and the set-dinner decision flow.

use crate::db::{Dinner, User};
use crate::AppState;

use super::{today, ConfirmationStatus, IntentRequest, IntentResponse};

/// Speak today's dinner, or note that nothing is set.
pub async fn todays_dinner(
    state: &AppState,
    user: &User,
) -> Result<IntentResponse, sqlx::Error> {
    let dinner = Dinner::find_for_date(&state.db, user.id, &today()).await?;

    let response = match dinner {
        Some(dinner) => {
            IntentResponse::statement(format!("Tonight you are having {}.", dinner.name))
        }
        None => IntentResponse::statement(
            "You have no dinner set for tonight. You can set one by telling me what you're having.",
        ),
    };

    Ok(response)
}

/// Set (or overwrite) the dinner for a date.
///
/// Flow: a missing dinner slot is delegated back to the dialog manager; an
/// explicit denial closes the turn without writing; overwriting an existing
/// dinner requires a confirmed intent, otherwise the user is asked first.
pub async fn set_dinner_single(
    state: &AppState,
    user: &User,
    req: &IntentRequest,
) -> Result<IntentResponse, sqlx::Error> {
    let Some(name) = req.slot_text("dinner") else {
        return Ok(IntentResponse::delegate(
            "What do you want for dinner tonight?",
        ));
    };

    if req.confirmation_status == ConfirmationStatus::Denied {
        return Ok(IntentResponse::statement("Okay."));
    }

    let date = req
        .slot_date("date")
        .map(|d| d.to_string())
        .unwrap_or_else(today);

    if let Some(existing) = Dinner::find_for_date(&state.db, user.id, &date).await? {
        if req.confirmation_status != ConfirmationStatus::Confirmed {
            return Ok(IntentResponse::question(format!(
                "You already have {} set for tonight. Would you like to change it to {}?",
                existing.name, name
            )));
        }
    }

    Dinner::upsert(&state.db, user.id, name, &date).await?;

    Ok(IntentResponse::statement(
        "Dinner has been set! Don't forget to rate the dinner after!",
    ))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{request, test_state, with_text_slot};
    use super::*;
    use crate::intent::ResponseKind;

    async fn resolved_user(state: &AppState) -> User {
        User::resolve(&state.db, "tok1").await.unwrap()
    }

    #[tokio::test]
    async fn test_todays_dinner_when_nothing_set() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let response = todays_dinner(&state, &user).await.unwrap();
        assert!(response.text.contains("no dinner set"));
    }

    #[tokio::test]
    async fn test_todays_dinner_speaks_the_name() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        Dinner::upsert(&state.db, user.id, "chicken", &today())
            .await
            .unwrap();

        let response = todays_dinner(&state, &user).await.unwrap();
        assert_eq!(response.text, "Tonight you are having chicken.");
    }

    #[tokio::test]
    async fn test_missing_slot_delegates() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let response = set_dinner_single(&state, &user, &request("SetDinnerSingle"))
            .await
            .unwrap();
        assert_eq!(response.kind, ResponseKind::Delegate);
        assert!(!response.should_end_session);
    }

    #[tokio::test]
    async fn test_first_set_writes_and_closes() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        let req = with_text_slot(request("SetDinnerSingle"), "dinner", "pork");

        let response = set_dinner_single(&state, &user, &req).await.unwrap();
        assert_eq!(response.kind, ResponseKind::Statement);

        let dinner = Dinner::find_for_date(&state.db, user.id, &today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dinner.name, "pork");
    }

    #[tokio::test]
    async fn test_existing_dinner_asks_before_overwriting() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        Dinner::upsert(&state.db, user.id, "chicken", &today())
            .await
            .unwrap();

        let req = with_text_slot(request("SetDinnerSingle"), "dinner", "pork");
        let response = set_dinner_single(&state, &user, &req).await.unwrap();

        assert_eq!(response.kind, ResponseKind::Question);
        assert!(response.text.contains("chicken"));
        assert!(response.text.contains("pork"));

        // No write yet.
        let dinner = Dinner::find_for_date(&state.db, user.id, &today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dinner.name, "chicken");
    }

    #[tokio::test]
    async fn test_confirmed_overwrite_writes() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        Dinner::upsert(&state.db, user.id, "chicken", &today())
            .await
            .unwrap();

        let mut req = with_text_slot(request("SetDinnerSingle"), "dinner", "pork");
        req.confirmation_status = ConfirmationStatus::Confirmed;

        let response = set_dinner_single(&state, &user, &req).await.unwrap();
        assert_eq!(response.kind, ResponseKind::Statement);

        let dinner = Dinner::find_for_date(&state.db, user.id, &today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dinner.name, "pork");
    }

    #[tokio::test]
    async fn test_denied_closes_without_write() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        Dinner::upsert(&state.db, user.id, "chicken", &today())
            .await
            .unwrap();

        let mut req = with_text_slot(request("SetDinnerSingle"), "dinner", "pork");
        req.confirmation_status = ConfirmationStatus::Denied;

        let response = set_dinner_single(&state, &user, &req).await.unwrap();
        assert_eq!(response.text, "Okay.");

        let dinner = Dinner::find_for_date(&state.db, user.id, &today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dinner.name, "chicken");
    }

    #[tokio::test]
    async fn test_explicit_date_slot_sets_that_day() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let req = with_text_slot(
            with_text_slot(request("SetDinnerSingle"), "dinner", "pork"),
            "date",
            "2024-01-01",
        );
        set_dinner_single(&state, &user, &req).await.unwrap();

        let dinner = Dinner::find_for_date(&state.db, user.id, "2024-01-01")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dinner.name, "pork");
    }
}
