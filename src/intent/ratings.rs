//! Rating intents: rate tonight's dinner, recall ratings, and rank meals.

use crate::db::{Dinner, DinnerAverage, User};
use crate::AppState;

use super::{today, IntentRequest, IntentResponse};

/// Ratings strictly below this get the better-luck-tomorrow response.
const LOW_RATING_CUTOFF: i64 = 5;
/// Ratings strictly above this get the enthusiastic response.
const HIGH_RATING_CUTOFF: i64 = 7;

const DEFAULT_TOP_MEALS: usize = 5;

/// Rate the dinner set for a date (default today). Out-of-range ratings are
/// restated without writing; a missing dinner is a spoken non-event.
pub async fn rate_dinner(
    state: &AppState,
    user: &User,
    req: &IntentRequest,
) -> Result<IntentResponse, sqlx::Error> {
    let Some(rating) = req.slot_integer("rating") else {
        return Ok(IntentResponse::question(
            "How would you rate tonight's dinner?",
        ));
    };

    let scale_max = state.config.ratings.scale_max;
    if rating < 0 || rating > scale_max {
        return Ok(IntentResponse::question(format!(
            "Ratings go from 0 to {}. How would you rate tonight's dinner?",
            scale_max
        )));
    }

    let date = req
        .slot_date("date")
        .map(|d| d.to_string())
        .unwrap_or_else(today);

    if !Dinner::set_rating(&state.db, user.id, rating, &date).await? {
        return Ok(IntentResponse::statement("You had no dinner set."));
    }

    let speech_text = if rating < LOW_RATING_CUTOFF {
        "Thanks. Hopefully tomorrow's dinner will be better!"
    } else if rating > HIGH_RATING_CUTOFF {
        "Awesome! Glad you enjoyed it. Your rating has been saved."
    } else {
        "Thanks! Your rating has been saved."
    };

    Ok(IntentResponse::statement(speech_text))
}

/// Speak the rating of the dinner for a date (default today).
pub async fn rating_summary(
    state: &AppState,
    user: &User,
    req: &IntentRequest,
) -> Result<IntentResponse, sqlx::Error> {
    let date = req
        .slot_date("date")
        .map(|d| d.to_string())
        .unwrap_or_else(today);

    let Some(dinner) = Dinner::find_for_date(&state.db, user.id, &date).await? else {
        return Ok(IntentResponse::statement("You had no dinner set."));
    };

    let speech_text = match dinner.rating {
        None => format!("You have no rating for {}.", dinner.name),
        Some(rating) => format!(
            "You rated {} a {} out of {}.",
            dinner.name, rating, state.config.ratings.scale_max
        ),
    };

    Ok(IntentResponse::statement(speech_text))
}

/// Speak the average rating of one dinner across the user's history.
pub async fn average_rating(
    state: &AppState,
    user: &User,
    req: &IntentRequest,
) -> Result<IntentResponse, sqlx::Error> {
    let Some(name) = req.slot_text("dinner") else {
        return Ok(IntentResponse::delegate(
            "Which dinner would you like the average rating for?",
        ));
    };

    let Some(stats) = DinnerAverage::for_name(&state.db, user.id, name).await? else {
        return Ok(IntentResponse::statement(format!(
            "You have never had {}.",
            name
        )));
    };

    let speech_text = if stats.times_rated == 0 {
        format!(
            "You have had {} {} times, but have not rated it before.",
            name, stats.times_had
        )
    } else {
        format!(
            "You have had {} {} times with an average of {:.1} stars.",
            name, stats.times_had, stats.average
        )
    };

    Ok(IntentResponse::statement(speech_text))
}

/// Speak the user's best-rated meals, best first.
pub async fn top_meals(
    state: &AppState,
    user: &User,
    req: &IntentRequest,
) -> Result<IntentResponse, sqlx::Error> {
    let limit = req
        .slot_integer("limit")
        .map(|n| n.max(0) as usize)
        .unwrap_or(DEFAULT_TOP_MEALS);

    let top = DinnerAverage::top_for_user(&state.db, user.id, limit).await?;
    if top.is_empty() {
        return Ok(IntentResponse::statement(
            "You haven't rated any dinners yet.",
        ));
    }

    let ranked: Vec<String> = top
        .iter()
        .map(|meal| format!("{} with {:.1} stars", meal.name, meal.average))
        .collect();

    Ok(IntentResponse::statement(format!(
        "Your top meals are: {}.",
        ranked.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{request, test_state, with_integer_slot, with_text_slot};
    use super::*;
    use crate::intent::ResponseKind;

    async fn resolved_user(state: &AppState) -> User {
        User::resolve(&state.db, "tok1").await.unwrap()
    }

    async fn dinner_today(state: &AppState, user: &User, name: &str) {
        Dinner::upsert(&state.db, user.id, name, &today())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_rating_slot_asks() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let response = rate_dinner(&state, &user, &request("RateDinner"))
            .await
            .unwrap();
        assert_eq!(response.kind, ResponseKind::Question);
    }

    #[tokio::test]
    async fn test_out_of_range_rating_restates_without_write() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        dinner_today(&state, &user, "chicken").await;

        let req = with_integer_slot(request("RateDinner"), "rating", 11);
        let response = rate_dinner(&state, &user, &req).await.unwrap();

        assert_eq!(response.kind, ResponseKind::Question);
        assert!(response.text.contains("0 to 10"));

        let dinner = Dinner::find_for_date(&state.db, user.id, &today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dinner.rating, None);
    }

    #[tokio::test]
    async fn test_negative_rating_rejected() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        dinner_today(&state, &user, "chicken").await;

        let req = with_integer_slot(request("RateDinner"), "rating", -1);
        let response = rate_dinner(&state, &user, &req).await.unwrap();
        assert_eq!(response.kind, ResponseKind::Question);
    }

    #[tokio::test]
    async fn test_rating_without_dinner_is_spoken_failure() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let req = with_integer_slot(request("RateDinner"), "rating", 7);
        let response = rate_dinner(&state, &user, &req).await.unwrap();
        assert_eq!(response.text, "You had no dinner set.");
    }

    #[tokio::test]
    async fn test_rating_feedback_thresholds() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        dinner_today(&state, &user, "chicken").await;

        let low = rate_dinner(&state, &user, &with_integer_slot(request("RateDinner"), "rating", 4))
            .await
            .unwrap();
        assert!(low.text.contains("tomorrow"));

        let neutral =
            rate_dinner(&state, &user, &with_integer_slot(request("RateDinner"), "rating", 7))
                .await
                .unwrap();
        assert_eq!(neutral.text, "Thanks! Your rating has been saved.");

        let high = rate_dinner(&state, &user, &with_integer_slot(request("RateDinner"), "rating", 8))
            .await
            .unwrap();
        assert!(high.text.starts_with("Awesome"));
    }

    #[tokio::test]
    async fn test_summary_no_dinner_set() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let response = rating_summary(&state, &user, &request("GetRatingIntent"))
            .await
            .unwrap();
        assert_eq!(response.text, "You had no dinner set.");
    }

    #[tokio::test]
    async fn test_summary_unrated_dinner_names_the_dinner() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        dinner_today(&state, &user, "chicken").await;

        let response = rating_summary(&state, &user, &request("GetRatingIntent"))
            .await
            .unwrap();
        assert_eq!(response.text, "You have no rating for chicken.");
    }

    #[tokio::test]
    async fn test_summary_speaks_the_rating() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        dinner_today(&state, &user, "chicken").await;
        Dinner::set_rating(&state.db, user.id, 9, &today())
            .await
            .unwrap();

        let response = rating_summary(&state, &user, &request("GetRatingIntent"))
            .await
            .unwrap();
        assert_eq!(response.text, "You rated chicken a 9 out of 10.");
    }

    #[tokio::test]
    async fn test_average_formats_to_one_decimal() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        // Three porks: rated 8, rated 6, unrated. Average over the rated two.
        for (date, rating) in [("2024-01-01", Some(8)), ("2024-01-02", Some(6)), ("2024-01-03", None)]
        {
            Dinner::upsert(&state.db, user.id, "pork", date).await.unwrap();
            if let Some(rating) = rating {
                Dinner::set_rating(&state.db, user.id, rating, date)
                    .await
                    .unwrap();
            }
        }

        let req = with_text_slot(request("AverageRatingIntent"), "dinner", "pork");
        let response = average_rating(&state, &user, &req).await.unwrap();
        assert_eq!(
            response.text,
            "You have had pork 3 times with an average of 7.0 stars."
        );
    }

    #[tokio::test]
    async fn test_average_never_had() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let req = with_text_slot(request("AverageRatingIntent"), "dinner", "sushi");
        let response = average_rating(&state, &user, &req).await.unwrap();
        assert_eq!(response.text, "You have never had sushi.");
    }

    #[tokio::test]
    async fn test_average_had_but_never_rated() {
        let state = test_state().await;
        let user = resolved_user(&state).await;
        Dinner::upsert(&state.db, user.id, "pork", "2024-01-01")
            .await
            .unwrap();
        Dinner::upsert(&state.db, user.id, "pork", "2024-01-02")
            .await
            .unwrap();

        let req = with_text_slot(request("AverageRatingIntent"), "dinner", "pork");
        let response = average_rating(&state, &user, &req).await.unwrap();
        assert_eq!(
            response.text,
            "You have had pork 2 times, but have not rated it before."
        );
    }

    #[tokio::test]
    async fn test_top_meals_with_no_ratings() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        let response = top_meals(&state, &user, &request("TopMealsIntent"))
            .await
            .unwrap();
        assert_eq!(response.text, "You haven't rated any dinners yet.");
    }

    #[tokio::test]
    async fn test_top_meals_speaks_ranked_list() {
        let state = test_state().await;
        let user = resolved_user(&state).await;

        for (date, name, rating) in [
            ("2024-01-01", "chicken", 7),
            ("2024-01-02", "pork", 9),
        ] {
            Dinner::upsert(&state.db, user.id, name, date).await.unwrap();
            Dinner::set_rating(&state.db, user.id, rating, date)
                .await
                .unwrap();
        }

        let req = with_integer_slot(request("TopMealsIntent"), "limit", 20);
        let response = top_meals(&state, &user, &req).await.unwrap();
        assert_eq!(
            response.text,
            "Your top meals are: pork with 9.0 stars, chicken with 7.0 stars."
        );
    }
}
