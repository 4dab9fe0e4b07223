use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::generation::GenerationClient;
use crate::session::SessionStore;

use super::dto::PlanRequest;
use super::model;

/// Builds the per-day prompt. It must carry the exact meal count, the calorie
/// target, the dietary constraints verbatim and the full ingredient
/// whitelist, and it asks for a single JSON object keyed by "day".
pub fn day_prompt(request: &PlanRequest) -> String {
    let dietary = request.dietary.as_deref().unwrap_or("none");
    let ingredients = request.ingredients.join(", ");
    format!(
        "Based on the provided data, please create a detailed meal plan for one day. \
         It should contain {meals} meals, with a total calorie count of about {calories} kcal. \
         All recipes must comply with dietary requirements: {dietary}, and use only ingredients \
         from the list: {ingredients}. Please ensure that each meal includes information about \
         its calorie content, precise units of measurement, and conversions to common kitchen \
         measurement systems (spoon, glass, teaspoon). Please diversify the meals with a \
         detailed description of ingredients, their quantities, and method of preparation, \
         taking into account the proportions of macronutrients. Each meal should be balanced \
         and matched to the calorie content. I want the full number of meals to be included in \
         the response without repetition and without abbreviation. Please write just the plan, \
         without any comments from yourself and do not use markdown. The key in the JSON should \
         be 'day' and the values should be correspondingly numbered 'meal'. Each 'meal' should \
         contain the following information: title, calories, ingredients, preparation, macros. \
         Do not use any ingredient that is not on this list: {ingredients}.",
        meals = request.meals_per_day,
        calories = request.target_calories,
        dietary = dietary,
        ingredients = ingredients,
    )
}

/// Runs the generation pipeline: one sequential generation call per requested
/// day, each response decoded before anything is staged. A failed or
/// malformed day aborts the whole request and leaves the session slots
/// untouched; on success the full collection lands in all three slots.
pub async fn generate_plan(
    generation: &dyn GenerationClient,
    sessions: &SessionStore,
    model_id: &str,
    user_id: Uuid,
    request: &PlanRequest,
) -> Result<Vec<String>, ApiError> {
    let prompt = day_prompt(request);

    let mut plan: Vec<String> = Vec::with_capacity(request.days as usize);
    for day in 0..request.days {
        debug!(%user_id, day, "requesting day plan");
        let raw = generation.complete(&prompt, model_id, true).await?;
        model::parse_day_plan(&raw)?;
        plan.push(raw);
    }

    sessions.stage_plan(user_id, &plan).await;
    info!(%user_id, days = plan.len(), "meal plan staged");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::session::{SLOT_DISPLAY, SLOT_DOWNLOAD, SLOT_SAVE};
    use axum::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DAY_JSON: &str = r#"{"day":{"meal1":{"title":"Chicken and rice","calories":650,"ingredients":{"chicken":"200 g","rice":"1 cup"},"preparation":"Cook the rice, grill the chicken.","macros":{"protein":"45 g"}}}}"#;

    struct ScriptedClient {
        calls: AtomicUsize,
        fail_at: Option<usize>,
        response: &'static str,
    }

    impl ScriptedClient {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_at: None,
                response: DAY_JSON,
            }
        }

        fn failing_at(call: usize) -> Self {
            Self {
                fail_at: Some(call),
                ..Self::ok()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn complete(
            &self,
            _prompt: &str,
            _model: &str,
            _json_object: bool,
        ) -> Result<String, GenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(call) {
                return Err(GenerationError::Api("rate limited".into()));
            }
            Ok(self.response.to_string())
        }
    }

    fn request(days: u32) -> PlanRequest {
        PlanRequest {
            ingredients: vec!["chicken".into(), "rice".into()],
            days,
            meals_per_day: 3,
            target_calories: 2000.0,
            dietary: None,
        }
    }

    #[test]
    fn prompt_encodes_every_constraint() {
        let mut req = request(2);
        req.dietary = Some("lactose intolerant".into());
        let prompt = day_prompt(&req);

        assert!(prompt.contains("contain 3 meals"));
        assert!(prompt.contains("about 2000 kcal"));
        assert!(prompt.contains("dietary requirements: lactose intolerant"));
        assert!(prompt.contains("from the list: chicken, rice"));
        assert!(prompt.contains("The key in the JSON should be 'day'"));
    }

    #[test]
    fn prompt_defaults_dietary_to_none() {
        let prompt = day_prompt(&request(1));
        assert!(prompt.contains("dietary requirements: none"));
    }

    #[tokio::test]
    async fn issues_one_call_per_day_and_stages_all_slots() {
        let client = ScriptedClient::ok();
        let sessions = SessionStore::new();
        let user_id = Uuid::new_v4();

        let plan = generate_plan(&client, &sessions, "test-model", user_id, &request(2))
            .await
            .expect("generation should succeed");

        assert_eq!(client.call_count(), 2);
        assert_eq!(plan.len(), 2);
        for slot in [SLOT_DISPLAY, SLOT_DOWNLOAD, SLOT_SAVE] {
            assert_eq!(sessions.get(user_id, slot).await, Some(plan.clone()));
        }
    }

    #[tokio::test]
    async fn zero_days_stages_an_empty_plan_without_calls() {
        let client = ScriptedClient::ok();
        let sessions = SessionStore::new();
        let user_id = Uuid::new_v4();

        let plan = generate_plan(&client, &sessions, "test-model", user_id, &request(0))
            .await
            .expect("zero days should succeed");

        assert_eq!(client.call_count(), 0);
        assert!(plan.is_empty());
        assert_eq!(sessions.get(user_id, SLOT_DISPLAY).await, Some(vec![]));
    }

    #[tokio::test]
    async fn failed_day_aborts_and_leaves_slots_untouched() {
        let client = ScriptedClient::failing_at(1);
        let sessions = SessionStore::new();
        let user_id = Uuid::new_v4();
        let previous = vec!["{\"day\":{}}".to_string()];
        sessions.stage_plan(user_id, &previous).await;

        let err = generate_plan(&client, &sessions, "test-model", user_id, &request(3))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Generation(_)));
        // The first day had already completed; it must be discarded.
        assert_eq!(client.call_count(), 2);
        for slot in [SLOT_DISPLAY, SLOT_DOWNLOAD, SLOT_SAVE] {
            assert_eq!(sessions.get(user_id, slot).await, Some(previous.clone()));
        }
    }

    #[tokio::test]
    async fn malformed_day_output_fails_before_staging() {
        let client = ScriptedClient {
            calls: AtomicUsize::new(0),
            fail_at: None,
            response: "here is your plan: rice, chicken",
        };
        let sessions = SessionStore::new();
        let user_id = Uuid::new_v4();

        let err = generate_plan(&client, &sessions, "test-model", user_id, &request(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
        assert!(sessions.get(user_id, SLOT_DISPLAY).await.is_none());
    }
}
