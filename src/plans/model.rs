use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One generated meal. The generation service is instructed to emit these
/// fields; anything extra is ignored, anything missing is a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub title: String,
    pub calories: Value,
    pub ingredients: IngredientList,
    pub preparation: String,
    #[serde(default)]
    pub macros: Value,
}

/// Ingredient name/quantity pairs in document order. Quantities come back as
/// strings most of the time but the service is free to emit numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientList(pub Vec<(String, Value)>);

impl IngredientList {
    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.0.iter()
    }
}

/// A single generated day: meal-slot id ("meal1", "meal2", ...) to meal, in
/// document order. The slot order drives every formatted export, so this is
/// an explicit sequence rather than a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealSlots(pub Vec<(String, Meal)>);

impl MealSlots {
    pub fn iter(&self) -> impl Iterator<Item = &(String, Meal)> {
        self.0.iter()
    }
}

/// One day's plan as returned by the generation service: a document whose
/// only top-level key is "day".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: MealSlots,
}

impl Serialize for MealSlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (slot, meal) in &self.0 {
            map.serialize_entry(slot, meal)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MealSlots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SlotsVisitor;

        impl<'de> Visitor<'de> for SlotsVisitor {
            type Value = MealSlots;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of meal-slot ids to meals")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut slots = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((slot, meal)) = access.next_entry::<String, Meal>()? {
                    slots.push((slot, meal));
                }
                Ok(MealSlots(slots))
            }
        }

        deserializer.deserialize_map(SlotsVisitor)
    }
}

impl Serialize for IngredientList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, quantity) in &self.0 {
            map.serialize_entry(name, quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IngredientList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IngredientsVisitor;

        impl<'de> Visitor<'de> for IngredientsVisitor {
            type Value = IngredientList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of ingredient names to quantities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, quantity)) = access.next_entry::<String, Value>()? {
                    pairs.push((name, quantity));
                }
                Ok(IngredientList(pairs))
            }
        }

        deserializer.deserialize_map(IngredientsVisitor)
    }
}

/// Decodes one raw generation response into a day plan.
pub fn parse_day_plan(raw: &str) -> Result<DayPlan, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Decodes a full collection of raw per-day documents, in order. Any bad
/// document fails the whole collection.
pub fn parse_collection(raw_days: &[String]) -> Result<Vec<DayPlan>, serde_json::Error> {
    raw_days.iter().map(|raw| parse_day_plan(raw)).collect()
}

/// Renders a JSON scalar the way it would appear in a text document: strings
/// without quotes, everything else in JSON notation.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_JSON: &str = r#"{"day":{"meal2":{"title":"Rice bowl","calories":500,"ingredients":{"rice":"1 cup","chicken":"150 g"},"preparation":"Cook the rice.","macros":{"protein":"30 g"}},"meal1":{"title":"Omelette","calories":"350 kcal","ingredients":{"eggs":"3"},"preparation":"Whisk and fry.","macros":"light"}}}"#;

    #[test]
    fn parse_preserves_document_order_of_slots_and_ingredients() {
        let plan = parse_day_plan(DAY_JSON).expect("day plan should parse");

        let slots: Vec<&str> = plan.day.iter().map(|(slot, _)| slot.as_str()).collect();
        assert_eq!(slots, vec!["meal2", "meal1"]);

        let (_, first) = &plan.day.0[0];
        let ingredients: Vec<&str> = first.ingredients.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(ingredients, vec!["rice", "chicken"]);
    }

    #[test]
    fn serialize_round_trips_byte_for_byte() {
        let plan = parse_day_plan(DAY_JSON).expect("day plan should parse");
        let encoded = serde_json::to_string(&plan).expect("day plan should encode");
        assert_eq!(encoded, DAY_JSON);
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(parse_day_plan("not json at all").is_err());
        assert!(parse_day_plan(r#"{"day":{"meal1":{"title":"x"}}}"#).is_err());
    }

    #[test]
    fn parse_collection_fails_on_any_bad_document() {
        let days = vec![DAY_JSON.to_string(), "{broken".to_string()];
        assert!(parse_collection(&days).is_err());

        let good = vec![DAY_JSON.to_string(), DAY_JSON.to_string()];
        assert_eq!(parse_collection(&good).expect("should parse").len(), 2);
    }

    #[test]
    fn scalar_text_drops_quotes_from_strings_only() {
        assert_eq!(scalar_text(&Value::String("1 cup".into())), "1 cup");
        assert_eq!(scalar_text(&serde_json::json!(500)), "500");
        assert_eq!(scalar_text(&serde_json::json!(2.5)), "2.5");
    }
}
