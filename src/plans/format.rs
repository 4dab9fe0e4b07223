use super::model::{scalar_text, DayPlan};

/// Flattens parsed day plans into the full recipe transcript: per meal, in
/// slot order, a title line, a calorie line, the ingredient list and the
/// preparation text, with a blank line between meals.
pub fn transcript(plans: &[DayPlan]) -> String {
    let mut text = String::new();
    for day_plan in plans {
        for (_slot, meal) in day_plan.day.iter() {
            text.push_str(&format!("recipe Title: {}\n", meal.title));
            text.push_str(&format!("calories: {}\n", scalar_text(&meal.calories)));
            text.push_str("ingredients:\n");
            for (ingredient, quantity) in meal.ingredients.iter() {
                text.push_str(&format!("- {}: {}\n", ingredient, scalar_text(quantity)));
            }
            text.push_str("preparation:\n");
            text.push_str(&format!("{}\n\n", meal.preparation));
        }
    }
    text
}

/// Flattens parsed day plans into a shopping list grouped by meal. The header
/// number is the last character of the slot id. Duplicate ingredients across
/// meals and days are kept verbatim, never merged.
pub fn shopping_list(plans: &[DayPlan]) -> String {
    let mut text = String::new();
    for day_plan in plans {
        for (slot, meal) in day_plan.day.iter() {
            let display_number = slot.chars().last().map(String::from).unwrap_or_default();
            text.push_str(&format!("Meal {}:\n", display_number));
            for (ingredient, quantity) in meal.ingredients.iter() {
                text.push_str(&format!("{}: {},\n", ingredient, scalar_text(quantity)));
            }
            text.push('\n');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::model::parse_collection;

    fn sample_plans() -> Vec<DayPlan> {
        let day1 = r#"{"day":{"meal1":{"title":"Omelette","calories":"350 kcal","ingredients":{"eggs":"3","butter":"1 tsp"},"preparation":"Whisk the eggs and fry in butter.","macros":{"protein":"21 g"}},"meal2":{"title":"Rice bowl","calories":500,"ingredients":{"rice":"1 cup"},"preparation":"Boil the rice.","macros":{}}}}"#;
        let day2 = r#"{"day":{"meal1":{"title":"Fried rice","calories":620,"ingredients":{"rice":"1 cup","eggs":"2"},"preparation":"Fry everything together.","macros":{}}}}"#;
        parse_collection(&[day1.to_string(), day2.to_string()]).expect("fixtures should parse")
    }

    #[test]
    fn transcript_emits_fields_in_fixed_order() {
        let text = transcript(&sample_plans());
        let expected_start = "recipe Title: Omelette\n\
                              calories: 350 kcal\n\
                              ingredients:\n\
                              - eggs: 3\n\
                              - butter: 1 tsp\n\
                              preparation:\n\
                              Whisk the eggs and fry in butter.\n\n";
        assert!(text.starts_with(expected_start), "got: {text}");
        assert!(text.ends_with("Fry everything together.\n\n"));
    }

    #[test]
    fn shopping_list_matches_expected_shape() {
        let plans = parse_collection(&[r#"{"day":{"meal2":{"title":"Rice bowl","calories":500,"ingredients":{"rice":"1 cup"},"preparation":"Boil.","macros":{}}}}"#.to_string()])
            .expect("fixture should parse");
        let text = shopping_list(&plans);
        assert_eq!(text, "Meal 2:\nrice: 1 cup,\n\n");
    }

    #[test]
    fn shopping_list_keeps_duplicates_across_meals_and_days() {
        let text = shopping_list(&sample_plans());
        let rice_lines = text.matches("rice: 1 cup,").count();
        assert_eq!(rice_lines, 2);
        let egg_lines = text.lines().filter(|l| l.starts_with("eggs:")).count();
        assert_eq!(egg_lines, 2);
    }

    #[test]
    fn formatting_is_deterministic_across_reparses() {
        let plans = sample_plans();
        let stored = serde_json::to_string(&plans).expect("plans should encode");
        let reloaded: Vec<DayPlan> = serde_json::from_str(&stored).expect("plans should decode");

        assert_eq!(transcript(&plans), transcript(&reloaded));
        assert_eq!(shopping_list(&plans), shopping_list(&reloaded));
    }

    #[test]
    fn empty_collection_formats_to_empty_text() {
        assert_eq!(transcript(&[]), "");
        assert_eq!(shopping_list(&[]), "");
    }
}
