//! Menu file format accepted by `seed`.
//!
//! ```json
//! {
//!   "menu": {
//!     "sections": [
//!       {
//!         "name": "Classics",
//!         "drinks": [
//!           {
//!             "name": "Negroni",
//!             "description": "Bitter and bright",
//!             "ingredients": [{ "item": "Gin", "amount_cl": 3 }],
//!             "method": "Stir over ice and strain",
//!             "image": "negroni.png"
//!           }
//!         ]
//!       }
//!     ]
//!   }
//! }
//! ```

use bartender_core::types::DbId;
use bartender_db::models::drink::CreateDrink;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct MenuFile {
    pub menu: Menu,
}

#[derive(Debug, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub sections: Vec<MenuSection>,
}

#[derive(Debug, Deserialize)]
pub struct MenuSection {
    pub name: String,
    #[serde(default)]
    pub drinks: Vec<MenuDrink>,
}

#[derive(Debug, Deserialize)]
pub struct MenuDrink {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<MenuIngredient>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    /// Image file name, resolved against `seed --images-dir`.
    #[serde(default)]
    pub image: Option<String>,
}

/// `amount_cl` is usually a number of centilitres but may be free text
/// such as `"top"` or `"2 dashes"`.
#[derive(Debug, Deserialize)]
pub struct MenuIngredient {
    pub item: String,
    #[serde(default)]
    pub amount_cl: Value,
}

fn active_by_default() -> bool {
    true
}

impl MenuFile {
    pub fn section_names(&self) -> Vec<String> {
        self.menu.sections.iter().map(|s| s.name.clone()).collect()
    }
}

impl MenuIngredient {
    fn amount(&self) -> String {
        match &self.amount_cl {
            Value::Number(n) => format!("{n} cl"),
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl MenuDrink {
    /// Structured recipe: ingredient amounts plus the method as a single step.
    pub fn recipe(&self) -> Value {
        let ingredients: Vec<Value> = self
            .ingredients
            .iter()
            .map(|i| json!({ "name": i.item, "amount": i.amount() }))
            .collect();

        let steps: Vec<Value> = match self.method.as_deref().map(str::trim) {
            Some(method) if !method.is_empty() => {
                vec![json!({ "order": 1, "instruction": method })]
            }
            _ => Vec::new(),
        };

        json!({ "ingredients": ingredients, "steps": steps })
    }

    pub fn to_create(&self, section_id: DbId) -> CreateDrink {
        let names: Vec<&str> = self.ingredients.iter().map(|i| i.item.as_str()).collect();
        CreateDrink {
            section_id,
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            ingredients: json!(names),
            recipe: Some(self.recipe()),
            image_url: String::new(),
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bartender_core::recipe::validate_recipe;

    use super::*;

    const SAMPLE: &str = r#"{
        "menu": {
            "sections": [
                {
                    "name": "Classics",
                    "drinks": [
                        {
                            "name": " Negroni ",
                            "description": "Bitter and bright",
                            "ingredients": [
                                { "item": "Gin", "amount_cl": 3 },
                                { "item": "Campari", "amount_cl": 2.5 },
                                { "item": "Orange peel", "amount_cl": "garnish" }
                            ],
                            "method": "Stir over ice and strain"
                        },
                        {
                            "name": "House Special",
                            "ingredients": [],
                            "is_active": false
                        }
                    ]
                },
                { "name": "Alcohol Free" }
            ]
        }
    }"#;

    fn sample() -> MenuFile {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn sections_keep_file_order() {
        assert_eq!(sample().section_names(), vec!["Classics", "Alcohol Free"]);
    }

    #[test]
    fn numeric_amounts_become_centilitres() {
        let menu = sample();
        let recipe = menu.menu.sections[0].drinks[0].recipe();

        assert_eq!(recipe["ingredients"][0], json!({ "name": "Gin", "amount": "3 cl" }));
        assert_eq!(recipe["ingredients"][1]["amount"], "2.5 cl");
        assert_eq!(recipe["ingredients"][2]["amount"], "garnish");
        assert_eq!(
            recipe["steps"],
            json!([{ "order": 1, "instruction": "Stir over ice and strain" }])
        );
    }

    #[test]
    fn seeded_recipes_pass_validation() {
        let menu = sample();
        for drink in &menu.menu.sections[0].drinks {
            assert_matches!(validate_recipe(&drink.recipe()), Ok(Some(_)));
        }
    }

    #[test]
    fn create_dto_lists_ingredient_names() {
        let menu = sample();
        let section_id = DbId::nil();

        let negroni = menu.menu.sections[0].drinks[0].to_create(section_id);
        assert_eq!(negroni.name, "Negroni");
        assert_eq!(negroni.ingredients, json!(["Gin", "Campari", "Orange peel"]));
        assert!(negroni.is_active);
        assert!(negroni.image_url.is_empty());

        let special = menu.menu.sections[0].drinks[1].to_create(section_id);
        assert!(!special.is_active);
        assert_eq!(special.description, "");
        assert_eq!(special.recipe.unwrap()["steps"], json!([]));
    }

    #[test]
    fn missing_menu_key_is_rejected() {
        assert!(serde_json::from_str::<MenuFile>(r#"{"sections": []}"#).is_err());
    }
}
