//! Recipe entity.
//!
//! Ingredients and instructions are stored as JSON. Older rows hold a single
//! newline-delimited string, newer rows a list of strings; [`Lines`] accepts
//! both and [`Model::view`] always hands out a list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub ingredients: Json,
    pub instructions: Json,
    pub image_url: Option<String>,
}

impl Model {
    /// Serializable form with ingredients and instructions as lists.
    pub fn view(&self) -> RecipeView {
        RecipeView {
            id: self.id,
            title: self.title.clone(),
            summary: self.summary.clone(),
            ingredients: Lines::from_json(&self.ingredients).into_list(),
            instructions: Lines::from_json(&self.instructions).into_list(),
            image_url: self.image_url.clone(),
        }
    }
}

/// A list of lines, given either as a JSON array or as one newline-delimited
/// string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lines {
    List(Vec<String>),
    Text(String),
}

impl Lines {
    /// Reads a stored column value. Non-string array items are kept in their
    /// JSON rendering and `null` reads as an empty list.
    pub fn from_json(value: &Json) -> Self {
        match value {
            Json::String(text) => Self::Text(text.clone()),
            Json::Array(items) => Self::List(
                items
                    .iter()
                    .map(|item| match item {
                        Json::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Json::Null => Self::List(Vec::new()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Self::List(items) => Json::from(items.clone()),
            Self::Text(text) => Json::String(text.clone()),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(text) => text.split('\n').map(str::to_owned).collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::List(items) => items.iter().all(|s| s.trim().is_empty()),
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

impl From<Vec<String>> for Lines {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&str> for Lines {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Serialized recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saved_recipe::Entity")]
    SavedRecipe,
}

impl Related<super::saved_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedRecipe.def()
    }
}

// Users who bookmarked the recipe.
impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::saved_recipe::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::saved_recipe::Relation::Recipe.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe(ingredients: Json, instructions: Json) -> Model {
        Model {
            id: 7,
            title: "Pancakes".into(),
            summary: "Fluffy".into(),
            ingredients,
            instructions,
            image_url: None,
        }
    }

    #[test]
    fn newline_text_becomes_a_list() {
        let view = recipe(json!("a\nb\nc"), json!("mix\nfry")).view();
        assert_eq!(view.ingredients, ["a", "b", "c"]);
        assert_eq!(view.instructions, ["mix", "fry"]);
    }

    #[test]
    fn stored_list_is_returned_unchanged() {
        let view = recipe(json!(["a", "b\nstill b"]), json!([])).view();
        assert_eq!(view.ingredients, ["a", "b\nstill b"]);
        assert!(view.instructions.is_empty());
    }

    #[test]
    fn null_reads_as_empty() {
        assert_eq!(Lines::from_json(&Json::Null).into_list(), Vec::<String>::new());
    }

    #[test]
    fn lines_deserialize_from_either_shape() {
        let list: Lines = serde_json::from_value(json!(["x", "y"])).unwrap();
        let text: Lines = serde_json::from_value(json!("x\ny")).unwrap();
        assert_eq!(list.into_list(), text.into_list());
    }

    #[test]
    fn blank_detection() {
        assert!(Lines::from("  ").is_blank());
        assert!(Lines::from(vec![String::new()]).is_blank());
        assert!(!Lines::from("flour").is_blank());
    }
}
