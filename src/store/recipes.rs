//! Recipes. Ingredients and instructions are kept in JSON columns and always
//! served as lists.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entity::recipe::{self, Lines, RecipeView};
use crate::entity::{saved_recipe, user};
use crate::error::{require, StoreError, StoreResult};

use super::{delete_by_id, find_by_id, Repository};

const ENTITY: &str = "recipe";

/// Fields of a new recipe. Ingredients and instructions may be given as a
/// list or as one newline-delimited string and are stored as given.
#[derive(Clone, Debug, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub summary: String,
    pub ingredients: Lines,
    pub instructions: Lines,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Recipes and the users who bookmarked them.
#[derive(Debug, Clone, Copy)]
pub struct RecipeStore<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> RecipeStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Every recipe, in creation order.
    pub async fn all(&self) -> StoreResult<Vec<recipe::Model>> {
        Ok(recipe::Entity::find()
            .order_by_asc(recipe::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Outward-facing form of `recipe`, with ingredients and instructions
    /// split into lists whichever way they were stored.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use recipe_social_store::{CommunityStore, Repository};
    ///
    /// # async fn example(store: CommunityStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let recipes = store.recipes();
    /// let recipe = recipes.get(1).await?;
    /// let json = serde_json::to_value(recipes.serialize(&recipe))?;
    /// assert!(json["ingredients"].is_array());
    /// # Ok(())
    /// # }
    /// ```
    pub fn serialize(&self, recipe: &recipe::Model) -> RecipeView {
        recipe.view()
    }

    /// Users who bookmarked `recipe_id`, in bookmark order.
    pub async fn saved_by(&self, recipe_id: i32) -> StoreResult<Vec<user::UserSummary>> {
        let users = user::Entity::find()
            .join(JoinType::InnerJoin, user::Relation::SavedRecipe.def())
            .filter(saved_recipe::Column::RecipeId.eq(recipe_id))
            .order_by_asc(saved_recipe::Column::Id)
            .all(self.conn)
            .await?;
        Ok(users.iter().map(user::UserSummary::from).collect())
    }
}

#[async_trait]
impl<'a> Repository for RecipeStore<'a> {
    type Model = recipe::Model;
    type NewRecord = NewRecipe;

    async fn create(&self, record: NewRecipe) -> StoreResult<recipe::Model> {
        require("title", &record.title)?;
        require("summary", &record.summary)?;
        if record.ingredients.is_blank() {
            return Err(StoreError::missing("ingredients"));
        }
        if record.instructions.is_blank() {
            return Err(StoreError::missing("instructions"));
        }

        let recipe = recipe::ActiveModel {
            title: Set(record.title),
            summary: Set(record.summary),
            ingredients: Set(record.ingredients.to_json()),
            instructions: Set(record.instructions.to_json()),
            image_url: Set(record.image_url),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(recipe_id = recipe.id, "created recipe");
        Ok(recipe)
    }

    async fn get(&self, id: i32) -> StoreResult<recipe::Model> {
        find_by_id::<recipe::Entity, _>(self.conn, id, ENTITY).await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<recipe::Entity, _>(self.conn, id, ENTITY).await
    }
}
