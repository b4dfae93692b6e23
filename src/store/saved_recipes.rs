//! Recipe bookmarks: the join between users and the recipes they saved.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::entity::{recipe, saved_recipe};
use crate::error::StoreResult;

use super::{delete_by_id, find_by_id, Repository};

const ENTITY: &str = "saved recipe";

/// Bookmarks `recipe_id` for `user_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct NewSavedRecipe {
    pub user_id: i32,
    pub recipe_id: i32,
}

/// Recipe bookmarks.
#[derive(Debug, Clone, Copy)]
pub struct SavedRecipeStore<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> SavedRecipeStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Bookmarks `recipe_id` for `user_id`. Saving the same recipe twice is
    /// an integrity error.
    pub async fn save(&self, user_id: i32, recipe_id: i32) -> StoreResult<saved_recipe::Model> {
        self.create(NewSavedRecipe { user_id, recipe_id }).await
    }

    /// Removes the bookmark, returning whether one existed.
    pub async fn unsave(&self, user_id: i32, recipe_id: i32) -> StoreResult<bool> {
        let result = saved_recipe::Entity::delete_many()
            .filter(saved_recipe::Column::UserId.eq(user_id))
            .filter(saved_recipe::Column::RecipeId.eq(recipe_id))
            .exec(self.conn)
            .await?;
        debug!(user_id, recipe_id, removed = result.rows_affected, "unsaved recipe");
        Ok(result.rows_affected > 0)
    }

    /// Recipes bookmarked by `user_id`, in bookmark order.
    pub async fn recipes_for_user(&self, user_id: i32) -> StoreResult<Vec<recipe::Model>> {
        Ok(recipe::Entity::find()
            .join(JoinType::InnerJoin, recipe::Relation::SavedRecipe.def())
            .filter(saved_recipe::Column::UserId.eq(user_id))
            .order_by_asc(saved_recipe::Column::Id)
            .all(self.conn)
            .await?)
    }
}

#[async_trait]
impl<'a> Repository for SavedRecipeStore<'a> {
    type Model = saved_recipe::Model;
    type NewRecord = NewSavedRecipe;

    async fn create(&self, record: NewSavedRecipe) -> StoreResult<saved_recipe::Model> {
        let saved = saved_recipe::ActiveModel {
            user_id: Set(record.user_id),
            recipe_id: Set(record.recipe_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(user_id = saved.user_id, recipe_id = saved.recipe_id, "saved recipe");
        Ok(saved)
    }

    async fn get(&self, id: i32) -> StoreResult<saved_recipe::Model> {
        find_by_id::<saved_recipe::Entity, _>(self.conn, id, ENTITY).await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<saved_recipe::Entity, _>(self.conn, id, ENTITY).await
    }
}
