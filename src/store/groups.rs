//! Community groups and their memberships.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::entity::{group, group_membership, user};
use crate::error::{require, StoreResult};

use super::{delete_by_id, find_by_id, Repository};

/// Fields of a new group. `name` must not be blank and must be unused.
#[derive(Clone, Debug, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Links `user_id` to `group_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct NewMembership {
    pub user_id: i32,
    pub group_id: i32,
}

/// Community groups. Group names are unique.
#[derive(Debug, Clone, Copy)]
pub struct GroupStore<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> GroupStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Looks a group up by its exact name.
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<group::Model>> {
        Ok(group::Entity::find()
            .filter(group::Column::Name.eq(name))
            .one(self.conn)
            .await?)
    }
}

#[async_trait]
impl<'a> Repository for GroupStore<'a> {
    type Model = group::Model;
    type NewRecord = NewGroup;

    async fn create(&self, record: NewGroup) -> StoreResult<group::Model> {
        require("name", &record.name)?;

        let group = group::ActiveModel {
            name: Set(record.name),
            description: Set(record.description),
            image_url: Set(record.image_url),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(group_id = group.id, name = %group.name, "created group");
        Ok(group)
    }

    async fn get(&self, id: i32) -> StoreResult<group::Model> {
        find_by_id::<group::Entity, _>(self.conn, id, "group").await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<group::Entity, _>(self.conn, id, "group").await
    }
}

/// Group memberships. A user joins a group at most once.
#[derive(Debug, Clone, Copy)]
pub struct MembershipStore<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> MembershipStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Adds `user_id` to `group_id`.
    ///
    /// # Returns
    ///
    /// The new membership row.
    ///
    /// # Errors
    ///
    /// [`StoreError::Integrity`](crate::StoreError::Integrity) when the user is
    /// already a member or either row does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use recipe_social_store::CommunityStore;
    ///
    /// # async fn example(store: CommunityStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let bakers = store.groups().find_by_name("Bakers").await?.expect("group exists");
    /// store.memberships().join(1, bakers.id).await?;
    /// assert!(store.memberships().leave(1, bakers.id).await?);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn join(&self, user_id: i32, group_id: i32) -> StoreResult<group_membership::Model> {
        self.create(NewMembership { user_id, group_id }).await
    }

    /// Removes the membership, returning whether one existed.
    pub async fn leave(&self, user_id: i32, group_id: i32) -> StoreResult<bool> {
        let result = group_membership::Entity::delete_many()
            .filter(group_membership::Column::UserId.eq(user_id))
            .filter(group_membership::Column::GroupId.eq(group_id))
            .exec(self.conn)
            .await?;
        debug!(user_id, group_id, removed = result.rows_affected, "left group");
        Ok(result.rows_affected > 0)
    }

    /// Members of `group_id`, in joining order.
    pub async fn members_of(&self, group_id: i32) -> StoreResult<Vec<user::UserSummary>> {
        let users = user::Entity::find()
            .join(JoinType::InnerJoin, user::Relation::GroupMembership.def())
            .filter(group_membership::Column::GroupId.eq(group_id))
            .order_by_asc(group_membership::Column::Id)
            .all(self.conn)
            .await?;
        Ok(users.iter().map(user::UserSummary::from).collect())
    }

    /// Groups `user_id` belongs to, in joining order.
    pub async fn groups_for(&self, user_id: i32) -> StoreResult<Vec<group::Model>> {
        Ok(group::Entity::find()
            .join(JoinType::InnerJoin, group::Relation::GroupMembership.def())
            .filter(group_membership::Column::UserId.eq(user_id))
            .order_by_asc(group_membership::Column::Id)
            .all(self.conn)
            .await?)
    }
}

#[async_trait]
impl<'a> Repository for MembershipStore<'a> {
    type Model = group_membership::Model;
    type NewRecord = NewMembership;

    async fn create(&self, record: NewMembership) -> StoreResult<group_membership::Model> {
        let membership = group_membership::ActiveModel {
            user_id: Set(record.user_id),
            group_id: Set(record.group_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(
            user_id = membership.user_id,
            group_id = membership.group_id,
            "joined group"
        );
        Ok(membership)
    }

    async fn get(&self, id: i32) -> StoreResult<group_membership::Model> {
        find_by_id::<group_membership::Entity, _>(self.conn, id, "group membership").await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<group_membership::Entity, _>(self.conn, id, "group membership").await
    }
}
