//! Group posts and the comments under them.
//!
//! A post belongs to exactly one author and one group; a comment to one author
//! and one post. Deleting a post removes its comments.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entity::{comment, post};
use crate::error::{require, StoreResult};

use super::{delete_by_id, find_by_id, Repository};

/// Fields of a new post. `title` and `description` must not be blank, and both
/// referenced rows must exist.
#[derive(Clone, Debug, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub group_id: i32,
}

/// Fields of a new comment on `post_id`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub user_id: i32,
    pub post_id: i32,
}

/// Posts, queried by author or by group.
#[derive(Debug, Clone, Copy)]
pub struct PostStore<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> PostStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Posts written by `user_id`, oldest first.
    ///
    /// # Parameters
    ///
    /// * `user_id` - The author. An unknown id yields an empty list, not an error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use recipe_social_store::CommunityStore;
    ///
    /// # async fn example(store: CommunityStore) -> Result<(), Box<dyn std::error::Error>> {
    /// for post in store.posts().posts_by_author(1).await? {
    ///     println!("{}: {}", post.id, post.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn posts_by_author(&self, user_id: i32) -> StoreResult<Vec<post::Model>> {
        Ok(post::Entity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_asc(post::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Posts in `group_id`, oldest first.
    pub async fn posts_in_group(&self, group_id: i32) -> StoreResult<Vec<post::Model>> {
        Ok(post::Entity::find()
            .filter(post::Column::GroupId.eq(group_id))
            .order_by_asc(post::Column::Id)
            .all(self.conn)
            .await?)
    }
}

#[async_trait]
impl<'a> Repository for PostStore<'a> {
    type Model = post::Model;
    type NewRecord = NewPost;

    async fn create(&self, record: NewPost) -> StoreResult<post::Model> {
        require("title", &record.title)?;
        require("description", &record.description)?;

        let post = post::ActiveModel {
            title: Set(record.title),
            description: Set(record.description),
            user_id: Set(record.user_id),
            group_id: Set(record.group_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(post_id = post.id, group_id = post.group_id, "created post");
        Ok(post)
    }

    async fn get(&self, id: i32) -> StoreResult<post::Model> {
        find_by_id::<post::Entity, _>(self.conn, id, "post").await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<post::Entity, _>(self.conn, id, "post").await
    }
}

/// Comments, queried by post or by author.
#[derive(Debug, Clone, Copy)]
pub struct CommentStore<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> CommentStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The thread under `post_id`, oldest first.
    pub async fn comments_on_post(&self, post_id: i32) -> StoreResult<Vec<comment::Model>> {
        Ok(comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Comments written by `user_id`, oldest first.
    pub async fn comments_by_author(&self, user_id: i32) -> StoreResult<Vec<comment::Model>> {
        Ok(comment::Entity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .order_by_asc(comment::Column::Id)
            .all(self.conn)
            .await?)
    }
}

#[async_trait]
impl<'a> Repository for CommentStore<'a> {
    type Model = comment::Model;
    type NewRecord = NewComment;

    async fn create(&self, record: NewComment) -> StoreResult<comment::Model> {
        require("content", &record.content)?;

        let comment = comment::ActiveModel {
            content: Set(record.content),
            user_id: Set(record.user_id),
            post_id: Set(record.post_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(comment_id = comment.id, post_id = comment.post_id, "created comment");
        Ok(comment)
    }

    async fn get(&self, id: i32) -> StoreResult<comment::Model> {
        find_by_id::<comment::Entity, _>(self.conn, id, "comment").await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<comment::Entity, _>(self.conn, id, "comment").await
    }
}
