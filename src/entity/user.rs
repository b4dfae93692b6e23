//! User entity: identity, credentials and the current session.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;

use crate::credentials;

/// A registered user.
///
/// The model deliberately does not implement `Serialize`: the password digest
/// and both tokens must never leave the store. Use [`UserSummary`] or the
/// profile produced by `UserStore::serialize` for outward-facing data.
///
/// # Database Schema
///
/// | Column             | Type                 | Constraint            |
/// |--------------------|----------------------|-----------------------|
/// | id                 | INTEGER (PK)         | autoincrement         |
/// | first_name         | TEXT                 | not null              |
/// | last_name          | TEXT                 | not null              |
/// | username           | TEXT                 | not null, unique      |
/// | password_digest    | TEXT                 | not null              |
/// | image_url          | TEXT                 | nullable              |
/// | session_token      | TEXT                 | not null, unique      |
/// | session_expiration | TIMESTAMPTZ          | not null              |
/// | update_token       | TEXT                 | not null, unique      |
#[derive(Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_digest: String,
    pub image_url: Option<String>,
    #[sea_orm(unique)]
    pub session_token: String,
    pub session_expiration: TimeDateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub update_token: String,
}

impl Model {
    /// True iff `candidate` hashes to the stored digest.
    pub fn verify_password(&self, candidate: &str) -> bool {
        credentials::verify_password(candidate, &self.password_digest)
    }

    /// True iff `token` is the current session token and the session has not
    /// expired yet.
    pub fn verify_session_token(&self, token: &str) -> bool {
        self.verify_session_token_at(token, OffsetDateTime::now_utc())
    }

    /// Same as [`Model::verify_session_token`] with an explicit clock reading.
    /// A session is already expired at the instant of its expiration.
    pub fn verify_session_token_at(&self, token: &str, now: OffsetDateTime) -> bool {
        credentials::tokens_match(token, &self.session_token) && now < self.session_expiration
    }

    /// True iff `token` is the current update token. Update tokens do not
    /// expire; only a session renewal replaces them.
    pub fn verify_update_token(&self, token: &str) -> bool {
        credentials::tokens_match(token, &self.update_token)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary::from(self)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("image_url", &self.image_url)
            .field("session_expiration", &self.session_expiration)
            .finish_non_exhaustive()
    }
}

/// Public view of a user, without related data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<&Model> for UserSummary {
    fn from(user: &Model) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saved_recipe::Entity")]
    SavedRecipe,
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::group_membership::Entity")]
    GroupMembership,
}

impl Related<super::saved_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedRecipe.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::group_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMembership.def()
    }
}

// Bookmarked recipes, through `saved_recipes`.
impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        super::saved_recipe::Relation::Recipe.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::saved_recipe::Relation::User.def().rev())
    }
}

// Groups joined, through `group_memberships`.
impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        super::group_membership::Relation::Group.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::group_membership::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
