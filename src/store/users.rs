//! Identity & session management for users.
//!
//! A user always holds exactly one session token, its expiration, and one
//! update token. Creating an account or logging in issues a fresh set; there
//! is no other way to invalidate the previous tokens than issuing new ones.
//!
//! ```text
//! unauthenticated ── create / login ──> active (expires at T)
//!        active ── time passes ──> expired ── renew_session ──> active (T')
//! ```

use std::fmt;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::credentials;
use crate::entity::recipe::RecipeView;
use crate::entity::{post, user};
use crate::error::{require, StoreError, StoreResult};

use super::{delete_by_id, find_by_id, PostStore, Repository, SavedRecipeStore};

const ENTITY: &str = "user";

/// How many fresh tokens are drawn before a collision is reported.
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Fields needed to register a user. `password` is the plaintext; only its
/// digest is stored.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("image_url", &self.image_url)
            .finish_non_exhaustive()
    }
}

/// Profile fields a holder of the update token may change. `None` leaves a
/// field untouched.
///
/// `image_url` distinguishes a missing field from an explicit `null`:
/// `Some(None)` removes the picture.
///
/// ```
/// use recipe_social_store::ProfileUpdate;
///
/// let clear: ProfileUpdate = serde_json::from_str(r#"{"image_url": null}"#).unwrap();
/// assert_eq!(clear.image_url, Some(None));
///
/// let keep: ProfileUpdate = serde_json::from_str(r#"{"first_name": "Alicia"}"#).unwrap();
/// assert_eq!(keep.image_url, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
}

// Wraps whatever is present, `null` included, so only an absent field is `None`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A user together with their posts and bookmarked recipes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: user::UserSummary,
    pub posts: Vec<post::Model>,
    pub saved_recipes: Vec<RecipeView>,
}

struct IssuedSession {
    session_token: String,
    update_token: String,
    expires_at: OffsetDateTime,
}

/// Identity & session manager: accounts, passwords and tokens.
#[derive(Debug, Clone, Copy)]
pub struct UserStore<'a> {
    conn: &'a DatabaseConnection,
    config: &'a StoreConfig,
}

impl<'a> UserStore<'a> {
    pub(crate) fn new(conn: &'a DatabaseConnection, config: &'a StoreConfig) -> Self {
        Self { conn, config }
    }

    /// Replaces the session token, its expiration and the update token of
    /// `user_id`. The previous tokens stop verifying immediately.
    ///
    /// The three columns are written by a single `UPDATE` so concurrent
    /// renewals of the same user cannot interleave.
    pub async fn renew_session(&self, user_id: i32) -> StoreResult<user::Model> {
        let txn = self.conn.begin().await?;
        let session =
            issue_session(&txn, self.config.session_lifetime, credentials::generate_token).await?;

        let result = user::Entity::update_many()
            .col_expr(user::Column::SessionToken, Expr::value(session.session_token))
            .col_expr(user::Column::SessionExpiration, Expr::value(session.expires_at))
            .col_expr(user::Column::UpdateToken, Expr::value(session.update_token))
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found(ENTITY, user_id));
        }

        let user = find_by_id::<user::Entity, _>(&txn, user_id, ENTITY).await?;
        txn.commit().await?;

        debug!(user_id, expires_at = %user.session_expiration, "renewed session");
        Ok(user)
    }

    /// Checks the password of `username` and, if it matches, starts a new
    /// session. Unknown users and wrong passwords both yield `None`.
    pub async fn login(&self, username: &str, password: &str) -> StoreResult<Option<user::Model>> {
        let Some(user) = self.find_by_username(username).await? else {
            debug!("login for unknown username");
            return Ok(None);
        };
        if !user.verify_password(password) {
            debug!(user_id = user.id, "login with wrong password");
            return Ok(None);
        }
        self.renew_session(user.id).await.map(Some)
    }

    /// Returns the user owning `session_token` while the session is active.
    pub async fn authenticate(&self, session_token: &str) -> StoreResult<Option<user::Model>> {
        let user = user::Entity::find()
            .filter(user::Column::SessionToken.eq(session_token))
            .one(self.conn)
            .await?;
        Ok(user.filter(|user| user.verify_session_token(session_token)))
    }

    /// Returns the user owning `update_token`.
    pub async fn authorize_update(&self, update_token: &str) -> StoreResult<Option<user::Model>> {
        let user = user::Entity::find()
            .filter(user::Column::UpdateToken.eq(update_token))
            .one(self.conn)
            .await?;
        Ok(user.filter(|user| user.verify_update_token(update_token)))
    }

    pub async fn find_by_username(&self, username: &str) -> StoreResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn)
            .await?)
    }

    /// Applies `changes` if `update_token` is the user's current update
    /// token; returns `None` without touching the row otherwise.
    ///
    /// The token check is part of the `UPDATE`'s `WHERE` clause, so a renewal
    /// that commits first revokes the old token for this write as well.
    ///
    /// # Errors
    ///
    /// * [`StoreError::Validation`] when a changed name is blank
    /// * [`StoreError::NotFound`] when `user_id` does not exist
    pub async fn update_profile(
        &self,
        user_id: i32,
        update_token: &str,
        changes: ProfileUpdate,
    ) -> StoreResult<Option<user::Model>> {
        let ProfileUpdate {
            first_name,
            last_name,
            image_url,
        } = changes;

        let mut update = user::Entity::update_many();
        let mut changed = false;
        if let Some(first_name) = first_name {
            require("first_name", &first_name)?;
            update = update.col_expr(user::Column::FirstName, Expr::value(first_name));
            changed = true;
        }
        if let Some(last_name) = last_name {
            require("last_name", &last_name)?;
            update = update.col_expr(user::Column::LastName, Expr::value(last_name));
            changed = true;
        }
        if let Some(image_url) = image_url {
            update = update.col_expr(user::Column::ImageUrl, Expr::value(image_url));
            changed = true;
        }

        let txn = self.conn.begin().await?;
        let applied = if changed {
            update
                .filter(user::Column::Id.eq(user_id))
                .filter(user::Column::UpdateToken.eq(update_token))
                .exec(&txn)
                .await?
                .rows_affected
                > 0
        } else {
            false
        };
        let user = find_by_id::<user::Entity, _>(&txn, user_id, ENTITY).await?;
        txn.commit().await?;

        if !user.verify_update_token(update_token) {
            debug!(user_id, "profile update with a stale update token");
            return Ok(None);
        }
        if applied {
            info!(user_id, "updated profile");
        }
        Ok(Some(user))
    }

    /// The user's posts and bookmarked recipes, read with explicit queries.
    pub async fn profile(&self, user: &user::Model) -> StoreResult<UserProfile> {
        let posts = PostStore::new(self.conn).posts_by_author(user.id).await?;
        let saved_recipes = SavedRecipeStore::new(self.conn)
            .recipes_for_user(user.id)
            .await?
            .iter()
            .map(|recipe| recipe.view())
            .collect();

        Ok(UserProfile {
            user: user.summary(),
            posts,
            saved_recipes,
        })
    }

    /// JSON form of `user`. `full` adds posts and saved recipes. Neither form
    /// carries the password digest or any token.
    pub async fn serialize(&self, user: &user::Model, full: bool) -> StoreResult<serde_json::Value> {
        if full {
            Ok(serde_json::to_value(self.profile(user).await?)?)
        } else {
            Ok(serde_json::to_value(user.summary())?)
        }
    }
}

#[async_trait]
impl<'a> Repository for UserStore<'a> {
    type Model = user::Model;
    type NewRecord = NewUser;

    /// Registers a user and starts their first session.
    ///
    /// # Errors
    ///
    /// * [`StoreError::Validation`] when a name, the username or the password is blank
    /// * [`StoreError::Hashing`] when the password cannot be hashed
    /// * [`StoreError::Integrity`] when the username is already taken
    async fn create(&self, record: NewUser) -> StoreResult<user::Model> {
        require("first_name", &record.first_name)?;
        require("last_name", &record.last_name)?;
        require("username", &record.username)?;
        require("password", &record.password)?;

        let password_digest = credentials::hash_password(&record.password, &self.config.hashing)?;

        let txn = self.conn.begin().await?;
        let session =
            issue_session(&txn, self.config.session_lifetime, credentials::generate_token).await?;

        let user = user::ActiveModel {
            first_name: Set(record.first_name),
            last_name: Set(record.last_name),
            username: Set(record.username),
            password_digest: Set(password_digest),
            image_url: Set(record.image_url),
            session_token: Set(session.session_token),
            session_expiration: Set(session.expires_at),
            update_token: Set(session.update_token),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(user_id = user.id, username = %user.username, "created user");
        Ok(user)
    }

    async fn get(&self, id: i32) -> StoreResult<user::Model> {
        find_by_id::<user::Entity, _>(self.conn, id, ENTITY).await
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        delete_by_id::<user::Entity, _>(self.conn, id, ENTITY).await
    }
}

async fn issue_session<C, G>(db: &C, lifetime: Duration, mut generate: G) -> StoreResult<IssuedSession>
where
    C: ConnectionTrait,
    G: FnMut() -> String + Send,
{
    let session_token = unused_token(db, user::Column::SessionToken, &mut generate).await?;
    let update_token = unused_token(db, user::Column::UpdateToken, &mut generate).await?;
    if session_token == update_token {
        return Err(StoreError::Integrity(
            "session and update token collided".to_string(),
        ));
    }

    Ok(IssuedSession {
        session_token,
        update_token,
        expires_at: OffsetDateTime::now_utc() + lifetime,
    })
}

// Token collision mitigation; the unique constraints remain the final check
async fn unused_token<C, G>(db: &C, column: user::Column, generate: &mut G) -> StoreResult<String>
where
    C: ConnectionTrait,
    G: FnMut() -> String + Send,
{
    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let token = generate();
        let taken = user::Entity::find()
            .filter(column.eq(token.as_str()))
            .count(db)
            .await?
            > 0;
        if !taken {
            return Ok(token);
        }
        warn!(?column, "generated token is already in use; regenerating");
    }

    Err(StoreError::Integrity(format!(
        "no unused {column:?} after {MAX_TOKEN_ATTEMPTS} attempts"
    )))
}
