//! # Recipe Social Store
//!
//! The persistence layer of a recipe-sharing community, built on
//! [Sea-ORM](https://crates.io/crates/sea-orm): users, recipes, recipe
//! bookmarks, groups, group memberships, posts and comments.
//!
//! The only entity with behaviour is the user. Each user carries a salted
//! Argon2id password digest, a session token that expires after a configurable
//! lifetime (one day by default), and an update token that authorizes profile
//! changes and never expires on its own. Renewing the session replaces both
//! tokens at once.
//!
//! ## Features
//!
//! - One repository per entity behind the [`Repository`] trait (create, fetch by id, delete)
//! - Explicit relationship queries (a user's posts, a group's members, ...)
//! - Password hashing and constant-time token checks
//! - Atomic session renewal with token collision mitigation
//! - Schema migrations through `sea-orm-migration` (feature `migration`)
//! - PostgreSQL (default) or SQLite (feature `sqlite`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use recipe_social_store::{CommunityStore, DatabaseConfig, NewUser, Repository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads DATABASE_URL (and an optional .env), connects and runs migrations
//! let store = CommunityStore::connect(&DatabaseConfig::from_env()?).await?;
//!
//! let user = store
//!     .users()
//!     .create(NewUser {
//!         first_name: "Alice".into(),
//!         last_name: "Liddell".into(),
//!         username: "alice".into(),
//!         password: "hunter2".into(),
//!         image_url: None,
//!     })
//!     .await?;
//!
//! // A new account is logged in straight away
//! assert!(user.verify_session_token(&user.session_token));
//! # Ok(())
//! # }
//! ```
//!
//! ## Sessions
//!
//! ```no_run
//! use recipe_social_store::CommunityStore;
//!
//! # async fn example(store: CommunityStore) -> Result<(), Box<dyn std::error::Error>> {
//! let users = store.users();
//!
//! // Log in: checks the password and issues new tokens
//! if let Some(user) = users.login("alice", "hunter2").await? {
//!     // Later requests present the session token
//!     let current = users.authenticate(&user.session_token).await?;
//!     assert_eq!(current.map(|u| u.id), Some(user.id));
//!
//!     // Expired or not, a renewal starts a fresh session
//!     let renewed = users.renew_session(user.id).await?;
//!     assert!(!renewed.verify_session_token(&user.session_token));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod entity;
pub mod error;
#[cfg(feature = "migration")]
pub mod migration;
mod store;

pub use config::{DatabaseConfig, HashingConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use store::{
    CommentStore, CommunityStore, GroupStore, MembershipStore, NewComment, NewGroup,
    NewMembership, NewPost, NewRecipe, NewSavedRecipe, NewUser, PostStore, ProfileUpdate,
    RecipeStore, Repository, SavedRecipeStore, UserProfile, UserStore,
};

/// Recipe ingredient/instruction lists and their serialized form.
pub use entity::recipe::{Lines, RecipeView};

/// Public view of a user.
pub use entity::user::UserSummary;
