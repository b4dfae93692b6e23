//! Database entity models for recipe-social-store.
//!
//! This module contains the Sea-ORM entity definitions, one per table. Relations
//! mirror the foreign keys created by the migration; every dependent row is
//! removed together with its parent (`ON DELETE CASCADE`).
//!
//! ```text
//! users ──< saved_recipes >── recipes
//!   │ ╲
//!   │  ╲──< group_memberships >── groups
//!   │                               │
//!   ├──< posts >────────────────────┘
//!   │      │
//!   └──< comments
//! ```

/// Comments attached to posts.
pub mod comment;

/// Community groups.
pub mod group;

/// Join entity between users and groups.
pub mod group_membership;

/// Posts written inside groups.
pub mod post;

/// Recipes and their list-normalizing view.
pub mod recipe;

/// Join entity between users and the recipes they bookmarked.
pub mod saved_recipe;

/// Users, their credentials and their current session.
pub mod user;
