#![allow(dead_code)]

use recipe_social_store::migration::{Migrator, MigratorTrait};
use recipe_social_store::{CommunityStore, HashingConfig, NewUser, Repository};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

pub const PASSWORD: &str = "hunter2";

/// Fresh in-memory database with the full schema.
pub async fn connect() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    // A single connection: every new in-memory connection is a separate database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let conn = Database::connect(opt).await.expect("open in-memory sqlite");
    Migrator::up(&conn, None).await.expect("run migrations");
    conn
}

/// Store with a cheap hashing cost so tests stay fast.
pub async fn store() -> CommunityStore {
    CommunityStore::new(connect().await).with_hashing(HashingConfig::new(8, 1, 1))
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        first_name: "Test".into(),
        last_name: username.to_uppercase(),
        username: username.into(),
        password: PASSWORD.into(),
        image_url: None,
    }
}

pub async fn create_user(store: &CommunityStore, username: &str) -> recipe_social_store::entity::user::Model {
    store
        .users()
        .create(new_user(username))
        .await
        .expect("create user")
}
