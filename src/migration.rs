//! Schema migrations, run with [`Migrator`].
//!
//! ```no_run
//! use recipe_social_store::migration::{Migrator, MigratorTrait};
//!
//! # async fn example(conn: sea_orm::DatabaseConnection) -> Result<(), sea_orm::DbErr> {
//! Migrator::up(&conn, None).await?;
//! # Ok(())
//! # }
//! ```

pub use sea_orm_migration::prelude::*;

mod m20241019_000001_create_community_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Override the name of migration table to avoid conflicts
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("recipe_social_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241019_000001_create_community_tables::Migration)]
    }
}
