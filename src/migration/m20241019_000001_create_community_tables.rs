use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Username,
    PasswordDigest,
    ImageUrl,
    SessionToken,
    SessionExpiration,
    UpdateToken,
}

#[derive(DeriveIden)]
enum Recipes {
    Table,
    Id,
    Title,
    Summary,
    Ingredients,
    Instructions,
    ImageUrl,
}

#[derive(DeriveIden)]
enum SavedRecipes {
    Table,
    Id,
    UserId,
    RecipeId,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    Name,
    Description,
    ImageUrl,
}

#[derive(DeriveIden)]
enum GroupMemberships {
    Table,
    Id,
    UserId,
    GroupId,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Description,
    UserId,
    GroupId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    Content,
    UserId,
    PostId,
}

fn id_column<T: IntoIden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(id_column(Users::Id))
                .col(ColumnDef::new(Users::FirstName).string().not_null())
                .col(ColumnDef::new(Users::LastName).string().not_null())
                .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                .col(ColumnDef::new(Users::PasswordDigest).string().not_null())
                .col(ColumnDef::new(Users::ImageUrl).string().null())
                .col(ColumnDef::new(Users::SessionToken).string().not_null().unique_key())
                .col(
                    ColumnDef::new(Users::SessionExpiration)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(ColumnDef::new(Users::UpdateToken).string().not_null().unique_key())
                .to_owned(),
        )
        .await?;

        m.create_table(
            Table::create()
                .table(Recipes::Table)
                .if_not_exists()
                .col(id_column(Recipes::Id))
                .col(ColumnDef::new(Recipes::Title).string().not_null())
                .col(ColumnDef::new(Recipes::Summary).string().not_null())
                .col(ColumnDef::new(Recipes::Ingredients).json().not_null())
                .col(ColumnDef::new(Recipes::Instructions).json().not_null())
                .col(ColumnDef::new(Recipes::ImageUrl).string().null())
                .to_owned(),
        )
        .await?;

        m.create_table(
            Table::create()
                .table(Groups::Table)
                .if_not_exists()
                .col(id_column(Groups::Id))
                .col(ColumnDef::new(Groups::Name).string().not_null().unique_key())
                .col(ColumnDef::new(Groups::Description).string().null())
                .col(ColumnDef::new(Groups::ImageUrl).string().null())
                .to_owned(),
        )
        .await?;

        m.create_table(
            Table::create()
                .table(SavedRecipes::Table)
                .if_not_exists()
                .col(id_column(SavedRecipes::Id))
                .col(ColumnDef::new(SavedRecipes::UserId).integer().not_null())
                .col(ColumnDef::new(SavedRecipes::RecipeId).integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_saved_recipes_user")
                        .from(SavedRecipes::Table, SavedRecipes::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_saved_recipes_recipe")
                        .from(SavedRecipes::Table, SavedRecipes::RecipeId)
                        .to(Recipes::Table, Recipes::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        m.create_table(
            Table::create()
                .table(GroupMemberships::Table)
                .if_not_exists()
                .col(id_column(GroupMemberships::Id))
                .col(ColumnDef::new(GroupMemberships::UserId).integer().not_null())
                .col(ColumnDef::new(GroupMemberships::GroupId).integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_group_memberships_user")
                        .from(GroupMemberships::Table, GroupMemberships::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_group_memberships_group")
                        .from(GroupMemberships::Table, GroupMemberships::GroupId)
                        .to(Groups::Table, Groups::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        m.create_table(
            Table::create()
                .table(Posts::Table)
                .if_not_exists()
                .col(id_column(Posts::Id))
                .col(ColumnDef::new(Posts::Title).string().not_null())
                .col(ColumnDef::new(Posts::Description).string().not_null())
                .col(ColumnDef::new(Posts::UserId).integer().not_null())
                .col(ColumnDef::new(Posts::GroupId).integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_posts_user")
                        .from(Posts::Table, Posts::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_posts_group")
                        .from(Posts::Table, Posts::GroupId)
                        .to(Groups::Table, Groups::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        m.create_table(
            Table::create()
                .table(Comments::Table)
                .if_not_exists()
                .col(id_column(Comments::Id))
                .col(ColumnDef::new(Comments::Content).string().not_null())
                .col(ColumnDef::new(Comments::UserId).integer().not_null())
                .col(ColumnDef::new(Comments::PostId).integer().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_comments_user")
                        .from(Comments::Table, Comments::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_comments_post")
                        .from(Comments::Table, Comments::PostId)
                        .to(Posts::Table, Posts::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

        // One bookmark per (user, recipe) and one membership per (user, group)
        m.create_index(
            Index::create()
                .name("idx_saved_recipes_user_recipe")
                .table(SavedRecipes::Table)
                .col(SavedRecipes::UserId)
                .col(SavedRecipes::RecipeId)
                .unique()
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_group_memberships_user_group")
                .table(GroupMemberships::Table)
                .col(GroupMemberships::UserId)
                .col(GroupMemberships::GroupId)
                .unique()
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_posts_group")
                .table(Posts::Table)
                .col(Posts::GroupId)
                .to_owned(),
        )
        .await?;

        m.create_index(
            Index::create()
                .name("idx_comments_post")
                .table(Comments::Table)
                .col(Comments::PostId)
                .to_owned(),
        )
        .await?;

        Ok(())
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        // Dependents first; indexes go with their tables
        m.drop_table(Table::drop().table(Comments::Table).if_exists().to_owned())
            .await?;
        m.drop_table(Table::drop().table(Posts::Table).if_exists().to_owned())
            .await?;
        m.drop_table(
            Table::drop()
                .table(GroupMemberships::Table)
                .if_exists()
                .to_owned(),
        )
        .await?;
        m.drop_table(Table::drop().table(SavedRecipes::Table).if_exists().to_owned())
            .await?;
        m.drop_table(Table::drop().table(Groups::Table).if_exists().to_owned())
            .await?;
        m.drop_table(Table::drop().table(Recipes::Table).if_exists().to_owned())
            .await?;
        m.drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
