use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Utilisateurs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Utilisateurs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::FirstName)
                            .string_len(150)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::LastName)
                            .string_len(150)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::Email)
                            .string_len(254)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::Role)
                            .string_len(15)
                            .not_null()
                            .check(Expr::col(Utilisateurs::Role).is_in(["ETUDIANT", "PROFESSEUR"])),
                    )
                    .col(ColumnDef::new(Utilisateurs::ServiceRattachementId).uuid().null())
                    .col(
                        ColumnDef::new(Utilisateurs::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::IsSuperuser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::DateJoined)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Utilisateurs::LastLogin)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_utilisateurs_service_rattachement")
                            .from(Utilisateurs::Table, Utilisateurs::ServiceRattachementId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Utilisateurs::Table)
                    .col(Utilisateurs::ServiceRattachementId)
                    .name("idx_utilisateurs_service_rattachement_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Utilisateurs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Utilisateurs {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Email,
    Role,
    ServiceRattachementId,
    IsStaff,
    IsSuperuser,
    IsActive,
    DateJoined,
    LastLogin,
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
}
