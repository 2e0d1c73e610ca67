use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FichiersMedia::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FichiersMedia::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FichiersMedia::ObservationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FichiersMedia::Fichier)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FichiersMedia::Legende)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FichiersMedia::DateUpload)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fichiers_media_observation")
                            .from(FichiersMedia::Table, FichiersMedia::ObservationId)
                            .to(Observations::Table, Observations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(FichiersMedia::Table)
                    .col(FichiersMedia::ObservationId)
                    .name("idx_fichiers_media_observation_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FichiersMedia::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FichiersMedia {
    Table,
    Id,
    ObservationId,
    Fichier,
    Legende,
    DateUpload,
}

#[derive(Iden)]
enum Observations {
    Table,
    Id,
}
