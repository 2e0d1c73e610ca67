use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Evaluations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::ObservationId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Evaluations::ProfesseurId).uuid().null())
                    .col(
                        ColumnDef::new(Evaluations::CommentairesGeneraux)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Evaluations::DateEvaluation)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evaluations_observation")
                            .from(Evaluations::Table, Evaluations::ObservationId)
                            .to(Observations::Table, Observations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evaluations_professeur")
                            .from(Evaluations::Table, Evaluations::ProfesseurId)
                            .to(Utilisateurs::Table, Utilisateurs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Evaluations::Table)
                    .col(Evaluations::ProfesseurId)
                    .name("idx_evaluations_professeur_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Evaluations {
    Table,
    Id,
    ObservationId,
    ProfesseurId,
    CommentairesGeneraux,
    DateEvaluation,
}

#[derive(Iden)]
enum Observations {
    Table,
    Id,
}

#[derive(Iden)]
enum Utilisateurs {
    Table,
    Id,
}
