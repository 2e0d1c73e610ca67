use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EvaluationCompetences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationCompetences::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationCompetences::EvaluationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationCompetences::CompetenceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationCompetences::Note)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(EvaluationCompetences::Note).between(0, 5)),
                    )
                    .col(
                        ColumnDef::new(EvaluationCompetences::CommentaireSpecifique)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evaluation_competences_evaluation")
                            .from(
                                EvaluationCompetences::Table,
                                EvaluationCompetences::EvaluationId,
                            )
                            .to(Evaluations::Table, Evaluations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evaluation_competences_competence")
                            .from(
                                EvaluationCompetences::Table,
                                EvaluationCompetences::CompetenceId,
                            )
                            .to(Competences::Table, Competences::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(EvaluationCompetences::Table)
                    .col(EvaluationCompetences::EvaluationId)
                    .col(EvaluationCompetences::CompetenceId)
                    .unique()
                    .name("uq_evaluation_competences_evaluation_id_competence_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EvaluationCompetences::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EvaluationCompetences {
    Table,
    Id,
    EvaluationId,
    CompetenceId,
    Note,
    CommentaireSpecifique,
}

#[derive(Iden)]
enum Evaluations {
    Table,
    Id,
}

#[derive(Iden)]
enum Competences {
    Table,
    Id,
}
