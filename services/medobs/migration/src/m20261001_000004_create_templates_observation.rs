use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TemplatesObservation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplatesObservation::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TemplatesObservation::Nom)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplatesObservation::ServiceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TemplatesObservation::CreeParId).uuid().null())
                    .col(
                        ColumnDef::new(TemplatesObservation::Structure)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplatesObservation::DateCreation)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TemplatesObservation::Actif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_templates_observation_service")
                            .from(TemplatesObservation::Table, TemplatesObservation::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_templates_observation_cree_par")
                            .from(TemplatesObservation::Table, TemplatesObservation::CreeParId)
                            .to(Utilisateurs::Table, Utilisateurs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TemplatesObservation::Table)
                    .col(TemplatesObservation::ServiceId)
                    .name("idx_templates_observation_service_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateCompetences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateCompetences::TemplateId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateCompetences::CompetenceId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TemplateCompetences::TemplateId)
                            .col(TemplateCompetences::CompetenceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_competences_template")
                            .from(TemplateCompetences::Table, TemplateCompetences::TemplateId)
                            .to(TemplatesObservation::Table, TemplatesObservation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_competences_competence")
                            .from(TemplateCompetences::Table, TemplateCompetences::CompetenceId)
                            .to(Competences::Table, Competences::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateCompetences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TemplatesObservation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TemplatesObservation {
    Table,
    Id,
    Nom,
    ServiceId,
    CreeParId,
    Structure,
    DateCreation,
    Actif,
}

#[derive(Iden)]
enum TemplateCompetences {
    Table,
    TemplateId,
    CompetenceId,
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
}

#[derive(Iden)]
enum Utilisateurs {
    Table,
    Id,
}

#[derive(Iden)]
enum Competences {
    Table,
    Id,
}
