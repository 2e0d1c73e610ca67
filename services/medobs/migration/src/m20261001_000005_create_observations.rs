use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Observations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Observations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Observations::EtudiantId).uuid().not_null())
                    .col(ColumnDef::new(Observations::TemplateId).uuid().not_null())
                    .col(
                        ColumnDef::new(Observations::Statut)
                            .string_len(15)
                            .not_null()
                            .default("BROUILLON")
                            .check(Expr::col(Observations::Statut).is_in([
                                "BROUILLON",
                                "EN_ATTENTE",
                                "A_CORRIGER",
                                "VALIDEE",
                            ])),
                    )
                    .col(ColumnDef::new(Observations::Donnees).json_binary().null())
                    .col(
                        ColumnDef::new(Observations::DateCreation)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Observations::DateModification)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Observations::DateSoumission)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_observations_etudiant")
                            .from(Observations::Table, Observations::EtudiantId)
                            .to(Utilisateurs::Table, Utilisateurs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_observations_template")
                            .from(Observations::Table, Observations::TemplateId)
                            .to(TemplatesObservation::Table, TemplatesObservation::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Observations::Table)
                    .col(Observations::EtudiantId)
                    .col((Observations::DateCreation, IndexOrder::Desc))
                    .name("idx_observations_etudiant_id_date_creation")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Observations::Table)
                    .col(Observations::TemplateId)
                    .name("idx_observations_template_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Observations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Observations {
    Table,
    Id,
    EtudiantId,
    TemplateId,
    Statut,
    Donnees,
    DateCreation,
    DateModification,
    DateSoumission,
}

#[derive(Iden)]
enum Utilisateurs {
    Table,
    Id,
}

#[derive(Iden)]
enum TemplatesObservation {
    Table,
    Id,
}
