use sea_orm::entity::prelude::*;

/// Student-filled instance of a template.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "observations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub etudiant_id: Uuid,
    pub template_id: Uuid,
    pub statut: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub donnees: Option<Json>,
    pub date_creation: chrono::DateTime<chrono::Utc>,
    pub date_modification: chrono::DateTime<chrono::Utc>,
    pub date_soumission: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::utilisateurs::Entity",
        from = "Column::EtudiantId",
        to = "super::utilisateurs::Column::Id",
        on_delete = "Cascade"
    )]
    Etudiant,
    #[sea_orm(
        belongs_to = "super::templates_observation::Entity",
        from = "Column::TemplateId",
        to = "super::templates_observation::Column::Id",
        on_delete = "NoAction"
    )]
    Template,
    #[sea_orm(has_many = "super::fichiers_media::Entity")]
    Fichiers,
    #[sea_orm(has_one = "super::evaluations::Entity")]
    Evaluation,
}

impl Related<super::utilisateurs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Etudiant.def()
    }
}

impl Related<super::templates_observation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::fichiers_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fichiers.def()
    }
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
