use sea_orm::entity::prelude::*;

/// Form definition owned by a service. `structure` describes the dynamic fields.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "templates_observation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub nom: String,
    pub service_id: Uuid,
    pub cree_par_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub structure: Json,
    pub date_creation: chrono::DateTime<chrono::Utc>,
    pub actif: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id",
        on_delete = "Cascade"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::utilisateurs::Entity",
        from = "Column::CreeParId",
        to = "super::utilisateurs::Column::Id",
        on_delete = "SetNull"
    )]
    CreePar,
    #[sea_orm(has_many = "super::observations::Entity")]
    Observations,
    #[sea_orm(has_many = "super::template_competences::Entity")]
    TemplateCompetences,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::observations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Observations.def()
    }
}

impl Related<super::competences::Entity> for Entity {
    fn to() -> RelationDef {
        super::template_competences::Relation::Competence.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::template_competences::Relation::Template.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
