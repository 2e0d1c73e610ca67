use sea_orm::entity::prelude::*;

/// A professor's review of one observation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub observation_id: Uuid,
    pub professeur_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub commentaires_generaux: String,
    pub date_evaluation: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::observations::Entity",
        from = "Column::ObservationId",
        to = "super::observations::Column::Id",
        on_delete = "Cascade"
    )]
    Observation,
    #[sea_orm(
        belongs_to = "super::utilisateurs::Entity",
        from = "Column::ProfesseurId",
        to = "super::utilisateurs::Column::Id",
        on_delete = "SetNull"
    )]
    Professeur,
    #[sea_orm(has_many = "super::evaluation_competences::Entity")]
    Notes,
}

impl Related<super::observations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Observation.def()
    }
}

impl Related<super::evaluation_competences::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
