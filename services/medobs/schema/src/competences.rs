use sea_orm::entity::prelude::*;

/// Evaluable clinical skill.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "competences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub nom: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub date_creation: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::template_competences::Entity")]
    TemplateCompetences,
    #[sea_orm(has_many = "super::evaluation_competences::Entity")]
    EvaluationCompetences,
}

impl Related<super::evaluation_competences::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationCompetences.def()
    }
}

impl Related<super::templates_observation::Entity> for Entity {
    fn to() -> RelationDef {
        super::template_competences::Relation::Template.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::template_competences::Relation::Competence.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
