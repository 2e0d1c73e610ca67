use sea_orm::entity::prelude::*;

/// Medical department (e.g. Cardiologie, Neurologie).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
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
    #[sea_orm(has_many = "super::templates_observation::Entity")]
    Templates,
    #[sea_orm(has_many = "super::utilisateurs::Entity")]
    Utilisateurs,
}

impl Related<super::templates_observation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl Related<super::utilisateurs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Utilisateurs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
