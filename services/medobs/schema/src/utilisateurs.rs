use sea_orm::entity::prelude::*;

/// Account record. `role` holds `ETUDIANT` or `PROFESSEUR`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "utilisateurs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub service_rattachement_id: Option<Uuid>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: chrono::DateTime<chrono::Utc>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceRattachementId",
        to = "super::services::Column::Id",
        on_delete = "SetNull"
    )]
    ServiceRattachement,
    #[sea_orm(has_many = "super::observations::Entity")]
    Observations,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRattachement.def()
    }
}

impl Related<super::observations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Observations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
