//! Row seeders writing straight to the schema entities.
//!
//! They bypass the service's checks, which lets tests set up states the
//! admin surface would refuse. Every seeder panics on failure.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use medobs_domain::observation::Statut;
use medobs_domain::user::Role;
use medobs_schema::{
    competences, evaluations, observations, services, template_competences,
    templates_observation, utilisateurs,
};

pub async fn seed_service(db: &DatabaseConnection, nom: &str) -> Uuid {
    let id = Uuid::now_v7();
    services::ActiveModel {
        id: Set(id),
        nom: Set(nom.to_owned()),
        description: Set(String::new()),
        date_creation: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed service");
    id
}

pub async fn seed_utilisateur(db: &DatabaseConnection, username: &str, role: Role) -> Uuid {
    seed_utilisateur_named(db, username, "", "", role).await
}

pub async fn seed_utilisateur_named(
    db: &DatabaseConnection,
    username: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
) -> Uuid {
    let id = Uuid::now_v7();
    utilisateurs::ActiveModel {
        id: Set(id),
        username: Set(username.to_owned()),
        first_name: Set(first_name.to_owned()),
        last_name: Set(last_name.to_owned()),
        email: Set(String::new()),
        role: Set(role.as_str().to_owned()),
        service_rattachement_id: Set(None),
        is_staff: Set(false),
        is_superuser: Set(false),
        is_active: Set(true),
        date_joined: Set(Utc::now()),
        last_login: Set(None),
    }
    .insert(db)
    .await
    .expect("seed utilisateur");
    id
}

pub async fn seed_competence(db: &DatabaseConnection, nom: &str) -> Uuid {
    let id = Uuid::now_v7();
    competences::ActiveModel {
        id: Set(id),
        nom: Set(nom.to_owned()),
        description: Set(String::new()),
        date_creation: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed competence");
    id
}

pub async fn seed_template(
    db: &DatabaseConnection,
    nom: &str,
    service_id: Uuid,
    cree_par_id: Option<Uuid>,
) -> Uuid {
    let id = Uuid::now_v7();
    templates_observation::ActiveModel {
        id: Set(id),
        nom: Set(nom.to_owned()),
        service_id: Set(service_id),
        cree_par_id: Set(cree_par_id),
        structure: Set(serde_json::json!({})),
        date_creation: Set(Utc::now()),
        actif: Set(true),
    }
    .insert(db)
    .await
    .expect("seed template");
    id
}

pub async fn link_competence(db: &DatabaseConnection, template_id: Uuid, competence_id: Uuid) {
    template_competences::Entity::insert(template_competences::ActiveModel {
        template_id: Set(template_id),
        competence_id: Set(competence_id),
    })
    .exec(db)
    .await
    .expect("link competence");
}

pub async fn seed_observation(
    db: &DatabaseConnection,
    etudiant_id: Uuid,
    template_id: Uuid,
    statut: Statut,
) -> Uuid {
    let id = Uuid::now_v7();
    let now = Utc::now();
    observations::ActiveModel {
        id: Set(id),
        etudiant_id: Set(etudiant_id),
        template_id: Set(template_id),
        statut: Set(statut.as_str().to_owned()),
        donnees: Set(None),
        date_creation: Set(now),
        date_modification: Set(now),
        date_soumission: Set(statut.is_submission().then_some(now)),
    }
    .insert(db)
    .await
    .expect("seed observation");
    id
}

pub async fn seed_evaluation(
    db: &DatabaseConnection,
    observation_id: Uuid,
    professeur_id: Option<Uuid>,
) -> Uuid {
    let id = Uuid::now_v7();
    evaluations::ActiveModel {
        id: Set(id),
        observation_id: Set(observation_id),
        professeur_id: Set(professeur_id),
        commentaires_generaux: Set(String::new()),
        date_evaluation: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed evaluation");
    id
}
