use sea_orm_migration::prelude::*;

mod m20261001_000001_create_services;
mod m20261001_000002_create_utilisateurs;
mod m20261001_000003_create_competences;
mod m20261001_000004_create_templates_observation;
mod m20261001_000005_create_observations;
mod m20261001_000006_create_fichiers_media;
mod m20261001_000007_create_evaluations;
mod m20261001_000008_create_evaluation_competences;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_services::Migration),
            Box::new(m20261001_000002_create_utilisateurs::Migration),
            Box::new(m20261001_000003_create_competences::Migration),
            Box::new(m20261001_000004_create_templates_observation::Migration),
            Box::new(m20261001_000005_create_observations::Migration),
            Box::new(m20261001_000006_create_fichiers_media::Migration),
            Box::new(m20261001_000007_create_evaluations::Migration),
            Box::new(m20261001_000008_create_evaluation_competences::Migration),
        ]
    }
}
