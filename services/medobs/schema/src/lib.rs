//! sea-orm entities for the MedObs relational schema.

pub mod competences;
pub mod evaluation_competences;
pub mod evaluations;
pub mod fichiers_media;
pub mod observations;
pub mod services;
pub mod template_competences;
pub mod templates_observation;
pub mod utilisateurs;
