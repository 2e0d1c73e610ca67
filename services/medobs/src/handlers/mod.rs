pub mod competence;
pub mod evaluation;
pub mod fichier;
pub mod health;
pub mod observation;
pub mod query;
pub mod service;
pub mod template;
pub mod utilisateur;
