use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbCompetenceRepository, DbEvaluationRepository, DbFichierRepository, DbNoteRepository,
    DbObservationRepository, DbServiceRepository, DbTemplateRepository, DbUtilisateurRepository,
};
use crate::infra::storage::LocalMediaStorage;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: LocalMediaStorage,
    /// Body limit applied to the upload route.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn utilisateur_repo(&self) -> DbUtilisateurRepository {
        DbUtilisateurRepository {
            db: self.db.clone(),
        }
    }

    pub fn service_repo(&self) -> DbServiceRepository {
        DbServiceRepository {
            db: self.db.clone(),
        }
    }

    pub fn competence_repo(&self) -> DbCompetenceRepository {
        DbCompetenceRepository {
            db: self.db.clone(),
        }
    }

    pub fn template_repo(&self) -> DbTemplateRepository {
        DbTemplateRepository {
            db: self.db.clone(),
        }
    }

    pub fn observation_repo(&self) -> DbObservationRepository {
        DbObservationRepository {
            db: self.db.clone(),
        }
    }

    pub fn fichier_repo(&self) -> DbFichierRepository {
        DbFichierRepository {
            db: self.db.clone(),
        }
    }

    pub fn evaluation_repo(&self) -> DbEvaluationRepository {
        DbEvaluationRepository {
            db: self.db.clone(),
        }
    }

    pub fn note_repo(&self) -> DbNoteRepository {
        DbNoteRepository {
            db: self.db.clone(),
        }
    }

    pub fn storage(&self) -> LocalMediaStorage {
        self.storage.clone()
    }
}
