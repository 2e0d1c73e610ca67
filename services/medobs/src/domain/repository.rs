#![allow(async_fn_in_trait)]

use uuid::Uuid;

use medobs_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    Competence, Evaluation, EvaluationCompetence, EvaluationFilter, EvaluationRow,
    EvaluationSortBy, FichierMedia, NomSortBy, NoteRow, Observation, ObservationFilter,
    ObservationRow, ObservationSortBy, SearchFilter, Service, TemplateFilter, TemplateObservation,
    TemplateRow, TemplateSortBy, Utilisateur, UtilisateurFilter, UtilisateurRow,
    UtilisateurSortBy,
};
use crate::error::MedobsError;

/// Repository for accounts.
pub trait UtilisateurRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Utilisateur>, MedobsError>;

    async fn list(
        &self,
        filter: &UtilisateurFilter,
        sort_by: UtilisateurSortBy,
        page: PageRequest,
    ) -> Result<Page<UtilisateurRow>, MedobsError>;

    /// Fails with `UsernameTaken` on a duplicate username.
    async fn create(&self, utilisateur: &Utilisateur) -> Result<(), MedobsError>;

    /// Fails with `UsernameTaken` on a duplicate username.
    async fn update(&self, utilisateur: &Utilisateur) -> Result<(), MedobsError>;

    /// Delete an account. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Repository for hospital services.
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, MedobsError>;

    async fn list(
        &self,
        filter: &SearchFilter,
        sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Service>, MedobsError>;

    /// Fails with `ServiceNomTaken` on a duplicate name.
    async fn create(&self, service: &Service) -> Result<(), MedobsError>;

    async fn update(&self, service: &Service) -> Result<(), MedobsError>;

    /// Delete a service and, by cascade, its templates. Fails with
    /// `DeleteProtected` when one of those templates still has observations.
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Repository for competences.
pub trait CompetenceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Competence>, MedobsError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Competence>, MedobsError>;

    /// Every competence, ordered by name.
    async fn list_all(&self) -> Result<Vec<Competence>, MedobsError>;

    async fn list(
        &self,
        filter: &SearchFilter,
        sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Competence>, MedobsError>;

    /// Fails with `CompetenceNomTaken` on a duplicate name.
    async fn create(&self, competence: &Competence) -> Result<(), MedobsError>;

    async fn update(&self, competence: &Competence) -> Result<(), MedobsError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Repository for observation templates and their competence links.
pub trait TemplateRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TemplateObservation>, MedobsError>;

    async fn list(
        &self,
        filter: &TemplateFilter,
        sort_by: TemplateSortBy,
        page: PageRequest,
    ) -> Result<Page<TemplateRow>, MedobsError>;

    /// Insert the template and its competence links in one transaction.
    async fn create(&self, template: &TemplateObservation) -> Result<(), MedobsError>;

    /// Update the template and replace its competence links in one transaction.
    async fn update(&self, template: &TemplateObservation) -> Result<(), MedobsError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;

    /// Number of observations filled from the template.
    async fn count_observations(&self, id: Uuid) -> Result<u64, MedobsError>;
}

/// Repository for observations.
pub trait ObservationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Observation>, MedobsError>;

    async fn list(
        &self,
        filter: &ObservationFilter,
        sort_by: ObservationSortBy,
        page: PageRequest,
    ) -> Result<Page<ObservationRow>, MedobsError>;

    async fn create(&self, observation: &Observation) -> Result<(), MedobsError>;

    async fn update(&self, observation: &Observation) -> Result<(), MedobsError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Repository for uploaded file records.
pub trait FichierRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FichierMedia>, MedobsError>;

    /// Files of one observation, oldest upload first.
    async fn list_by_observation(
        &self,
        observation_id: Uuid,
    ) -> Result<Vec<FichierMedia>, MedobsError>;

    async fn create(&self, fichier: &FichierMedia) -> Result<(), MedobsError>;

    async fn update(&self, fichier: &FichierMedia) -> Result<(), MedobsError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Repository for evaluations.
pub trait EvaluationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Evaluation>, MedobsError>;

    async fn find_by_observation(
        &self,
        observation_id: Uuid,
    ) -> Result<Option<Evaluation>, MedobsError>;

    async fn list(
        &self,
        filter: &EvaluationFilter,
        sort_by: EvaluationSortBy,
        page: PageRequest,
    ) -> Result<Page<EvaluationRow>, MedobsError>;

    /// Fails with `EvaluationAlreadyExists` when the observation is
    /// already evaluated.
    async fn create(&self, evaluation: &Evaluation) -> Result<(), MedobsError>;

    async fn update(&self, evaluation: &Evaluation) -> Result<(), MedobsError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Repository for per-competence grades.
pub trait NoteRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<EvaluationCompetence>, MedobsError>;

    /// Grades of one evaluation, ordered by competence name.
    async fn list_by_evaluation(&self, evaluation_id: Uuid) -> Result<Vec<NoteRow>, MedobsError>;

    /// Fails with `NoteAlreadyExists` when the competence is already graded.
    async fn create(&self, note: &EvaluationCompetence) -> Result<(), MedobsError>;

    /// Fails with `NoteAlreadyExists` when the competence is already graded.
    async fn update(&self, note: &EvaluationCompetence) -> Result<(), MedobsError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError>;
}

/// Port for uploaded file contents. Paths are relative to the media root.
pub trait MediaStorage: Send + Sync {
    async fn save(&self, path: &str, contents: &[u8]) -> Result<(), MedobsError>;

    /// Read a stored file. Returns `None` if it does not exist.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, MedobsError>;
}
