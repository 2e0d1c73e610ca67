use chrono::Utc;
use uuid::Uuid;

use medobs_domain::observation::Statut;
use medobs_domain::pagination::{Page, PageRequest};
use medobs_domain::user::Role;

use crate::domain::repository::{ObservationRepository, TemplateRepository, UtilisateurRepository};
use crate::domain::types::{Observation, ObservationFilter, ObservationRow, ObservationSortBy};
use crate::error::MedobsError;
use crate::usecase::require_role;

/// Writable observation fields. Timestamps are managed by the service.
pub struct ObservationInput {
    pub etudiant_id: Uuid,
    pub template_id: Uuid,
    pub statut: Statut,
    pub donnees: Option<serde_json::Value>,
}

async fn check_refs<U, T>(
    utilisateurs: &U,
    templates: &T,
    input: &ObservationInput,
) -> Result<(), MedobsError>
where
    U: UtilisateurRepository,
    T: TemplateRepository,
{
    require_role(utilisateurs, input.etudiant_id, Role::Etudiant, "etudiant").await?;
    templates
        .find_by_id(input.template_id)
        .await?
        .ok_or(MedobsError::TemplateNotFound)?;
    Ok(())
}

// ── ListObservations ─────────────────────────────────────────────────────────

pub struct ListObservationsUseCase<R: ObservationRepository> {
    pub repo: R,
}

impl<R: ObservationRepository> ListObservationsUseCase<R> {
    pub async fn execute(
        &self,
        filter: &ObservationFilter,
        sort_by: ObservationSortBy,
        page: PageRequest,
    ) -> Result<Page<ObservationRow>, MedobsError> {
        self.repo.list(filter, sort_by, page).await
    }
}

// ── GetObservation ───────────────────────────────────────────────────────────

pub struct GetObservationUseCase<R: ObservationRepository> {
    pub repo: R,
}

impl<R: ObservationRepository> GetObservationUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Observation, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::ObservationNotFound)
    }
}

// ── CreateObservation ────────────────────────────────────────────────────────

pub struct CreateObservationUseCase<R, U, T> {
    pub repo: R,
    pub utilisateurs: U,
    pub templates: T,
}

impl<R, U, T> CreateObservationUseCase<R, U, T>
where
    R: ObservationRepository,
    U: UtilisateurRepository,
    T: TemplateRepository,
{
    pub async fn execute(&self, input: ObservationInput) -> Result<Observation, MedobsError> {
        check_refs(&self.utilisateurs, &self.templates, &input).await?;
        let now = Utc::now();
        let mut observation = Observation {
            id: Uuid::now_v7(),
            etudiant_id: input.etudiant_id,
            template_id: input.template_id,
            statut: Statut::default(),
            donnees: input.donnees,
            date_creation: now,
            date_modification: now,
            date_soumission: None,
        };
        observation.apply_statut(input.statut, now);
        self.repo.create(&observation).await?;
        Ok(observation)
    }
}

// ── UpdateObservation ────────────────────────────────────────────────────────

pub struct UpdateObservationUseCase<R, U, T> {
    pub repo: R,
    pub utilisateurs: U,
    pub templates: T,
}

impl<R, U, T> UpdateObservationUseCase<R, U, T>
where
    R: ObservationRepository,
    U: UtilisateurRepository,
    T: TemplateRepository,
{
    /// Full replacement. The status is not checked against the workflow.
    pub async fn execute(
        &self,
        id: Uuid,
        input: ObservationInput,
    ) -> Result<Observation, MedobsError> {
        let mut observation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::ObservationNotFound)?;
        check_refs(&self.utilisateurs, &self.templates, &input).await?;
        let now = Utc::now();
        observation.etudiant_id = input.etudiant_id;
        observation.template_id = input.template_id;
        observation.donnees = input.donnees;
        observation.apply_statut(input.statut, now);
        observation.date_modification = now;
        self.repo.update(&observation).await?;
        Ok(observation)
    }
}

// ── ChangeStatut ─────────────────────────────────────────────────────────────

pub struct ChangeStatutUseCase<R: ObservationRepository> {
    pub repo: R,
}

impl<R: ObservationRepository> ChangeStatutUseCase<R> {
    /// Move the observation along the review workflow.
    pub async fn execute(&self, id: Uuid, statut: Statut) -> Result<Observation, MedobsError> {
        let mut observation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::ObservationNotFound)?;
        let from = observation.statut;
        if !from.can_transition_to(statut) {
            return Err(MedobsError::InvalidTransition { from, to: statut });
        }
        let now = Utc::now();
        observation.apply_statut(statut, now);
        observation.date_modification = now;
        self.repo.update(&observation).await?;
        tracing::info!(observation_id = %id, %from, to = %statut, "observation statut changed");
        Ok(observation)
    }
}

// ── DeleteObservation ────────────────────────────────────────────────────────

pub struct DeleteObservationUseCase<R: ObservationRepository> {
    pub repo: R,
}

impl<R: ObservationRepository> DeleteObservationUseCase<R> {
    /// Files and the evaluation of the observation go with it. Stored file
    /// contents stay on disk.
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::ObservationNotFound);
        }
        Ok(())
    }
}
