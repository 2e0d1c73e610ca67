use chrono::Utc;
use uuid::Uuid;

use medobs_domain::pagination::{Page, PageRequest};
use medobs_domain::user::Role;

use crate::domain::repository::{
    CompetenceRepository, ServiceRepository, TemplateRepository, UtilisateurRepository,
};
use crate::domain::types::{
    CompetenceSelector, TemplateFilter, TemplateObservation, TemplateRow, TemplateSortBy,
};
use crate::error::MedobsError;
use crate::usecase::require_role;

/// Writable template fields. `competences_evaluees` is the full selected set.
pub struct TemplateInput {
    pub nom: String,
    pub service_id: Uuid,
    pub cree_par_id: Option<Uuid>,
    pub structure: serde_json::Value,
    pub competences_evaluees: Vec<Uuid>,
    pub actif: bool,
}

/// Reference checks shared by create and update.
pub struct TemplateRefs<S, U, C> {
    pub services: S,
    pub utilisateurs: U,
    pub competences: C,
}

impl<S, U, C> TemplateRefs<S, U, C>
where
    S: ServiceRepository,
    U: UtilisateurRepository,
    C: CompetenceRepository,
{
    /// Check every reference and return the deduplicated competence ids.
    async fn check(&self, input: &TemplateInput) -> Result<Vec<Uuid>, MedobsError> {
        self.services
            .find_by_id(input.service_id)
            .await?
            .ok_or(MedobsError::ServiceNotFound)?;
        if let Some(cree_par_id) = input.cree_par_id {
            require_role(&self.utilisateurs, cree_par_id, Role::Professeur, "cree_par").await?;
        }
        let mut ids = input.competences_evaluees.clone();
        ids.sort_unstable();
        ids.dedup();
        let found = self.competences.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            return Err(MedobsError::CompetenceNotFound);
        }
        Ok(ids)
    }
}

// ── ListTemplates ────────────────────────────────────────────────────────────

pub struct ListTemplatesUseCase<R: TemplateRepository> {
    pub repo: R,
}

impl<R: TemplateRepository> ListTemplatesUseCase<R> {
    pub async fn execute(
        &self,
        filter: &TemplateFilter,
        sort_by: TemplateSortBy,
        page: PageRequest,
    ) -> Result<Page<TemplateRow>, MedobsError> {
        self.repo.list(filter, sort_by, page).await
    }
}

// ── GetTemplate ──────────────────────────────────────────────────────────────

pub struct GetTemplateUseCase<R: TemplateRepository> {
    pub repo: R,
}

impl<R: TemplateRepository> GetTemplateUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<TemplateObservation, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::TemplateNotFound)
    }
}

// ── CreateTemplate ───────────────────────────────────────────────────────────

pub struct CreateTemplateUseCase<R, S, U, C> {
    pub repo: R,
    pub refs: TemplateRefs<S, U, C>,
}

impl<R, S, U, C> CreateTemplateUseCase<R, S, U, C>
where
    R: TemplateRepository,
    S: ServiceRepository,
    U: UtilisateurRepository,
    C: CompetenceRepository,
{
    pub async fn execute(&self, input: TemplateInput) -> Result<TemplateObservation, MedobsError> {
        let competences_evaluees = self.refs.check(&input).await?;
        let template = TemplateObservation {
            id: Uuid::now_v7(),
            nom: input.nom,
            service_id: input.service_id,
            cree_par_id: input.cree_par_id,
            structure: input.structure,
            competences_evaluees,
            actif: input.actif,
            date_creation: Utc::now(),
        };
        self.repo.create(&template).await?;
        Ok(template)
    }
}

// ── UpdateTemplate ───────────────────────────────────────────────────────────

pub struct UpdateTemplateUseCase<R, S, U, C> {
    pub repo: R,
    pub refs: TemplateRefs<S, U, C>,
}

impl<R, S, U, C> UpdateTemplateUseCase<R, S, U, C>
where
    R: TemplateRepository,
    S: ServiceRepository,
    U: UtilisateurRepository,
    C: CompetenceRepository,
{
    pub async fn execute(
        &self,
        id: Uuid,
        input: TemplateInput,
    ) -> Result<TemplateObservation, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::TemplateNotFound)?;
        let competences_evaluees = self.refs.check(&input).await?;
        let template = TemplateObservation {
            nom: input.nom,
            service_id: input.service_id,
            cree_par_id: input.cree_par_id,
            structure: input.structure,
            competences_evaluees,
            actif: input.actif,
            ..existing
        };
        self.repo.update(&template).await?;
        Ok(template)
    }
}

// ── DeleteTemplate ───────────────────────────────────────────────────────────

pub struct DeleteTemplateUseCase<R: TemplateRepository> {
    pub repo: R,
}

impl<R: TemplateRepository> DeleteTemplateUseCase<R> {
    /// Refused with `DeleteProtected` while observations use the template.
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        let observations = self.repo.count_observations(id).await?;
        if observations > 0 {
            tracing::warn!(template_id = %id, observations, "template delete refused");
            return Err(MedobsError::DeleteProtected);
        }
        if !self.repo.delete(id).await? {
            return Err(MedobsError::TemplateNotFound);
        }
        Ok(())
    }
}

// ── GetCompetenceSelector ────────────────────────────────────────────────────

pub struct GetCompetenceSelectorUseCase<R: TemplateRepository, C: CompetenceRepository> {
    pub repo: R,
    pub competences: C,
}

impl<R: TemplateRepository, C: CompetenceRepository> GetCompetenceSelectorUseCase<R, C> {
    pub async fn execute(&self, template_id: Uuid) -> Result<CompetenceSelector, MedobsError> {
        let template = self
            .repo
            .find_by_id(template_id)
            .await?
            .ok_or(MedobsError::TemplateNotFound)?;
        let all = self.competences.list_all().await?;
        Ok(CompetenceSelector::split(all, &template.competences_evaluees))
    }
}
