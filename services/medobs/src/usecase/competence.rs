use chrono::Utc;
use uuid::Uuid;

use medobs_domain::pagination::{Page, PageRequest};

use crate::domain::repository::CompetenceRepository;
use crate::domain::types::{Competence, NomSortBy, SearchFilter};
use crate::error::MedobsError;

/// Writable competence fields. `description` holds the evaluation criteria.
pub struct CompetenceInput {
    pub nom: String,
    pub description: String,
}

// ── ListCompetences ──────────────────────────────────────────────────────────

pub struct ListCompetencesUseCase<R: CompetenceRepository> {
    pub repo: R,
}

impl<R: CompetenceRepository> ListCompetencesUseCase<R> {
    pub async fn execute(
        &self,
        filter: &SearchFilter,
        sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Competence>, MedobsError> {
        self.repo.list(filter, sort_by, page).await
    }
}

// ── GetCompetence ────────────────────────────────────────────────────────────

pub struct GetCompetenceUseCase<R: CompetenceRepository> {
    pub repo: R,
}

impl<R: CompetenceRepository> GetCompetenceUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Competence, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::CompetenceNotFound)
    }
}

// ── CreateCompetence ─────────────────────────────────────────────────────────

pub struct CreateCompetenceUseCase<R: CompetenceRepository> {
    pub repo: R,
}

impl<R: CompetenceRepository> CreateCompetenceUseCase<R> {
    pub async fn execute(&self, input: CompetenceInput) -> Result<Competence, MedobsError> {
        let competence = Competence {
            id: Uuid::now_v7(),
            nom: input.nom,
            description: input.description,
            date_creation: Utc::now(),
        };
        self.repo.create(&competence).await?;
        Ok(competence)
    }
}

// ── UpdateCompetence ─────────────────────────────────────────────────────────

pub struct UpdateCompetenceUseCase<R: CompetenceRepository> {
    pub repo: R,
}

impl<R: CompetenceRepository> UpdateCompetenceUseCase<R> {
    pub async fn execute(&self, id: Uuid, input: CompetenceInput) -> Result<Competence, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::CompetenceNotFound)?;
        let competence = Competence {
            nom: input.nom,
            description: input.description,
            ..existing
        };
        self.repo.update(&competence).await?;
        Ok(competence)
    }
}

// ── DeleteCompetence ─────────────────────────────────────────────────────────

pub struct DeleteCompetenceUseCase<R: CompetenceRepository> {
    pub repo: R,
}

impl<R: CompetenceRepository> DeleteCompetenceUseCase<R> {
    /// Grades and template links of the competence go with it.
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::CompetenceNotFound);
        }
        tracing::info!(competence_id = %id, "competence deleted");
        Ok(())
    }
}
