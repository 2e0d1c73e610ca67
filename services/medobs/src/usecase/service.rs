use chrono::Utc;
use uuid::Uuid;

use medobs_domain::pagination::{Page, PageRequest};

use crate::domain::repository::ServiceRepository;
use crate::domain::types::{NomSortBy, SearchFilter, Service};
use crate::error::MedobsError;

pub struct ServiceInput {
    pub nom: String,
    pub description: String,
}

// ── ListServices ─────────────────────────────────────────────────────────────

pub struct ListServicesUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> ListServicesUseCase<R> {
    pub async fn execute(
        &self,
        filter: &SearchFilter,
        sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Service>, MedobsError> {
        self.repo.list(filter, sort_by, page).await
    }
}

// ── GetService ───────────────────────────────────────────────────────────────

pub struct GetServiceUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> GetServiceUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Service, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::ServiceNotFound)
    }
}

// ── CreateService ────────────────────────────────────────────────────────────

pub struct CreateServiceUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> CreateServiceUseCase<R> {
    pub async fn execute(&self, input: ServiceInput) -> Result<Service, MedobsError> {
        let service = Service {
            id: Uuid::now_v7(),
            nom: input.nom,
            description: input.description,
            date_creation: Utc::now(),
        };
        self.repo.create(&service).await?;
        Ok(service)
    }
}

// ── UpdateService ────────────────────────────────────────────────────────────

pub struct UpdateServiceUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> UpdateServiceUseCase<R> {
    pub async fn execute(&self, id: Uuid, input: ServiceInput) -> Result<Service, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::ServiceNotFound)?;
        let service = Service {
            nom: input.nom,
            description: input.description,
            ..existing
        };
        self.repo.update(&service).await?;
        Ok(service)
    }
}

// ── DeleteService ────────────────────────────────────────────────────────────

pub struct DeleteServiceUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> DeleteServiceUseCase<R> {
    /// Templates of the service are deleted with it, which fails with
    /// `DeleteProtected` while any of them has observations.
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::ServiceNotFound);
        }
        tracing::info!(service_id = %id, "service deleted");
        Ok(())
    }
}
