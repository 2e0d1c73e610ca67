use chrono::Utc;
use uuid::Uuid;

use medobs_domain::pagination::{Page, PageRequest};
use medobs_domain::user::Role;

use crate::domain::repository::{ServiceRepository, UtilisateurRepository};
use crate::domain::types::{
    Utilisateur, UtilisateurFilter, UtilisateurRow, UtilisateurSortBy, validate_username,
};
use crate::error::MedobsError;

/// Writable account fields, shared by create and full update.
pub struct UtilisateurInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub service_rattachement_id: Option<Uuid>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

async fn check_input<S: ServiceRepository>(
    services: &S,
    input: &UtilisateurInput,
) -> Result<(), MedobsError> {
    if !validate_username(&input.username) {
        return Err(MedobsError::InvalidUsername);
    }
    if let Some(service_id) = input.service_rattachement_id {
        services
            .find_by_id(service_id)
            .await?
            .ok_or(MedobsError::ServiceNotFound)?;
    }
    Ok(())
}

// ── ListUtilisateurs ─────────────────────────────────────────────────────────

pub struct ListUtilisateursUseCase<R: UtilisateurRepository> {
    pub repo: R,
}

impl<R: UtilisateurRepository> ListUtilisateursUseCase<R> {
    pub async fn execute(
        &self,
        filter: &UtilisateurFilter,
        sort_by: UtilisateurSortBy,
        page: PageRequest,
    ) -> Result<Page<UtilisateurRow>, MedobsError> {
        self.repo.list(filter, sort_by, page).await
    }
}

// ── GetUtilisateur ───────────────────────────────────────────────────────────

pub struct GetUtilisateurUseCase<R: UtilisateurRepository> {
    pub repo: R,
}

impl<R: UtilisateurRepository> GetUtilisateurUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Utilisateur, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::UtilisateurNotFound)
    }
}

// ── CreateUtilisateur ────────────────────────────────────────────────────────

pub struct CreateUtilisateurUseCase<R: UtilisateurRepository, S: ServiceRepository> {
    pub repo: R,
    pub services: S,
}

impl<R: UtilisateurRepository, S: ServiceRepository> CreateUtilisateurUseCase<R, S> {
    pub async fn execute(&self, input: UtilisateurInput) -> Result<Utilisateur, MedobsError> {
        check_input(&self.services, &input).await?;
        let utilisateur = Utilisateur {
            id: Uuid::now_v7(),
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            role: input.role,
            service_rattachement_id: input.service_rattachement_id,
            is_staff: input.is_staff,
            is_superuser: input.is_superuser,
            is_active: input.is_active,
            date_joined: Utc::now(),
            last_login: None,
        };
        self.repo.create(&utilisateur).await?;
        Ok(utilisateur)
    }
}

// ── UpdateUtilisateur ────────────────────────────────────────────────────────

pub struct UpdateUtilisateurUseCase<R: UtilisateurRepository, S: ServiceRepository> {
    pub repo: R,
    pub services: S,
}

impl<R: UtilisateurRepository, S: ServiceRepository> UpdateUtilisateurUseCase<R, S> {
    pub async fn execute(
        &self,
        id: Uuid,
        input: UtilisateurInput,
    ) -> Result<Utilisateur, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::UtilisateurNotFound)?;
        check_input(&self.services, &input).await?;
        let utilisateur = Utilisateur {
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            role: input.role,
            service_rattachement_id: input.service_rattachement_id,
            is_staff: input.is_staff,
            is_superuser: input.is_superuser,
            is_active: input.is_active,
            ..existing
        };
        self.repo.update(&utilisateur).await?;
        Ok(utilisateur)
    }
}

// ── DeleteUtilisateur ────────────────────────────────────────────────────────

pub struct DeleteUtilisateurUseCase<R: UtilisateurRepository> {
    pub repo: R,
}

impl<R: UtilisateurRepository> DeleteUtilisateurUseCase<R> {
    /// Observations of a deleted student go with them; templates and
    /// evaluations of a deleted professor lose their author.
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::UtilisateurNotFound);
        }
        tracing::info!(utilisateur_id = %id, "utilisateur deleted");
        Ok(())
    }
}
